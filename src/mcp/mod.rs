//! MCP surface: every tool in the catalogue as an rmcp `#[tool]` method.
//!
//! The methods only wrap their input into a [`ToolRequest`]; validation,
//! argument building and execution all live in the dispatcher.

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use tracing::{info, warn};

use crate::invoke::{Dispatcher, ToolError};
use crate::tools::{
    ClusterResourcesInput, CreateResourcesInput, CreateVmInput, DataSourceInput, DiagnosticsInput,
    GetVersionInput, ImageInput, ManageMappingInput, ServiceInput, ToolRequest, VmLifecycleInput,
    VolumeInput,
};

const INSTRUCTIONS: &str = "KubeVirt and Migration Toolkit for Virtualization tools. \
Virtctl* tools drive virtctl (VM lifecycle, diagnostics, volumes, images, services, \
manifests) with kubectl for listings; GetVersion and ManageMapping drive kubectl-mtv. \
When namespace is omitted the current kubectl context namespace is used.";

#[derive(Clone)]
pub struct McpServer {
    dispatcher: Dispatcher,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }

    async fn respond(&self, request: ToolRequest) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(self.dispatcher.call(request).await))
    }

    #[tool(
        name = "VirtctlVMLifecycle",
        description = "Unified VM power state management: start, stop, restart, pause, unpause, live-migrate (migrate) or soft-reboot a KubeVirt virtual machine.\n\nstop/restart accept grace_period and force; migrate accepts node_name. dry_run previews the change. Returns a JSON report with the executed command and its output."
    )]
    async fn vm_lifecycle(
        &self,
        Parameters(req): Parameters<VmLifecycleInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::VmLifecycle(req)).await
    }

    #[tool(
        name = "VirtctlDiagnostics",
        description = "VM diagnostics through the guest agent: OS information (guestosinfo), mounted filesystems (fslist), logged-in users (userlist), or the virtctl client/server version (version).\n\nThe guest agent must be running inside the VM for everything except version. JSON output is re-indented; other output is returned as-is."
    )]
    async fn diagnostics(
        &self,
        Parameters(req): Parameters<DiagnosticsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::Diagnostics(req)).await
    }

    #[tool(
        name = "VirtctlClusterResources",
        description = "Discover cluster resources used to build VMs: instance types, preferences (cluster-wide and namespaced), CDI data sources and storage classes.\n\nWith scope \"all\" both the cluster-wide and namespaced variants are queried and returned as {\"cluster\": ..., \"namespaced\": ...}. resource_type \"all\" returns every type keyed by name; queries that fail are left out. An omitted namespace means all namespaces."
    )]
    async fn cluster_resources(
        &self,
        Parameters(req): Parameters<ClusterResourcesInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::ClusterResources(req)).await
    }

    #[tool(
        name = "VirtctlCreateVMAdvanced",
        description = "Generate a VirtualMachine manifest with virtctl create vm.\n\nSupports instance types and preferences (explicit or inferred from a boot volume), run strategy, volumes (container disks, data sources, PVC clones, existing PVCs, blank disks) and cloud-init user, SSH keys and user data. Returns the YAML manifest; apply it with kubectl to create the VM."
    )]
    async fn create_vm(
        &self,
        Parameters(req): Parameters<CreateVmInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::CreateVm(req)).await
    }

    #[tool(
        name = "VirtctlVolumeManagement",
        description = "Hotplug volume management for running VMs: add or remove a DataVolume/PVC, or list the volumes attached to the VM instance.\n\nadd/remove need volume_name; persist keeps an added volume in the VM spec across restarts. list returns the VMI as JSON (see spec.volumes and status.volumeStatus)."
    )]
    async fn volumes(
        &self,
        Parameters(req): Parameters<VolumeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::Volumes(req)).await
    }

    #[tool(
        name = "VirtctlImageOperations",
        description = "Disk image and VM data operations.\n\nupload: upload a local image into a PVC (pvc_name, image_path; optional size, storage_class, upload_config). export: manage a VirtualMachineExport for a VM (vm_name; export_config.action defaults to create). guestfs: open a libguestfs shell on a PVC (pvc_name; guestfs_config). memory-dump: dump VM memory to a PVC (vm_name; memory_dump_config)."
    )]
    async fn images(
        &self,
        Parameters(req): Parameters<ImageInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::Images(req)).await
    }

    #[tool(
        name = "VirtctlServiceManagement",
        description = "Network access to VMs through Kubernetes Services.\n\nexpose: create a Service (ClusterIP, NodePort or LoadBalancer) in front of a VM or VMI; expose_config carries service_name, port, target_port, type, protocol and IP settings. unexpose: delete the named Service with kubectl."
    )]
    async fn services(
        &self,
        Parameters(req): Parameters<ServiceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::Services(req)).await
    }

    #[tool(
        name = "VirtctlCreateResources",
        description = "Generate an instance type or preference manifest with virtctl create.\n\nCluster-scoped by default; set namespaced=true for a namespaced resource in namespace (or the current context namespace). Returns YAML to review and apply."
    )]
    async fn create_resources(
        &self,
        Parameters(req): Parameters<CreateResourcesInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::CreateResources(req)).await
    }

    #[tool(
        name = "VirtctlDataSourceManagement",
        description = "CDI DataSource management. list returns the DataSources of a namespace as JSON. create and clone are not available through virtctl: write a DataSource manifest and apply it with kubectl instead."
    )]
    async fn data_sources(
        &self,
        Parameters(req): Parameters<DataSourceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::DataSources(req)).await
    }

    #[tool(
        name = "GetVersion",
        description = "Get kubectl-mtv and MTV operator version information.\n\nReturns the client version, the operator version and status, the operator namespace and the inventory service URL, as JSON."
    )]
    async fn get_version(
        &self,
        Parameters(req): Parameters<GetVersionInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::GetVersion(req)).await
    }

    #[tool(
        name = "ManageMapping",
        description = "Create or delete network and storage mappings for migration plans.\n\nNetwork pairs use 'source:target' entries separated by commas, where target is 'namespace/name', 'name', 'default' (pod networking) or 'ignored'. Every target except 'ignored' (including 'default') can be used by only one source; duplicates are rejected before kubectl-mtv runs."
    )]
    async fn manage_mapping(
        &self,
        Parameters(req): Parameters<ManageMappingInput>,
    ) -> Result<CallToolResult, McpError> {
        self.respond(ToolRequest::ManageMapping(req)).await
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Tool failures are reported in-band (`is_error`), never as protocol errors.
fn to_call_result(result: Result<String, ToolError>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

/// Descriptors of every registered tool, as served on `tools/list`.
pub fn tool_descriptors() -> Vec<Tool> {
    McpServer::tool_router().list_all()
}

/// Serve the catalogue over stdio until the client disconnects.
pub async fn serve(dispatcher: Dispatcher) -> Result<()> {
    info!(
        virtctl = %dispatcher.settings().virtctl,
        timeout_secs = dispatcher.settings().timeout.as_secs(),
        "starting MCP server on stdio"
    );
    let service = McpServer::new(dispatcher)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| warn!(error = %e, "MCP server failed to start"))?;
    service.waiting().await?;
    info!("client disconnected");
    Ok(())
}
