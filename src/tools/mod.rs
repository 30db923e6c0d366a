//! Tool catalogue: one module per MCP tool, each turning its typed input
//! into an [`Invocation`] without running anything.

pub mod cluster_resources;
pub mod create_resources;
pub mod create_vm;
pub mod data_sources;
pub mod diagnostics;
pub mod images;
pub mod mtv;
pub mod services;
pub mod vm_lifecycle;
pub mod volumes;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::invoke::{Invocation, ToolError};

pub use cluster_resources::ClusterResourcesInput;
pub use create_resources::CreateResourcesInput;
pub use create_vm::CreateVmInput;
pub use data_sources::DataSourceInput;
pub use diagnostics::DiagnosticsInput;
pub use images::ImageInput;
pub use mtv::{GetVersionInput, ManageMappingInput};
pub use services::ServiceInput;
pub use vm_lifecycle::VmLifecycleInput;
pub use volumes::VolumeInput;

/// Registered tool names, in catalogue order.
pub const TOOL_NAMES: &[&str] = &[
    "VirtctlVMLifecycle",
    "VirtctlDiagnostics",
    "VirtctlClusterResources",
    "VirtctlCreateVMAdvanced",
    "VirtctlVolumeManagement",
    "VirtctlImageOperations",
    "VirtctlServiceManagement",
    "VirtctlCreateResources",
    "VirtctlDataSourceManagement",
    "GetVersion",
    "ManageMapping",
];

/// A fully decoded call to one tool.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    VmLifecycle(VmLifecycleInput),
    Diagnostics(DiagnosticsInput),
    ClusterResources(ClusterResourcesInput),
    CreateVm(CreateVmInput),
    Volumes(VolumeInput),
    Images(ImageInput),
    Services(ServiceInput),
    CreateResources(CreateResourcesInput),
    DataSources(DataSourceInput),
    GetVersion(GetVersionInput),
    ManageMapping(ManageMappingInput),
}

impl ToolRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ToolRequest::VmLifecycle(_) => "VirtctlVMLifecycle",
            ToolRequest::Diagnostics(_) => "VirtctlDiagnostics",
            ToolRequest::ClusterResources(_) => "VirtctlClusterResources",
            ToolRequest::CreateVm(_) => "VirtctlCreateVMAdvanced",
            ToolRequest::Volumes(_) => "VirtctlVolumeManagement",
            ToolRequest::Images(_) => "VirtctlImageOperations",
            ToolRequest::Services(_) => "VirtctlServiceManagement",
            ToolRequest::CreateResources(_) => "VirtctlCreateResources",
            ToolRequest::DataSources(_) => "VirtctlDataSourceManagement",
            ToolRequest::GetVersion(_) => "GetVersion",
            ToolRequest::ManageMapping(_) => "ManageMapping",
        }
    }

    /// Validate the input and build the command(s) to run.
    pub fn plan(&self) -> Result<Invocation, ToolError> {
        match self {
            ToolRequest::VmLifecycle(i) => vm_lifecycle::plan(i),
            ToolRequest::Diagnostics(i) => diagnostics::plan(i),
            ToolRequest::ClusterResources(i) => cluster_resources::plan(i),
            ToolRequest::CreateVm(i) => create_vm::plan(i),
            ToolRequest::Volumes(i) => volumes::plan(i),
            ToolRequest::Images(i) => images::plan(i),
            ToolRequest::Services(i) => services::plan(i),
            ToolRequest::CreateResources(i) => create_resources::plan(i),
            ToolRequest::DataSources(i) => data_sources::plan(i),
            ToolRequest::GetVersion(i) => mtv::get_version(i),
            ToolRequest::ManageMapping(i) => mtv::manage_mapping(i),
        }
    }

    /// Decode a JSON argument object for the named tool. The name is matched
    /// case-insensitively.
    pub fn from_json(name: &str, arguments: Value) -> Result<Self, ToolError> {
        let canonical = canonical_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let request = match canonical {
            "VirtctlVMLifecycle" => ToolRequest::VmLifecycle(decode(canonical, arguments)?),
            "VirtctlDiagnostics" => ToolRequest::Diagnostics(decode(canonical, arguments)?),
            "VirtctlClusterResources" => ToolRequest::ClusterResources(decode(canonical, arguments)?),
            "VirtctlCreateVMAdvanced" => ToolRequest::CreateVm(decode(canonical, arguments)?),
            "VirtctlVolumeManagement" => ToolRequest::Volumes(decode(canonical, arguments)?),
            "VirtctlImageOperations" => ToolRequest::Images(decode(canonical, arguments)?),
            "VirtctlServiceManagement" => ToolRequest::Services(decode(canonical, arguments)?),
            "VirtctlCreateResources" => ToolRequest::CreateResources(decode(canonical, arguments)?),
            "VirtctlDataSourceManagement" => ToolRequest::DataSources(decode(canonical, arguments)?),
            "GetVersion" => ToolRequest::GetVersion(decode(canonical, arguments)?),
            "ManageMapping" => ToolRequest::ManageMapping(decode(canonical, arguments)?),
            _ => return Err(ToolError::UnknownTool(name.to_string())),
        };
        Ok(request)
    }
}

/// Registered spelling of `name`, ignoring ASCII case.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    TOOL_NAMES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(name))
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    // A bare `null` means "no arguments". Required fields default to empty and
    // are rejected by the tool's own plan, so they surface as validation errors.
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|source| ToolError::Arguments {
        tool: tool.to_string(),
        source,
    })
}
