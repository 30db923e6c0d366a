//! `VirtctlImageOperations`: disk image upload, VM export, libguestfs shell
//! and memory dumps. Each operation has its own required fields and its own
//! nested config mapping.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require, require_opt};
use crate::invoke::{CommandPlan, ConfigFlag, Invocation, Shape, ToolError};

choice_enum! {
    ImageOp (field = "operation", noun = "operations") {
        Upload => "upload",
        Export => "export",
        Guestfs => "guestfs",
        MemoryDump => "memory-dump",
    }
}

const UPLOAD_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::Str("access_mode", "--access-mode"),
    ConfigFlag::Str("volume_mode", "--volume-mode"),
    ConfigFlag::Bool("insecure", "--insecure"),
    ConfigFlag::Bool("force_bind", "--force-bind"),
    ConfigFlag::Bool("no_create", "--no-create"),
    ConfigFlag::Bool("block_volume", "--block-volume"),
    ConfigFlag::Str("uploadproxy_url", "--uploadproxy-url"),
];

const EXPORT_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::Str("output", "--output"),
    ConfigFlag::Bool("manifest", "--manifest"),
    ConfigFlag::Str("pvc", "--pvc"),
    ConfigFlag::Str("ttl", "--ttl"),
    ConfigFlag::Scalar("port", "--port"),
];

const GUESTFS_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::Bool("kvm", "--kvm"),
    ConfigFlag::Str("pull_method", "--pull-method"),
    ConfigFlag::Str("root_disk_size", "--root-disk-size"),
];

const MEMORY_DUMP_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::Str("claim_name", "--claim-name"),
    ConfigFlag::Bool("create_claim", "--create-claim"),
    ConfigFlag::Str("volume_mode", "--volume-mode"),
    ConfigFlag::Str("access_mode", "--access-mode"),
    ConfigFlag::Str("storage_class", "--storage-class"),
];

const DEFAULT_EXPORT_ACTION: &str = "create";

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ImageInput {
    /// Image operation (upload export guestfs memory-dump)
    #[serde(default)]
    pub operation: String,
    /// VM name (required for export and memory-dump)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    /// Kubernetes namespace (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Local image file path (required for upload)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// PVC name (required for upload and guestfs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc_name: Option<String>,
    /// PVC size for new volumes, e.g. "10Gi" (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Storage class for new PVCs (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// Upload options: access_mode volume_mode insecure force_bind no_create block_volume uploadproxy_url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_config: Option<Map<String, Value>>,
    /// Libguestfs options: kvm pull_method root_disk_size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guestfs_config: Option<Map<String, Value>>,
    /// Memory dump options: claim_name create_claim volume_mode access_mode storage_class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_dump_config: Option<Map<String, Value>>,
    /// Export options: action (create delete download, default create) output manifest pvc ttl port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_config: Option<Map<String, Value>>,
}

pub fn plan(input: &ImageInput) -> Result<Invocation, ToolError> {
    let op = ImageOp::parse(require("operation", &input.operation)?)?;

    let plan = match op {
        ImageOp::Upload => upload(input)?,
        ImageOp::Export => export(input)?,
        ImageOp::Guestfs => {
            let pvc = require_opt("pvc_name", &input.pvc_name)?;
            CommandPlan::new(Binary::Virtctl, ["guestfs", pvc])
                .config(input.guestfs_config.as_ref(), GUESTFS_FLAGS)
        }
        ImageOp::MemoryDump => {
            let vm = require_opt("vm_name", &input.vm_name)?;
            CommandPlan::new(Binary::Virtctl, ["memory-dump", "get", vm])
                .config(input.memory_dump_config.as_ref(), MEMORY_DUMP_FLAGS)
        }
    };

    Ok(Invocation::run(
        plan.namespace(non_empty(&input.namespace)),
        Shape::Raw,
    ))
}

fn upload(input: &ImageInput) -> Result<CommandPlan, ToolError> {
    let pvc = require_opt("pvc_name", &input.pvc_name)?;
    let image = require_opt("image_path", &input.image_path)?;
    Ok(CommandPlan::new(Binary::Virtctl, ["image-upload", pvc])
        .pair("--image-path", image)
        .opt("--size", non_empty(&input.size))
        .opt("--storage-class", non_empty(&input.storage_class))
        .config(input.upload_config.as_ref(), UPLOAD_FLAGS))
}

fn export(input: &ImageInput) -> Result<CommandPlan, ToolError> {
    let vm = require_opt("vm_name", &input.vm_name)?;
    let action = input
        .export_config
        .as_ref()
        .and_then(|c| c.get("action"))
        .and_then(Value::as_str)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_EXPORT_ACTION);
    Ok(CommandPlan::new(Binary::Virtctl, ["vmexport", action, vm])
        .config(input.export_config.as_ref(), EXPORT_FLAGS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::dispatch::Step;
    use serde_json::json;

    fn args_of(input: &ImageInput) -> Vec<String> {
        match plan(input).unwrap() {
            Invocation::Run(Step { plan, .. }) => plan.finish(Some("ns1")),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    fn op(name: &str) -> ImageInput {
        ImageInput {
            operation: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn upload_with_config() {
        let mut i = op("upload");
        i.pvc_name = Some("fedora-disk".into());
        i.image_path = Some("/tmp/fedora.qcow2".into());
        i.size = Some("20Gi".into());
        i.upload_config = json!({"insecure": true, "access_mode": "ReadWriteMany", "no_create": false})
            .as_object()
            .cloned();
        assert_eq!(
            args_of(&i),
            vec![
                "image-upload",
                "fedora-disk",
                "--image-path",
                "/tmp/fedora.qcow2",
                "--size",
                "20Gi",
                "--access-mode",
                "ReadWriteMany",
                "--insecure",
                "-n",
                "ns1"
            ]
        );
    }

    #[test]
    fn upload_requires_pvc_then_image() {
        let mut i = op("upload");
        assert_eq!(
            plan(&i).unwrap_err().to_string(),
            "missing required parameter: pvc_name"
        );
        i.pvc_name = Some("disk".into());
        assert_eq!(
            plan(&i).unwrap_err().to_string(),
            "missing required parameter: image_path"
        );
    }

    #[test]
    fn export_defaults_to_create() {
        let mut i = op("export");
        i.vm_name = Some("vm1".into());
        assert_eq!(args_of(&i), vec!["vmexport", "create", "vm1", "-n", "ns1"]);
    }

    #[test]
    fn export_action_and_port_variants() {
        let mut i = op("export");
        i.vm_name = Some("vm1".into());
        i.export_config = json!({"action": "download", "output": "/tmp/disk.img", "manifest": true, "port": 5410.0})
            .as_object()
            .cloned();
        assert_eq!(
            args_of(&i),
            vec![
                "vmexport",
                "download",
                "vm1",
                "--output",
                "/tmp/disk.img",
                "--manifest",
                "--port",
                "5410",
                "-n",
                "ns1"
            ]
        );

        i.export_config = json!({"port": "8080"}).as_object().cloned();
        assert_eq!(
            args_of(&i),
            vec!["vmexport", "create", "vm1", "--port", "8080", "-n", "ns1"]
        );
    }

    #[test]
    fn guestfs_and_memory_dump() {
        let mut g = op("guestfs");
        g.pvc_name = Some("disk".into());
        g.guestfs_config = json!({"kvm": true, "pull_method": "node"}).as_object().cloned();
        assert_eq!(
            args_of(&g),
            vec!["guestfs", "disk", "--kvm", "--pull-method", "node", "-n", "ns1"]
        );

        let mut m = op("memory-dump");
        m.vm_name = Some("vm1".into());
        m.memory_dump_config = json!({"claim_name": "dump", "create_claim": true})
            .as_object()
            .cloned();
        assert_eq!(
            args_of(&m),
            vec![
                "memory-dump",
                "get",
                "vm1",
                "--claim-name",
                "dump",
                "--create-claim",
                "-n",
                "ns1"
            ]
        );
    }

    #[test]
    fn rejects_unknown_operation() {
        assert_eq!(
            plan(&op("download")).unwrap_err().to_string(),
            "invalid operation: download. Valid operations: upload, export, guestfs, memory-dump"
        );
        assert_eq!(
            plan(&op("")).unwrap_err().to_string(),
            "missing required parameter: operation"
        );
    }
}
