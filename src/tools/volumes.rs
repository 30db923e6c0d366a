//! `VirtctlVolumeManagement`: hotplug volumes on a running VM, or list them.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError, ValidationError};

choice_enum! {
    VolumeOp (field = "operation", noun = "operations") {
        Add => "add",
        Remove => "remove",
        List => "list",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct VolumeInput {
    /// Name of the virtual machine
    #[serde(default)]
    pub vm_name: String,
    /// Volume operation (add remove list)
    #[serde(default)]
    pub operation: String,
    /// Kubernetes namespace containing the VM (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Name of the volume (required for add/remove)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,
    /// Persist the change to the VM spec, add only (optional)
    #[serde(default)]
    pub persist: bool,
    /// Show what would be done without executing (optional)
    #[serde(default)]
    pub dry_run: bool,
}

pub fn plan(input: &VolumeInput) -> Result<Invocation, ToolError> {
    let vm = require("vm_name", &input.vm_name)?;
    let op = VolumeOp::parse(require("operation", &input.operation)?)?;
    let namespace = non_empty(&input.namespace);

    let head = match op {
        VolumeOp::List => {
            let plan = CommandPlan::new(Binary::Kubectl, ["get", "vmi", vm])
                .namespace(namespace)
                .pair("-o", "json");
            return Ok(Invocation::run(plan, Shape::Envelope));
        }
        VolumeOp::Add => "addvolume",
        VolumeOp::Remove => "removevolume",
    };

    let volume = non_empty(&input.volume_name).ok_or(ValidationError::RequiredFor {
        field: "volume_name",
        operation: op.as_str(),
    })?;
    let plan = CommandPlan::new(Binary::Virtctl, [head, vm])
        .pair("--volume-name", volume)
        .flag("--persist", op == VolumeOp::Add && input.persist)
        .namespace(namespace)
        .flag("--dry-run", input.dry_run);
    Ok(Invocation::run(plan, Shape::Raw))
}
