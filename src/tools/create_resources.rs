//! `VirtctlCreateResources`: instance type / preference manifests.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError};

choice_enum! {
    CreatableResource (field = "resource_type", noun = "types") {
        InstanceType => "instancetype",
        Preference => "preference",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateResourcesInput {
    /// Type of resource (instancetype preference)
    #[serde(default)]
    pub resource_type: String,
    /// Name of the resource
    #[serde(default)]
    pub name: String,
    /// Create a namespaced resource (default: cluster-scoped)
    #[serde(default)]
    pub namespaced: bool,
    /// Kubernetes namespace, used only when namespaced is true (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

pub fn plan(input: &CreateResourcesInput) -> Result<Invocation, ToolError> {
    let kind = require("resource_type", &input.resource_type)?;
    let name = require("name", &input.name)?;
    let kind = CreatableResource::parse(kind)?;

    let mut plan = CommandPlan::new(Binary::Virtctl, ["create", kind.as_str(), name]);
    if input.namespaced {
        plan = plan.namespace(non_empty(&input.namespace));
    }
    Ok(Invocation::run(plan, Shape::Raw))
}
