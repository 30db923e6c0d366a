//! `VirtctlCreateVMAdvanced`: render a VirtualMachine manifest with `virtctl create vm`.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty};
use crate::invoke::{CommandPlan, ConfigFlag, Invocation, Shape, ToolError};

choice_enum! {
    RunStrategy (field = "run_strategy", noun = "strategies") {
        Always => "Always",
        RerunOnFailure => "RerunOnFailure",
        Manual => "Manual",
        Halted => "Halted",
    }
}

const VOLUME_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::List("containerdisk", "--volume-containerdisk"),
    ConfigFlag::List("datasource", "--volume-datasource"),
    ConfigFlag::List("clone_pvc", "--volume-clone-pvc"),
    ConfigFlag::List("pvc", "--volume-pvc"),
    ConfigFlag::List("blank", "--volume-blank"),
];

const CLOUD_INIT_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::Str("user", "--user"),
    ConfigFlag::List("ssh_key", "--ssh-key"),
    ConfigFlag::Str("user_data", "--cloud-init-user-data"),
    ConfigFlag::Str("network_data", "--cloud-init-network-data"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateVmInput {
    /// VM name (optional, virtctl picks a random one when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Kubernetes namespace (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Instance type name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instancetype: Option<String>,
    /// Preference name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
    /// Run strategy (Always RerunOnFailure Manual Halted) (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_strategy: Option<String>,
    /// Volumes keyed by kind (containerdisk datasource clone_pvc pvc blank); each value is a
    /// virtctl volume spec string or a list of them (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Map<String, Value>>,
    /// Cloud-init settings: user, ssh_key, user_data, network_data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<Map<String, Value>>,
    /// Infer instance type from the boot volume (optional)
    #[serde(default)]
    pub infer_instancetype: bool,
    /// Infer preference from the boot volume (optional)
    #[serde(default)]
    pub infer_preference: bool,
    /// Volume name to infer the instance type from (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infer_instancetype_from: Option<String>,
    /// Volume name to infer the preference from (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infer_preference_from: Option<String>,
    /// Grace period for VM termination in seconds (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_grace_period: Option<u64>,
    /// Use generateName instead of name (optional)
    #[serde(default)]
    pub generate_name: bool,
}

pub fn plan(input: &CreateVmInput) -> Result<Invocation, ToolError> {
    let run_strategy = non_empty(&input.run_strategy)
        .map(RunStrategy::parse)
        .transpose()?;

    let plan = CommandPlan::new(Binary::Virtctl, ["create", "vm"])
        .arg_opt(non_empty(&input.name))
        .namespace(non_empty(&input.namespace))
        .opt("--instancetype", non_empty(&input.instancetype))
        .opt("--preference", non_empty(&input.preference))
        .opt("--run-strategy", run_strategy.map(RunStrategy::as_str))
        .flag("--infer-instancetype", input.infer_instancetype)
        .flag("--infer-preference", input.infer_preference)
        .opt("--infer-instancetype-from", non_empty(&input.infer_instancetype_from))
        .opt("--infer-preference-from", non_empty(&input.infer_preference_from))
        .opt_count("--termination-grace-period", input.termination_grace_period)
        .flag("--generate-name", input.generate_name)
        .config(input.volumes.as_ref(), VOLUME_FLAGS)
        .config(input.cloud_init.as_ref(), CLOUD_INIT_FLAGS);

    Ok(Invocation::run(plan, Shape::Raw))
}
