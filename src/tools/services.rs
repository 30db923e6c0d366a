//! `VirtctlServiceManagement`: expose a VM as a Kubernetes Service, or remove it.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require, require_opt};
use crate::invoke::{CommandPlan, ConfigFlag, Invocation, Shape, ToolError};

choice_enum! {
    ServiceOp (field = "operation", noun = "operations") {
        Expose => "expose",
        Unexpose => "unexpose",
    }
}

choice_enum! {
    ExposeTarget (field = "resource_type", noun = "types") {
        Vm => "vm",
        Vmi => "vmi",
    }
}

const EXPOSE_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::Scalar("port", "--port"),
    ConfigFlag::Scalar("target_port", "--target-port"),
    ConfigFlag::Str("type", "--type"),
    ConfigFlag::Str("protocol", "--protocol"),
    ConfigFlag::Str("cluster_ip", "--cluster-ip"),
    ConfigFlag::Str("external_ip", "--external-ip"),
    ConfigFlag::Str("load_balancer_ip", "--load-balancer-ip"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ServiceInput {
    /// Service operation (expose unexpose)
    #[serde(default)]
    pub operation: String,
    /// Name of the VM or VMI to expose
    #[serde(default)]
    pub resource_name: String,
    /// Resource type (vm vmi) (optional, default: vm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Kubernetes namespace (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Expose options: service_name port target_port type protocol cluster_ip external_ip load_balancer_ip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_config: Option<Map<String, Value>>,
    /// Service name; required for unexpose, used as --name for expose when
    /// expose_config.service_name is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

pub fn plan(input: &ServiceInput) -> Result<Invocation, ToolError> {
    let op = ServiceOp::parse(require("operation", &input.operation)?)?;
    let namespace = non_empty(&input.namespace);

    match op {
        ServiceOp::Expose => {
            let name = require("resource_name", &input.resource_name)?;
            let target = match non_empty(&input.resource_type) {
                Some(t) => ExposeTarget::parse(t)?,
                None => ExposeTarget::Vm,
            };
            let service_name = input
                .expose_config
                .as_ref()
                .and_then(|c| c.get("service_name"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .or(non_empty(&input.service_name));
            let plan = CommandPlan::new(Binary::Virtctl, ["expose", target.as_str(), name])
                .namespace(namespace)
                .opt("--name", service_name)
                .config(input.expose_config.as_ref(), EXPOSE_FLAGS);
            Ok(Invocation::run(plan, Shape::Raw))
        }
        ServiceOp::Unexpose => {
            let service = require_opt("service_name", &input.service_name)?;
            let plan =
                CommandPlan::new(Binary::Kubectl, ["delete", "service", service]).namespace(namespace);
            Ok(Invocation::run(plan, Shape::Envelope))
        }
    }
}
