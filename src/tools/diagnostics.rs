//! `VirtctlDiagnostics`: guest agent queries and client/server version.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError};

choice_enum! {
    DiagnosticType (field = "diagnostic_type", noun = "types") {
        GuestOsInfo => "guestosinfo",
        FsList => "fslist",
        UserList => "userlist",
        Version => "version",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DiagnosticsInput {
    /// Diagnostic operation (guestosinfo fslist userlist version)
    #[serde(default)]
    pub diagnostic_type: String,
    /// Name of the virtual machine (not needed for version)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    /// Kubernetes namespace containing the VM (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

pub fn plan(input: &DiagnosticsInput) -> Result<Invocation, ToolError> {
    let kind = DiagnosticType::parse(require("diagnostic_type", &input.diagnostic_type)?)?;

    let plan = if kind == DiagnosticType::Version {
        CommandPlan::new(Binary::Virtctl, ["version"])
    } else {
        let vm = require("vm_name", non_empty(&input.vm_name).unwrap_or(""))?;
        CommandPlan::new(Binary::Virtctl, [kind.as_str(), vm]).namespace(non_empty(&input.namespace))
    };
    Ok(Invocation::run(plan, Shape::Json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::dispatch::Step;

    fn args_of(input: &DiagnosticsInput) -> Vec<String> {
        match plan(input).unwrap() {
            Invocation::Run(Step { plan, shape }) => {
                assert_eq!(shape, Shape::Json);
                plan.finish(Some("ctx"))
            }
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    #[test]
    fn version_skips_vm_and_namespace() {
        let i = DiagnosticsInput {
            diagnostic_type: "version".into(),
            vm_name: Some("ignored".into()),
            namespace: Some("ns".into()),
        };
        assert_eq!(args_of(&i), vec!["version"]);
    }

    #[test]
    fn guest_query_uses_vm_and_namespace() {
        let i = DiagnosticsInput {
            diagnostic_type: "fslist".into(),
            vm_name: Some("db".into()),
            namespace: None,
        };
        assert_eq!(args_of(&i), vec!["fslist", "db", "-n", "ctx"]);
    }

    #[test]
    fn guest_query_requires_vm() {
        let i = DiagnosticsInput {
            diagnostic_type: "userlist".into(),
            ..Default::default()
        };
        assert_eq!(
            plan(&i).unwrap_err().to_string(),
            "missing required parameter: vm_name"
        );
    }

    #[test]
    fn unknown_type_lists_valid_ones() {
        let i = DiagnosticsInput {
            diagnostic_type: "top".into(),
            ..Default::default()
        };
        assert_eq!(
            plan(&i).unwrap_err().to_string(),
            "invalid diagnostic_type: top. Valid types: guestosinfo, fslist, userlist, version"
        );
    }
}
