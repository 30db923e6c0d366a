//! `VirtctlVMLifecycle`: power-state changes for a virtual machine.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError};

choice_enum! {
    LifecycleOp (field = "operation", noun = "operations") {
        Start => "start",
        Stop => "stop",
        Restart => "restart",
        Pause => "pause",
        Unpause => "unpause",
        Migrate => "migrate",
        SoftReboot => "soft-reboot",
    }
}

impl LifecycleOp {
    fn takes_grace_period(self) -> bool {
        matches!(self, LifecycleOp::Stop | LifecycleOp::Restart)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct VmLifecycleInput {
    /// Name of the virtual machine
    #[serde(default)]
    pub vm_name: String,
    /// Lifecycle operation (start stop restart pause unpause migrate soft-reboot)
    #[serde(default)]
    pub operation: String,
    /// Kubernetes namespace containing the VM (optional, defaults to the current context)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Graceful termination period in seconds, stop/restart only (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<u64>,
    /// Force the operation, stop/restart only (optional)
    #[serde(default)]
    pub force: bool,
    /// Show what would be done without executing (optional)
    #[serde(default)]
    pub dry_run: bool,
    /// Target node name for the migrate operation (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    /// Operation timeout, e.g. "5m" (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

pub fn plan(input: &VmLifecycleInput) -> Result<Invocation, ToolError> {
    let vm = require("vm_name", &input.vm_name)?;
    let op = LifecycleOp::parse(require("operation", &input.operation)?)?;

    let graceful = op.takes_grace_period();
    let plan = CommandPlan::new(Binary::Virtctl, [op.as_str(), vm])
        .namespace(non_empty(&input.namespace))
        .opt_count("--grace-period", input.grace_period.filter(|_| graceful))
        .flag("--force", graceful && input.force)
        .opt(
            "--node",
            non_empty(&input.node_name).filter(|_| op == LifecycleOp::Migrate),
        )
        .flag("--dry-run", input.dry_run)
        .opt("--timeout", non_empty(&input.timeout));

    Ok(Invocation::run(
        plan,
        Shape::Report {
            message: "VM lifecycle operation completed successfully",
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::ValidationError;
    use crate::invoke::dispatch::Step;

    fn args_of(input: &VmLifecycleInput) -> Vec<String> {
        match plan(input).unwrap() {
            Invocation::Run(Step { plan, .. }) => plan.finish(Some("ns1")),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    fn input(op: &str) -> VmLifecycleInput {
        VmLifecycleInput {
            vm_name: "vm1".into(),
            operation: op.into(),
            ..Default::default()
        }
    }

    #[test]
    fn stop_with_grace_and_force() {
        let mut i = input("stop");
        i.grace_period = Some(30);
        i.force = true;
        assert_eq!(
            args_of(&i),
            vec!["stop", "vm1", "-n", "ns1", "--grace-period", "30", "--force"]
        );
    }

    #[test]
    fn grace_and_force_ignored_for_start() {
        let mut i = input("start");
        i.grace_period = Some(30);
        i.force = true;
        i.dry_run = true;
        assert_eq!(args_of(&i), vec!["start", "vm1", "-n", "ns1", "--dry-run"]);
    }

    #[test]
    fn migrate_targets_node() {
        let mut i = input("migrate");
        i.node_name = Some("worker-2".into());
        i.timeout = Some("5m".into());
        i.namespace = Some("vms".into());
        assert_eq!(
            args_of(&i),
            vec!["migrate", "vm1", "-n", "vms", "--node", "worker-2", "--timeout", "5m"]
        );
    }

    #[test]
    fn node_only_for_migrate() {
        let mut i = input("restart");
        i.node_name = Some("worker-2".into());
        assert_eq!(args_of(&i), vec!["restart", "vm1", "-n", "ns1"]);
    }

    #[test]
    fn rejects_unknown_operation() {
        let err = plan(&input("reboot")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid operation: reboot. Valid operations: start, stop, restart, pause, unpause, migrate, soft-reboot"
        );
    }

    #[test]
    fn requires_vm_name_first() {
        let mut i = input("bogus");
        i.vm_name.clear();
        assert!(matches!(
            plan(&i),
            Err(ToolError::Validation(ValidationError::MissingField { field: "vm_name" }))
        ));
    }
}
