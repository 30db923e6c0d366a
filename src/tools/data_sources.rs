//! `VirtctlDataSourceManagement`: CDI DataSource listing.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError};

choice_enum! {
    DataSourceOp (field = "operation", noun = "operations") {
        List => "list",
        Create => "create",
        Clone => "clone",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DataSourceInput {
    /// DataSource operation (list create clone)
    #[serde(default)]
    pub operation: String,
    /// DataSource name (create/clone)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Kubernetes namespace (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Source configuration for DataSource creation (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_config: Option<Map<String, Value>>,
}

pub fn plan(input: &DataSourceInput) -> Result<Invocation, ToolError> {
    let op = DataSourceOp::parse(require("operation", &input.operation)?)?;
    match op {
        DataSourceOp::List => {
            let plan = CommandPlan::new(Binary::Kubectl, ["get", "datasource"])
                .namespace(non_empty(&input.namespace))
                .pair("-o", "json");
            Ok(Invocation::run(plan, Shape::Envelope))
        }
        DataSourceOp::Create => Err(ToolError::Unsupported(
            "create not implemented; generate a CDI DataSource manifest and apply with kubectl",
        )),
        DataSourceOp::Clone => Err(ToolError::Unsupported("clone not implemented")),
    }
}
