//! Migration tools backed by `kubectl-mtv`.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require, validate_network_pairs};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetVersionInput {
    /// Unused placeholder; some clients cannot send an empty object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_string: Option<String>,
}

pub fn get_version(_input: &GetVersionInput) -> Result<Invocation, ToolError> {
    let plan = CommandPlan::new(Binary::Mtv, ["version"]).pair("-o", "json");
    Ok(Invocation::run(plan, Shape::Envelope))
}

choice_enum! {
    MappingOp (field = "operation", noun = "operations") {
        Create => "create",
        Delete => "delete",
    }
}

choice_enum! {
    MappingType (field = "mapping_type", noun = "types") {
        Network => "network",
        Storage => "storage",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ManageMappingInput {
    /// Mapping operation (create delete)
    #[serde(default)]
    pub operation: String,
    /// Mapping type (network storage)
    #[serde(default)]
    pub mapping_type: String,
    /// Name of the mapping
    #[serde(default)]
    pub name: String,
    /// Kubernetes namespace (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Source provider name (create)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_provider: Option<String>,
    /// Target provider name (create)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_provider: Option<String>,
    /// Network pairs "source:target,...", network mappings only. Each target,
    /// "default" (pod networking) included, may be claimed once; "ignored" may repeat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_pairs: Option<String>,
    /// Storage pairs "source:storage-class,...", storage mappings only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_pairs: Option<String>,
}

pub fn manage_mapping(input: &ManageMappingInput) -> Result<Invocation, ToolError> {
    let op = require("operation", &input.operation)?;
    let kind = require("mapping_type", &input.mapping_type)?;
    let name = require("name", &input.name)?;
    let op = MappingOp::parse(op)?;
    let kind = MappingType::parse(kind)?;
    let namespace = non_empty(&input.namespace);

    let plan = match op {
        MappingOp::Delete => {
            CommandPlan::new(Binary::Mtv, ["delete", "mapping", kind.as_str(), name])
                .namespace(namespace)
        }
        MappingOp::Create => {
            let plan = CommandPlan::new(Binary::Mtv, ["create", "mapping", kind.as_str(), name])
                .namespace(namespace)
                .opt("--source", non_empty(&input.source_provider))
                .opt("--target", non_empty(&input.target_provider));
            match kind {
                MappingType::Network => {
                    let pairs = non_empty(&input.network_pairs);
                    if let Some(pairs) = pairs {
                        validate_network_pairs(pairs)?;
                    }
                    plan.opt("--network-pairs", pairs)
                }
                MappingType::Storage => plan.opt("--storage-pairs", non_empty(&input.storage_pairs)),
            }
        }
    };
    Ok(Invocation::run(plan, Shape::Json))
}
