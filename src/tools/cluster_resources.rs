//! `VirtctlClusterResources`: discover instance types, preferences, data
//! sources and storage classes through kubectl.
//!
//! The namespace is taken literally here: empty means "all namespaces",
//! not "current context".

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::config::Binary;
use crate::invoke::validate::{choice_enum, non_empty, require};
use crate::invoke::{CommandPlan, Invocation, Shape, ToolError};

choice_enum! {
    ResourceType (field = "resource_type", noun = "types") {
        InstanceTypes => "instancetypes",
        Preferences => "preferences",
        DataSources => "datasources",
        StorageClasses => "storageclasses",
        All => "all",
    }
}

choice_enum! {
    Scope (field = "scope", noun = "scopes") {
        All => "all",
        Cluster => "cluster",
        Namespaced => "namespaced",
    }
}

/// One kubectl-listable type; `all` fans out over every one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    InstanceTypes,
    Preferences,
    DataSources,
    StorageClasses,
}

impl Listing {
    const EVERY: [Listing; 4] = [
        Listing::InstanceTypes,
        Listing::Preferences,
        Listing::DataSources,
        Listing::StorageClasses,
    ];

    /// Merge key, the matching `resource_type` literal.
    fn key(self) -> &'static str {
        match self {
            Listing::InstanceTypes => ResourceType::InstanceTypes.as_str(),
            Listing::Preferences => ResourceType::Preferences.as_str(),
            Listing::DataSources => ResourceType::DataSources.as_str(),
            Listing::StorageClasses => ResourceType::StorageClasses.as_str(),
        }
    }
}

impl ResourceType {
    fn listing(self) -> Option<Listing> {
        match self {
            ResourceType::InstanceTypes => Some(Listing::InstanceTypes),
            ResourceType::Preferences => Some(Listing::Preferences),
            ResourceType::DataSources => Some(Listing::DataSources),
            ResourceType::StorageClasses => Some(Listing::StorageClasses),
            ResourceType::All => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ClusterResourcesInput {
    /// Type of resource (instancetypes preferences datasources storageclasses all)
    #[serde(default)]
    pub resource_type: String,
    /// Resource scope (all cluster namespaced) (optional, default: all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Kubernetes namespace for namespaced resources (optional, default: all namespaces)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Label selector for filtering (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    /// Show resource labels (optional)
    #[serde(default)]
    pub show_labels: bool,
}

struct Query<'a> {
    scope: Scope,
    namespace: Option<&'a str>,
    label_selector: Option<&'a str>,
    show_labels: bool,
}

pub fn plan(input: &ClusterResourcesInput) -> Result<Invocation, ToolError> {
    let kind = ResourceType::parse(require("resource_type", &input.resource_type)?)?;
    let scope = match non_empty(&input.scope) {
        Some(s) => Scope::parse(s)?,
        None => Scope::All,
    };
    let query = Query {
        scope,
        namespace: non_empty(&input.namespace),
        label_selector: non_empty(&input.label_selector),
        show_labels: input.show_labels,
    };

    match kind.listing() {
        Some(listing) => Ok(resource_plan(listing, &query)),
        None => Ok(Invocation::Merge(
            Listing::EVERY
                .iter()
                .map(|l| (l.key().to_string(), resource_plan(*l, &query)))
                .collect(),
        )),
    }
}

fn resource_plan(kind: Listing, q: &Query<'_>) -> Invocation {
    let kubectl_kind = match (kind, q.scope) {
        (Listing::InstanceTypes, Scope::All) => {
            return both_scopes("virtualmachineclusterinstancetype", "virtualmachineinstancetype");
        }
        (Listing::Preferences, Scope::All) => {
            return both_scopes("virtualmachineclusterpreference", "virtualmachinepreference");
        }
        (Listing::InstanceTypes, Scope::Cluster) => "virtualmachineclusterinstancetype",
        (Listing::InstanceTypes, _) => "virtualmachineinstancetype",
        (Listing::Preferences, Scope::Cluster) => "virtualmachineclusterpreference",
        (Listing::Preferences, _) => "virtualmachinepreference",
        (Listing::DataSources, _) => "datasource",
        (Listing::StorageClasses, _) => "storageclass",
    };

    let namespaced_kind = kind != Listing::StorageClasses;
    let mut plan = CommandPlan::new(Binary::Kubectl, ["get", kubectl_kind]);
    match q.namespace {
        Some(ns) if namespaced_kind => plan = plan.pair("-n", ns),
        _ if namespaced_kind && q.scope != Scope::Cluster => plan = plan.arg("-A"),
        _ => {}
    }
    let plan = plan
        .opt("-l", q.label_selector)
        .flag("--show-labels", q.show_labels)
        .pair("-o", "json");
    Invocation::run(plan, Shape::Raw)
}

fn both_scopes(cluster_kind: &str, namespaced_kind: &str) -> Invocation {
    Invocation::Merge(vec![
        (
            "cluster".to_string(),
            Invocation::run(
                CommandPlan::new(Binary::Kubectl, ["get", cluster_kind, "-o", "json"]),
                Shape::Raw,
            ),
        ),
        (
            "namespaced".to_string(),
            Invocation::run(
                CommandPlan::new(Binary::Kubectl, ["get", namespaced_kind, "-A", "-o", "json"]),
                Shape::Raw,
            ),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::dispatch::Step;

    fn input(kind: &str, scope: Option<&str>) -> ClusterResourcesInput {
        ClusterResourcesInput {
            resource_type: kind.into(),
            scope: scope.map(String::from),
            ..Default::default()
        }
    }

    fn args(inv: &Invocation) -> Vec<String> {
        match inv {
            Invocation::Run(Step { plan, .. }) => {
                assert_eq!(plan.namespace_request(), None, "no context lookup here");
                plan.finish(None)
            }
            other => panic!("expected single run, got {other:?}"),
        }
    }

    #[test]
    fn both_scopes_run_twice() {
        let inv = plan(&input("instancetypes", None)).unwrap();
        let Invocation::Merge(parts) = inv else {
            panic!("expected merge");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "cluster");
        assert_eq!(
            args(&parts[0].1),
            vec!["get", "virtualmachineclusterinstancetype", "-o", "json"]
        );
        assert_eq!(parts[1].0, "namespaced");
        assert_eq!(
            args(&parts[1].1),
            vec!["get", "virtualmachineinstancetype", "-A", "-o", "json"]
        );
    }

    #[test]
    fn cluster_scope_skips_all_namespaces() {
        let inv = plan(&input("preferences", Some("cluster"))).unwrap();
        assert_eq!(args(&inv), vec!["get", "virtualmachineclusterpreference", "-o", "json"]);
    }

    #[test]
    fn namespaced_with_namespace_and_labels() {
        let mut i = input("instancetypes", Some("namespaced"));
        i.namespace = Some("team-a".into());
        i.label_selector = Some("tier=gold".into());
        i.show_labels = true;
        assert_eq!(
            args(&plan(&i).unwrap()),
            vec![
                "get",
                "virtualmachineinstancetype",
                "-n",
                "team-a",
                "-l",
                "tier=gold",
                "--show-labels",
                "-o",
                "json"
            ]
        );
    }

    #[test]
    fn datasources_default_to_all_namespaces() {
        let inv = plan(&input("datasources", None)).unwrap();
        assert_eq!(args(&inv), vec!["get", "datasource", "-A", "-o", "json"]);
    }

    #[test]
    fn storageclasses_never_namespaced() {
        let mut i = input("storageclasses", None);
        i.namespace = Some("team-a".into());
        assert_eq!(args(&plan(&i).unwrap()), vec!["get", "storageclass", "-o", "json"]);
    }

    #[test]
    fn all_types_are_keyed() {
        let Invocation::Merge(parts) = plan(&input("all", Some("cluster"))).unwrap() else {
            panic!("expected merge");
        };
        let keys: Vec<&str> = parts.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["instancetypes", "preferences", "datasources", "storageclasses"]);
    }

    #[test]
    fn rejects_unknown_scope_and_type() {
        assert_eq!(
            plan(&input("vms", None)).unwrap_err().to_string(),
            "invalid resource_type: vms. Valid types: instancetypes, preferences, datasources, storageclasses, all"
        );
        assert!(plan(&input("datasources", Some("global"))).is_err());
    }

    #[test]
    fn every_concrete_type_has_a_listing() {
        for value in ResourceType::VALUES {
            let kind = ResourceType::parse(value).unwrap();
            match kind.listing() {
                Some(listing) => assert_eq!(listing.key(), *value),
                None => assert_eq!(kind, ResourceType::All),
            }
        }
    }

    #[test]
    fn empty_resource_type_is_missing_not_invalid() {
        assert_eq!(
            plan(&input("", None)).unwrap_err().to_string(),
            "missing required parameter: resource_type"
        );
    }
}
