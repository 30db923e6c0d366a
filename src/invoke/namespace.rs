//! Namespace resolution from the active kubectl context.

use std::time::Duration;

use tracing::debug;

use super::runner::ProcessRunner;
use crate::config::CommandSpec;

pub const DEFAULT_NAMESPACE: &str = "default";

/// Upper bound for the context lookup; it is a convenience, not worth the full tool timeout.
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

const QUERY_ARGS: [&str; 5] = [
    "config",
    "view",
    "--minify",
    "--output",
    "jsonpath={..namespace}",
];

#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    kubectl: CommandSpec,
    runner: ProcessRunner,
}

impl NamespaceResolver {
    pub fn new(kubectl: CommandSpec, runner: ProcessRunner) -> Self {
        Self { kubectl, runner }
    }

    /// An explicit non-empty namespace wins unchanged; otherwise ask the
    /// current context and fall back to `default`. Never fails and never caches.
    pub async fn resolve(&self, explicit: Option<&str>) -> String {
        if let Some(ns) = explicit
            && !ns.is_empty()
        {
            return ns.to_string();
        }
        self.current().await
    }

    async fn current(&self) -> String {
        let args: Vec<String> = QUERY_ARGS.iter().map(|s| s.to_string()).collect();
        let timeout = QUERY_TIMEOUT.min(self.runner.timeout());
        match self
            .runner
            .run_with_timeout(&self.kubectl, &args, timeout)
            .await
        {
            Ok(res) => {
                let ns = res.stdout.trim();
                if ns.is_empty() {
                    DEFAULT_NAMESPACE.to_string()
                } else {
                    ns.to_string()
                }
            }
            Err(e) => {
                debug!(error = %e, "namespace lookup failed; using default");
                DEFAULT_NAMESPACE.to_string()
            }
        }
    }
}
