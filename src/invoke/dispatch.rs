/*!
Tool invocation façade.

Per call, terminal on the first failure:

  validate required fields -> validate enums -> build arguments
    -> resolve namespace -> run process -> shape output -> return

The first three stages live in each tool's `plan()` and never spawn
anything. Composite invocations (e.g. cluster + namespaced listings) run
each part and merge the successful ones into one JSON object.
*/

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::args::CommandPlan;
use super::error::ToolError;
use super::namespace::NamespaceResolver;
use super::normalize::{normalize, to_value};
use super::runner::{ExecutionResult, ProcessRunner};
use crate::config::{CommandSpec, Settings};
use crate::tools::ToolRequest;

/// How captured stdout becomes the tool result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// stdout verbatim.
    Raw,
    /// stdout through the JSON normalizer.
    Json,
    /// `{command, return_value, stdout, stderr}` with stdout parsed when JSON.
    Envelope,
    /// `{status, message, command, output}` summary of a state change.
    Report { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub plan: CommandPlan,
    pub shape: Shape,
}

/// Everything a tool needs executed, decided before any process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Step),
    /// Keyed parts; a failing part is left out of the merged object.
    Merge(Vec<(String, Invocation)>),
}

impl Invocation {
    pub fn run(plan: CommandPlan, shape: Shape) -> Self {
        Invocation::Run(Step { plan, shape })
    }
}

type BoxedResult<'a> = Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    settings: Arc<Settings>,
    runner: ProcessRunner,
    resolver: NamespaceResolver,
}

impl Dispatcher {
    pub fn new(settings: Arc<Settings>) -> Self {
        let runner = ProcessRunner::new(settings.timeout);
        let resolver = NamespaceResolver::new(settings.kubectl.clone(), runner.clone());
        Self {
            settings,
            runner,
            resolver,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, plan and execute one tool request.
    pub async fn call(&self, request: ToolRequest) -> Result<String, ToolError> {
        let tool = request.name();
        let started = Instant::now();
        let invocation = request.plan()?;
        debug!(tool, ?invocation, "planned");
        let result = self.execute(&invocation).await;
        if let Err(ToolError::Execution(e)) = &result {
            warn!(
                tool,
                exit_code = ?e.exit_code(),
                timed_out = e.is_timeout(),
                "external command failed"
            );
        }
        info!(
            tool,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tool call finished"
        );
        result
    }

    pub fn execute<'a>(&'a self, invocation: &'a Invocation) -> BoxedResult<'a> {
        Box::pin(async move {
            match invocation {
                Invocation::Run(step) => self.run_step(step).await,
                Invocation::Merge(parts) => {
                    let mut merged = Map::new();
                    for (key, part) in parts {
                        match self.execute(part).await {
                            Ok(out) => {
                                merged.insert(key.clone(), to_value(&out));
                            }
                            Err(e) => debug!(part = %key, error = %e, "omitting failed part"),
                        }
                    }
                    Ok(pretty(&Value::Object(merged)))
                }
            }
        })
    }

    async fn run_step(&self, step: &Step) -> Result<String, ToolError> {
        let namespace = match step.plan.namespace_request() {
            Some(explicit) => Some(self.resolver.resolve(explicit).await),
            None => None,
        };
        let args = step.plan.finish(namespace.as_deref());
        let command = self.settings.command(step.plan.binary);
        let result = self.runner.run(command, &args).await?;
        Ok(shape_output(step.shape, command, &args, result))
    }
}

fn shape_output(shape: Shape, command: &CommandSpec, args: &[String], res: ExecutionResult) -> String {
    match shape {
        Shape::Raw => res.stdout,
        Shape::Json => normalize(&res.stdout),
        Shape::Envelope => pretty(&json!({
            "command": command_line(command, args),
            "return_value": res.exit_code,
            "stdout": to_value(&res.stdout),
            "stderr": res.stderr,
        })),
        Shape::Report { message } => pretty(&json!({
            "status": "success",
            "message": message,
            "command": command_line(command, args),
            "output": res.stdout.trim(),
        })),
    }
}

fn command_line(command: &CommandSpec, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::Binary;
    use std::time::Duration;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec {
            program: "sh".into(),
            prefix: vec!["-c".into(), script.into(), "sh".into()],
        }
    }

    /// Every binary is `echo`, so the result is the argument vector itself.
    fn echo_dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(Settings {
            virtctl: CommandSpec::program("echo"),
            kubectl: sh("printf 'ctx-ns'"),
            mtv: CommandSpec::program("echo"),
            timeout: Duration::from_secs(10),
        }))
    }

    #[tokio::test]
    async fn namespace_slot_is_resolved_from_context() {
        let d = echo_dispatcher();
        let inv = Invocation::run(
            CommandPlan::new(Binary::Virtctl, ["start", "vm1"]).namespace(None),
            Shape::Raw,
        );
        assert_eq!(d.execute(&inv).await.unwrap(), "start vm1 -n ctx-ns\n");
    }

    #[tokio::test]
    async fn report_shape_trims_output_and_records_command() {
        let d = echo_dispatcher();
        let inv = Invocation::run(
            CommandPlan::new(Binary::Virtctl, ["pause", "vm1"]).namespace(Some("ns1")),
            Shape::Report { message: "done" },
        );
        let out: Value = serde_json::from_str(&d.execute(&inv).await.unwrap()).unwrap();
        assert_eq!(out["status"], "success");
        assert_eq!(out["command"], "echo pause vm1 -n ns1");
        assert_eq!(out["output"], "pause vm1 -n ns1");
    }

    #[tokio::test]
    async fn envelope_parses_json_stdout() {
        let d = Dispatcher::new(Arc::new(Settings {
            kubectl: sh(r#"printf '{"items":[]}'"#),
            ..Settings::default()
        }));
        let inv = Invocation::run(CommandPlan::new(Binary::Kubectl, ["get", "x"]), Shape::Envelope);
        let out: Value = serde_json::from_str(&d.execute(&inv).await.unwrap()).unwrap();
        assert_eq!(out["return_value"], 0);
        assert_eq!(out["stdout"], json!({"items": []}));
        assert_eq!(out["stderr"], "");
    }

    #[tokio::test]
    async fn merge_omits_failed_parts() {
        let d = Dispatcher::new(Arc::new(Settings {
            virtctl: sh(r#"printf '{"ok":true}'"#),
            kubectl: CommandSpec::program("definitely-not-kubectl-5520"),
            ..Settings::default()
        }));
        let inv = Invocation::Merge(vec![
            (
                "cluster".into(),
                Invocation::run(CommandPlan::new(Binary::Virtctl, ["a"]), Shape::Raw),
            ),
            (
                "namespaced".into(),
                Invocation::run(CommandPlan::new(Binary::Kubectl, ["b"]), Shape::Raw),
            ),
        ]);
        let out: Value = serde_json::from_str(&d.execute(&inv).await.unwrap()).unwrap();
        assert_eq!(out, json!({"cluster": {"ok": true}}));
    }

    #[tokio::test]
    async fn single_failure_is_returned() {
        let d = Dispatcher::new(Arc::new(Settings {
            virtctl: sh("printf boom >&2; exit 2"),
            ..Settings::default()
        }));
        let inv = Invocation::run(CommandPlan::new(Binary::Virtctl, ["x"]), Shape::Raw);
        let err = d.execute(&inv).await.unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
        assert!(err.to_string().ends_with("error: boom"));
    }
}
