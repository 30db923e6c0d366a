/*!
`call.rs`

`mtv-mcp call <TOOL>`: run one tool through the dispatcher, bypassing the
MCP transport. Handy for checking argument translation against a real
cluster.

Parameters:
  --param KEY=VALUE     (repeatable; coerced using the tool's input schema)
  --param-file F        (JSON or YAML object; structure is kept, so nested
                         config mappings work; --param overrides file entries)

JSON success output:
{
  "status": "ok",
  "tool": "VirtctlVMLifecycle",
  "elapsed_ms": 42,
  "arguments": { ... },
  "result": <parsed JSON result, or the raw text>
}

JSON error output:
{ "status": "error", "error": "message" }
(validation failures add "details": { "type": ..., "field"/"target": ... })
*/

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use super::output_error;
use super::shared::{build_arguments_from_schema, find_tool};
use crate::invoke::{Dispatcher, ToolError, ValidationError};
use crate::invoke::normalize::to_value;
use crate::mcp;
use crate::tools::ToolRequest;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke (case-insensitive)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute_call(args: CallArgs, dispatcher: &Dispatcher) -> Result<()> {
    let tool_name = args.tool.trim();
    if tool_name.is_empty() {
        return output_error(args.json, "tool name cannot be empty");
    }

    let mut provided = match parse_params(&args.params) {
        Ok(p) => p,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    if let Some(ref pf) = args.param_file
        && let Err(e) = load_param_file_into_map(pf, &mut provided)
    {
        return output_error(args.json, &format!("{e:#}"));
    }

    let tools = mcp::tool_descriptors();
    let Some(tool) = find_tool(&tools, tool_name) else {
        return output_error(args.json, &format!("tool '{tool_name}' not found"));
    };
    let arguments = match build_arguments_from_schema(&tool.input_schema, provided) {
        Ok(a) => a,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    debug!(tool = %tool.name, ?arguments, "calling tool");

    let started = Instant::now();
    let outcome = match ToolRequest::from_json(&tool.name, Value::Object(arguments.clone())) {
        Ok(request) => dispatcher.call(request).await,
        Err(e) => Err(e),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let text = match outcome {
        Ok(text) => text,
        Err(ToolError::Validation(v)) if args.json => return validation_error(&v),
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    if args.json {
        let out = json!({
            "status": "ok",
            "tool": tool.name,
            "elapsed_ms": elapsed_ms,
            "arguments": arguments,
            "result": to_value(&text),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
    } else {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// JSON-mode failure that also carries the structured validation details.
fn validation_error(err: &ValidationError) -> Result<()> {
    let out = json!({"status": "error", "error": err.to_string(), "details": err.to_json()});
    println!(
        "{}",
        serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
    );
    Err(anyhow!(err.clone()))
}

fn parse_params(raw: &[String]) -> Result<HashMap<String, Value>> {
    let mut provided = HashMap::new();
    for kv in raw {
        let (k, v) = kv
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --param (expected KEY=VALUE): {kv}"))?;
        let key = k.trim();
        if key.is_empty() {
            return Err(anyhow!("invalid --param (empty key): {kv}"));
        }
        provided.insert(key.to_string(), Value::String(v.trim().to_string()));
    }
    Ok(provided)
}

fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, Value>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let Value::Object(obj) = value else {
        return Err(anyhow!("param file root must be an object"));
    };
    for (k, v) in obj {
        // CLI overrides file
        provided.entry(k).or_insert(v);
    }
    Ok(())
}
