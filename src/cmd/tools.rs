/*!
`tools.rs`

`mtv-mcp tools [NAME] [--json]`: show the registered tool catalogue
without starting the MCP transport.

  - no NAME : one line per tool (name, parameter count, first description line)
  - NAME    : full description and parameter table of one tool

JSON shape:
{
  "status": "ok",
  "count": 11,
  "tools": [ { "name": "...", "description": "...", "input_schema": { ... } } ]
}
*/

use anyhow::Result;
use clap::Args;
use rmcp::model::Tool;
use serde_json::{Value, json};

use super::output_error;
use super::shared::{ParamInfo, extract_params, find_tool, summary_line};
use crate::mcp;

#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Show one tool in detail (case-insensitive)
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_tools(args: ToolsArgs) -> Result<()> {
    let tools = mcp::tool_descriptors();

    let selected: Vec<&Tool> = match args.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => match find_tool(&tools, name) {
            Some(t) => vec![t],
            None => return output_error(args.json, &format!("tool '{name}' not found")),
        },
        _ => tools.iter().collect(),
    };

    if args.json {
        let items: Vec<Value> = selected.iter().map(|t| descriptor_json(t)).collect();
        let out = json!({"status": "ok", "count": items.len(), "tools": items});
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    match (args.name.is_some(), selected.as_slice()) {
        (true, [tool]) => print_detail(tool),
        _ => print_listing(&selected),
    }
    Ok(())
}

fn descriptor_json(tool: &Tool) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description.as_deref().unwrap_or(""),
        "input_schema": Value::Object(tool.input_schema.as_ref().clone()),
    })
}

fn print_listing(tools: &[&Tool]) {
    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(4).max(4);
    println!("Tools ({})", tools.len());
    println!("{:<width$}  {:>6}  DESCRIPTION", "NAME", "PARAMS");
    for t in tools {
        let params = extract_params(&t.input_schema).len();
        println!("{:<width$}  {:>6}  {}", t.name, params, summary_line(t));
    }
}

fn print_detail(tool: &Tool) {
    println!("{}", tool.name);
    println!();
    println!("{}", tool.description.as_deref().unwrap_or("<no description>"));
    println!();

    let params = extract_params(&tool.input_schema);
    if params.is_empty() {
        println!("Parameters: (none)");
        return;
    }
    println!("Parameters:");
    for row in param_rows(&params) {
        println!("  {row}");
    }
}

fn param_rows(params: &[ParamInfo]) -> Vec<String> {
    let name_w = params.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let kind_w = params.iter().map(|p| p.kind.len()).max().unwrap_or(0);
    let mut ordered: Vec<&ParamInfo> = params.iter().collect();
    // required first, then alphabetical
    ordered.sort_by(|a, b| b.required.cmp(&a.required).then(a.name.cmp(&b.name)));
    ordered
        .into_iter()
        .map(|p| {
            let req = if p.required { "required" } else { "optional" };
            let desc = if p.description.is_empty() {
                "-"
            } else {
                p.description.as_str()
            };
            format!("{:<name_w$}  {:<kind_w$}  {req}  {desc}", p.name, p.kind)
        })
        .collect()
}
