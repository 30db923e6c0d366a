/*!
Local subcommands (everything except `serve`).

  src/cmd/
    mod.rs     (this file: re-exports + shared error output)
    tools.rs   (ToolsArgs + execute_tools)
    call.rs    (CallArgs  + execute_call)
    shared.rs  (descriptor lookup, schema-driven argument coercion)

Each subcommand exposes one `execute_*` function returning
`anyhow::Result<()>`; argument structs derive `clap::Args`.
*/

pub mod call;
pub mod shared;
pub mod tools;

pub use call::{CallArgs, execute_call};
pub use tools::{ToolsArgs, execute_tools};

use anyhow::Result;

/// Report a failure in the selected output mode, then return it as an error
/// so the process exits non-zero.
pub(crate) fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        let err = serde_json::json!({"status": "error", "error": msg});
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    }
    anyhow::bail!(msg.to_string())
}
