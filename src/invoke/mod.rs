//! Command translation and execution core.
//!
//! validate -> args -> namespace -> runner -> normalize, glued by `dispatch`.

pub mod args;
pub mod dispatch;
pub mod error;
pub mod namespace;
pub mod normalize;
pub mod runner;
pub mod validate;

pub use args::{CommandPlan, ConfigFlag};
pub use dispatch::{Dispatcher, Invocation, Shape};
pub use error::{ToolError, ValidationError};
