//! Process-wide settings: which executables to run and how long to wait.
//!
//! Built once in `main` and shared read-only (behind an `Arc`) by the runner,
//! the namespace resolver and the dispatcher.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::time::Duration;

/// Default VM CLI program (override with `--virtctl-command` / `VIRTCTL_COMMAND`).
pub const DEFAULT_VIRTCTL: &str = "virtctl";
pub const DEFAULT_KUBECTL: &str = "kubectl";
pub const DEFAULT_MTV: &str = "kubectl-mtv";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One of the three external executables a tool may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binary {
    Virtctl,
    Kubectl,
    Mtv,
}

/// A program plus the arguments that always precede the tool's own
/// argument vector (`kubectl virt` -> program `kubectl`, prefix `["virt"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub prefix: Vec<String>,
}

impl CommandSpec {
    /// Single-word program with no prefix arguments.
    pub fn program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    /// Parse a command line with shell-style splitting.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("command is empty");
        }
        let mut parts = shell_words::split(trimmed)
            .with_context(|| format!("failed to parse command line: '{trimmed}'"))?;
        if parts.is_empty() || parts[0].is_empty() {
            bail!("no program name in command line: '{trimmed}'");
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            prefix: parts,
        })
    }

    /// Full argument list for one invocation (prefix followed by `args`).
    pub fn argv(&self, args: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.prefix.len() + args.len());
        argv.extend(self.prefix.iter().cloned());
        argv.extend(args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.program)
        } else {
            write!(f, "{} {}", self.program, self.prefix.join(" "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub virtctl: CommandSpec,
    pub kubectl: CommandSpec,
    pub mtv: CommandSpec,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(virtctl: &str, timeout: Duration) -> Result<Self> {
        let virtctl = CommandSpec::parse(virtctl).context("invalid virtctl command")?;
        if timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        Ok(Self {
            virtctl,
            kubectl: CommandSpec::program(DEFAULT_KUBECTL),
            mtv: CommandSpec::program(DEFAULT_MTV),
            timeout,
        })
    }

    pub fn command(&self, binary: Binary) -> &CommandSpec {
        match binary {
            Binary::Virtctl => &self.virtctl,
            Binary::Kubectl => &self.kubectl,
            Binary::Mtv => &self.mtv,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            virtctl: CommandSpec::program(DEFAULT_VIRTCTL),
            kubectl: CommandSpec::program(DEFAULT_KUBECTL),
            mtv: CommandSpec::program(DEFAULT_MTV),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
