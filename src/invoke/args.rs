/*!
Argument-vector builder.

A `CommandPlan` is the ordered argument layout for one external binary.
Tools describe their flags declaratively ("if present, append `--flag value`")
through the chained helpers below; nested configuration mappings go through
a `ConfigFlag` table. The namespace is recorded as a deferred slot so the
plan can be built (and rejected) before the context lookup spawns anything.
*/

use serde_json::{Map, Value};

use crate::config::Binary;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Lit(String),
    /// Expands to `-n <namespace>` once resolved.
    Namespace(Option<String>),
}

/// How one key of a nested config mapping becomes a flag.
#[derive(Debug, Clone, Copy)]
pub enum ConfigFlag {
    /// Non-empty string -> `--flag value`.
    Str(&'static str, &'static str),
    /// `true` -> bare `--flag`.
    Bool(&'static str, &'static str),
    /// Integer, float (truncated) or string -> `--flag value`.
    Scalar(&'static str, &'static str),
    /// String or array of strings -> `--flag value` once per element.
    List(&'static str, &'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub binary: Binary,
    args: Vec<Arg>,
}

impl CommandPlan {
    pub fn new<I, S>(binary: Binary, head: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            binary,
            args: head.into_iter().map(|s| Arg::Lit(s.into())).collect(),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Lit(value.into()));
        self
    }

    /// Positional argument, skipped when absent or empty.
    pub fn arg_opt(self, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.arg(v),
            _ => self,
        }
    }

    /// `--flag value` with an always-present value.
    pub fn pair(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// `--flag value` when `value` is present and non-empty.
    pub fn opt(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.pair(flag, v),
            _ => self,
        }
    }

    /// `--flag N` when `value` is present and positive.
    pub fn opt_count(self, flag: &str, value: Option<u64>) -> Self {
        match value {
            Some(n) if n > 0 => self.pair(flag, n.to_string()),
            _ => self,
        }
    }

    /// Bare `--flag` when `on`.
    pub fn flag(self, flag: &str, on: bool) -> Self {
        if on { self.arg(flag) } else { self }
    }

    /// Deferred `-n <namespace>`; `explicit` wins over the context lookup.
    pub fn namespace(mut self, explicit: Option<&str>) -> Self {
        self.args
            .push(Arg::Namespace(explicit.filter(|s| !s.is_empty()).map(String::from)));
        self
    }

    /// Append flags for the keys of `config` named in `rules`, in rule order.
    /// Keys with the wrong JSON type are ignored.
    pub fn config(mut self, config: Option<&Map<String, Value>>, rules: &[ConfigFlag]) -> Self {
        let Some(config) = config else {
            return self;
        };
        for rule in rules {
            self = match *rule {
                ConfigFlag::Str(key, flag) => self.opt(flag, config.get(key).and_then(Value::as_str)),
                ConfigFlag::Bool(key, flag) => {
                    self.flag(flag, config.get(key).and_then(Value::as_bool).unwrap_or(false))
                }
                ConfigFlag::Scalar(key, flag) => {
                    let value = config.get(key).and_then(scalar_string);
                    self.opt(flag, value.as_deref())
                }
                ConfigFlag::List(key, flag) => match config.get(key) {
                    Some(Value::String(s)) => self.opt(flag, Some(s.as_str())),
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .fold(self, |plan, item| plan.opt(flag, Some(item))),
                    _ => self,
                },
            };
        }
        self
    }

    /// Whether the plan still needs a namespace and, if so, the explicit one.
    pub fn namespace_request(&self) -> Option<Option<&str>> {
        self.args.iter().find_map(|a| match a {
            Arg::Namespace(explicit) => Some(explicit.as_deref()),
            Arg::Lit(_) => None,
        })
    }

    /// Final argument vector with `namespace` substituted into the slot.
    pub fn finish(&self, namespace: Option<&str>) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() + 1);
        for a in &self.args {
            match a {
                Arg::Lit(s) => out.push(s.clone()),
                Arg::Namespace(explicit) => {
                    if let Some(ns) = explicit.as_deref().or(namespace).filter(|s| !s.is_empty()) {
                        out.push("-n".to_string());
                        out.push(ns.to_string());
                    }
                }
            }
        }
        out
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_f64().map(|f| (f as i64).to_string())),
        _ => None,
    }
}
