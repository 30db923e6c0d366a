/*!
Pre-flight validation: required fields, closed value sets and the
network-pair duplicate-target rule. Everything here is pure and runs
before any process is spawned.
*/

use std::collections::HashSet;

use super::error::ValidationError;

/// Target that may be claimed by any number of sources.
pub const IGNORED_TARGET: &str = "ignored";

/// Fail with a field-specific error when `value` is empty.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(value)
    }
}

/// Like [`require`] for optional inputs.
pub fn require_opt<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ValidationError> {
    require(field, value.as_deref().unwrap_or(""))
}

/// Present-and-non-empty view of an optional string field.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Check a `source:target,source:target` list for duplicate targets.
///
/// `ignored` may repeat freely; every other target (including `default`,
/// the pod network) may be claimed by one source only. Whitespace around
/// segments, sources and targets is trimmed; case is preserved.
pub fn validate_network_pairs(pairs: &str) -> Result<(), ValidationError> {
    if pairs.trim().is_empty() {
        return Ok(());
    }

    let mut claimed: HashSet<&str> = HashSet::new();
    for segment in pairs.split(',') {
        let Some((_source, target)) = segment.split_once(':') else {
            continue;
        };
        let target = target.trim();
        if target.is_empty() || target == IGNORED_TARGET {
            continue;
        }
        if !claimed.insert(target) {
            return Err(ValidationError::DuplicateNetworkTarget {
                target: target.to_string(),
            });
        }
    }
    Ok(())
}

/// Declare a closed set of accepted literals for one input field.
///
/// Generates the enum, `VALUES`, `as_str()` and a `parse()` whose error
/// lists every accepted literal.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident (field = $field:literal, noun = $noun:literal) {
            $($variant:ident => $lit:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($lit),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $lit),+
                }
            }

            pub fn parse(value: &str) -> Result<Self, $crate::invoke::error::ValidationError> {
                match value {
                    $($lit => Ok(Self::$variant),)+
                    _ => Err($crate::invoke::error::ValidationError::InvalidEnum {
                        field: $field,
                        value: value.to_string(),
                        noun: $noun,
                        valid: Self::VALUES,
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use choice_enum;

#[cfg(test)]
mod tests {
    use super::*;

    fn duplicate_of(pairs: &str) -> Option<String> {
        match validate_network_pairs(pairs) {
            Err(ValidationError::DuplicateNetworkTarget { target }) => Some(target),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => None,
        }
    }

    #[test]
    fn accepts_distinct_targets() {
        assert_eq!(duplicate_of(""), None);
        assert_eq!(duplicate_of("   "), None);
        assert_eq!(duplicate_of("source1:target1"), None);
        assert_eq!(
            duplicate_of("source1:target1,source2:target2,source3:target3"),
            None
        );
        assert_eq!(duplicate_of("source1:default,source2:ignored,source3:nad1"), None);
    }

    #[test]
    fn ignored_may_repeat() {
        assert_eq!(
            duplicate_of("source1:ignored,source2:ignored,source3:ignored,source4:nad1"),
            None
        );
    }

    #[test]
    fn rejects_second_default() {
        assert_eq!(
            duplicate_of("source1:default,source2:default").as_deref(),
            Some("default")
        );
    }

    #[test]
    fn rejects_duplicate_nad_including_namespaced() {
        assert_eq!(duplicate_of("source1:nad1,source2:nad1").as_deref(), Some("nad1"));
        assert_eq!(
            duplicate_of("source1:ns1/nad1,source2:ns1/nad1").as_deref(),
            Some("ns1/nad1")
        );
        assert_eq!(
            duplicate_of("source1:target1,source2:target1,source3:target1").as_deref(),
            Some("target1")
        );
        assert_eq!(
            duplicate_of("source1:nad1,source2:nad2,source3:nad1").as_deref(),
            Some("nad1")
        );
    }

    #[test]
    fn whitespace_does_not_change_outcome() {
        assert_eq!(duplicate_of(" source1:target1 , source2:target2 "), None);
        assert_eq!(duplicate_of("source1 : target1 , source2 : target2"), None);
        assert_eq!(
            duplicate_of("source1:default , source2:default").as_deref(),
            Some("default")
        );
    }

    #[test]
    fn no_case_folding() {
        assert_eq!(duplicate_of("a:NAD1,b:nad1"), None);
        assert_eq!(duplicate_of("a:Default,b:default"), None);
    }

    #[test]
    fn error_payload_is_json() {
        let err = validate_network_pairs("source1:default,source2:default").unwrap_err();
        let parsed: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(parsed["error"], "validation_error");
        assert_eq!(parsed["type"], "duplicate_network_target");
        assert_eq!(parsed["target"], "default");
    }

    #[test]
    fn repeated_calls_agree() {
        let input = "source1:nad1,source2:nad1";
        assert_eq!(validate_network_pairs(input), validate_network_pairs(input));
        assert!(validate_network_pairs("a:b").is_ok());
        assert!(validate_network_pairs("a:b").is_ok());
    }

    #[test]
    fn required_helpers() {
        assert_eq!(require("vm_name", "vm1"), Ok("vm1"));
        assert_eq!(
            require("vm_name", " "),
            Err(ValidationError::MissingField { field: "vm_name" })
        );
        assert_eq!(require_opt("pvc_name", &None).unwrap_err().to_string(), "missing required parameter: pvc_name");
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("x".into())), Some("x"));
    }

    choice_enum! {
        Color (field = "color", noun = "colors") {
            Red => "red",
            Dark => "dark-blue",
        }
    }

    #[test]
    fn choice_enum_parses_and_lists() {
        assert_eq!(Color::parse("dark-blue"), Ok(Color::Dark));
        assert_eq!(Color::Red.to_string(), "red");
        let err = Color::parse("green").unwrap_err();
        assert_eq!(err.to_string(), "invalid color: green. Valid colors: red, dark-blue");
    }
}
