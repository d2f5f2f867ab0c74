//! Engine option model: the `option ...` lines an engine advertises during
//! the handshake, and the values a caller may set on them.

use std::fmt;

use serde::Serialize;

use super::{UciError, UciResult};

/// Kind of an advertised option (`type <kind>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Check,
    Spin,
    Combo,
    Button,
    String,
    /// Anything an exotic engine sends that the protocol doesn't define.
    /// Empty when the line was malformed.
    Other(String),
}

impl Default for OptionKind {
    fn default() -> Self {
        OptionKind::Other(String::new())
    }
}

impl OptionKind {
    pub fn parse(token: &str) -> Self {
        match token {
            "check" => OptionKind::Check,
            "spin" => OptionKind::Spin,
            "combo" => OptionKind::Combo,
            "button" => OptionKind::Button,
            "string" => OptionKind::String,
            other => OptionKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OptionKind::Check => "check",
            OptionKind::Spin => "spin",
            OptionKind::Combo => "combo",
            OptionKind::Button => "button",
            OptionKind::String => "string",
            OptionKind::Other(token) => token,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configurable engine parameter, immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineOption {
    pub name: String,
    pub kind: OptionKind,
    pub default: Option<String>,
    pub min: i64,
    pub max: i64,
    pub vars: Vec<String>,
}

/// A value to send with `setoption`, chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Check(bool),
    Spin(i64),
    Combo(String),
    String(String),
    Button,
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Check(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Spin(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Spin(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl EngineOption {
    /// Encode `value` for the `value` field of `setoption`.
    ///
    /// Integers sent to a spin option are clamped into `[min, max]`.
    /// Returns `None` for buttons, which carry no value.
    pub fn encode_value(&self, value: &OptionValue) -> Option<String> {
        match value {
            OptionValue::Check(true) => Some("true".to_string()),
            OptionValue::Check(false) => Some("false".to_string()),
            OptionValue::Spin(v) => {
                let v = if self.kind == OptionKind::Spin {
                    self.clamp(*v)
                } else {
                    *v
                };
                Some(v.to_string())
            }
            OptionValue::Combo(s) | OptionValue::String(s) => Some(s.clone()),
            OptionValue::Button => None,
        }
    }

    // Not `i64::clamp`: a malformed line can leave min > max, which must not panic.
    fn clamp(&self, v: i64) -> i64 {
        if v < self.min {
            self.min
        } else if v > self.max {
            self.max
        } else {
            v
        }
    }

    /// Pick the value variant for a textual value based on this option's kind.
    pub fn value_from_str(&self, raw: &str) -> UciResult<OptionValue> {
        match self.kind {
            OptionKind::Check => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(OptionValue::Check(true)),
                "false" => Ok(OptionValue::Check(false)),
                _ => Err(UciError::InvalidArgument(format!(
                    "option '{}' expects true or false, got '{}'",
                    self.name, raw
                ))),
            },
            OptionKind::Spin => raw.trim().parse().map(OptionValue::Spin).map_err(|_| {
                UciError::InvalidArgument(format!(
                    "option '{}' expects an integer, got '{}'",
                    self.name, raw
                ))
            }),
            OptionKind::Combo => Ok(OptionValue::Combo(raw.to_string())),
            OptionKind::Button => Ok(OptionValue::Button),
            OptionKind::String | OptionKind::Other(_) => Ok(OptionValue::String(raw.to_string())),
        }
    }
}

impl fmt::Display for EngineOption {
    /// Re-serialize in the `option` line grammar, without the `option ` prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name {} type {}", self.name, self.kind)?;
        if let Some(default) = &self.default {
            write!(f, " default {}", default)?;
        }
        if self.kind == OptionKind::Spin || self.min != 0 || self.max != 0 {
            write!(f, " min {} max {}", self.min, self.max)?;
        }
        for var in &self.vars {
            write!(f, " var {}", var)?;
        }
        Ok(())
    }
}

/// Parse an `option` line, with or without the leading `option ` token.
///
/// The name runs from `name ` to the *last* ` type` on the line, so names
/// containing spaces survive. A line without that frame yields an empty
/// option instead of an error.
pub fn parse_option_line(line: &str) -> EngineOption {
    let line = line.strip_prefix("option ").unwrap_or(line);

    let Some(name_start) = line.find("name ") else {
        return EngineOption::default();
    };
    let rest = &line[name_start + "name ".len()..];
    let Some(name_end) = rest.rfind(" type") else {
        return EngineOption::default();
    };

    let mut option = EngineOption {
        name: rest[..name_end].to_string(),
        ..Default::default()
    };

    let mut tokens = rest[name_end + " type".len()..].split_whitespace().peekable();
    if let Some(kind) = tokens.next() {
        option.kind = OptionKind::parse(kind);
    }

    while let Some(token) = tokens.next() {
        match token {
            "default" => {
                if let Some(value) = tokens.next_if(|t| !is_field_keyword(t)) {
                    option.default = Some(value.to_string());
                }
            }
            "min" => option.min = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0),
            "max" => option.max = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0),
            "var" => {
                if let Some(value) = tokens.next() {
                    option.vars.push(value.to_string());
                }
            }
            _ => {
                // Extended syntax, skip
            }
        }
    }

    option
}

fn is_field_keyword(token: &str) -> bool {
    matches!(token, "default" | "min" | "max" | "var")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(min: i64, max: i64) -> EngineOption {
        EngineOption {
            name: "Hash".to_string(),
            kind: OptionKind::Spin,
            default: Some("16".to_string()),
            min,
            max,
            vars: vec![],
        }
    }

    #[test]
    fn test_parse_spin() {
        let opt = parse_option_line("option name Hash type spin default 16 min 1 max 33554432");
        assert_eq!(opt, spin(1, 33554432));
    }

    #[test]
    fn test_parse_name_with_spaces() {
        let opt = parse_option_line("option name Skill Level type spin default 20 min 0 max 20");
        assert_eq!(opt.name, "Skill Level");
        assert_eq!(opt.kind, OptionKind::Spin);
        assert_eq!(opt.default.as_deref(), Some("20"));
        assert_eq!((opt.min, opt.max), (0, 20));
    }

    #[test]
    fn test_parse_name_runs_to_last_type() {
        let opt = parse_option_line("name Piece type Bonus type check default true");
        assert_eq!(opt.name, "Piece type Bonus");
        assert_eq!(opt.kind, OptionKind::Check);
        assert_eq!(opt.default.as_deref(), Some("true"));
    }

    #[test]
    fn test_parse_combo_vars_in_order() {
        let opt = parse_option_line(
            "option name Style type combo default Normal var Solid var Normal var Risky",
        );
        assert_eq!(opt.kind, OptionKind::Combo);
        assert_eq!(opt.default.as_deref(), Some("Normal"));
        assert_eq!(opt.vars, vec!["Solid", "Normal", "Risky"]);
    }

    #[test]
    fn test_parse_string_with_empty_default() {
        let opt = parse_option_line("option name Debug Log File type string default");
        assert_eq!(opt.name, "Debug Log File");
        assert_eq!(opt.kind, OptionKind::String);
        assert_eq!(opt.default, None);
    }

    #[test]
    fn test_parse_button() {
        let opt = parse_option_line("option name Clear Hash type button");
        assert_eq!(opt.name, "Clear Hash");
        assert_eq!(opt.kind, OptionKind::Button);
    }

    #[test]
    fn test_parse_malformed_yields_empty_option() {
        assert_eq!(parse_option_line("option garbage"), EngineOption::default());
        assert_eq!(parse_option_line("option name NoType"), EngineOption::default());
    }

    #[test]
    fn test_parse_unknown_kind_and_bad_bounds() {
        let opt = parse_option_line("option name Weird type slider min low max 7");
        assert_eq!(opt.kind, OptionKind::Other("slider".to_string()));
        assert_eq!((opt.min, opt.max), (0, 7));
    }

    #[test]
    fn test_reserialization_reparses_equal() {
        let lines = [
            "name Hash type spin default 16 min 1 max 1024",
            "name Skill Level type spin default 20 min 0 max 20",
            "name Ponder type check default false",
            "name Style type combo default Normal var Solid var Normal var Risky",
            "name Clear Hash type button",
            "name SyzygyPath type string default <empty>",
        ];
        for line in lines {
            let opt = parse_option_line(line);
            assert_eq!(opt.to_string(), line);
            assert_eq!(parse_option_line(&opt.to_string()), opt);
        }
    }

    #[test]
    fn test_spin_clamping() {
        let opt = spin(1, 1024);
        assert_eq!(opt.encode_value(&OptionValue::Spin(4096)).as_deref(), Some("1024"));
        assert_eq!(opt.encode_value(&OptionValue::Spin(-3)).as_deref(), Some("1"));
        assert_eq!(opt.encode_value(&OptionValue::Spin(256)).as_deref(), Some("256"));
        assert_eq!(opt.encode_value(&OptionValue::Spin(1)).as_deref(), Some("1"));
        assert_eq!(opt.encode_value(&OptionValue::Spin(1024)).as_deref(), Some("1024"));
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let opt = spin(10, 5);
        assert_eq!(opt.encode_value(&OptionValue::Spin(7)).as_deref(), Some("10"));
    }

    #[test]
    fn test_encode_other_values() {
        let opt = parse_option_line("name Ponder type check default false");
        assert_eq!(opt.encode_value(&true.into()).as_deref(), Some("true"));
        assert_eq!(opt.encode_value(&false.into()).as_deref(), Some("false"));
        assert_eq!(
            opt.encode_value(&OptionValue::Combo("Risky".into())).as_deref(),
            Some("Risky")
        );
        assert_eq!(opt.encode_value(&"some path".into()).as_deref(), Some("some path"));
        assert_eq!(opt.encode_value(&OptionValue::Button), None);
    }

    #[test]
    fn test_value_from_str_follows_kind() {
        let check = parse_option_line("name Ponder type check default false");
        assert_eq!(check.value_from_str("TRUE").unwrap(), OptionValue::Check(true));
        assert!(matches!(
            check.value_from_str("maybe"),
            Err(UciError::InvalidArgument(_))
        ));

        let hash = spin(1, 1024);
        assert_eq!(hash.value_from_str("64").unwrap(), OptionValue::Spin(64));
        assert!(hash.value_from_str("lots").is_err());

        let style = parse_option_line("name Style type combo default Normal var Solid var Normal");
        assert_eq!(
            style.value_from_str("Solid").unwrap(),
            OptionValue::Combo("Solid".to_string())
        );

        let clear = parse_option_line("name Clear Hash type button");
        assert_eq!(clear.value_from_str("").unwrap(), OptionValue::Button);
    }
}
