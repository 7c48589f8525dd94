//! Flag value kinds and typed values.
//!
//! Every flag stores one [`FlagValue`], a closed set of scalar kinds plus a
//! repeated (slice) form of each. Values are parsed from command-line strings
//! and rendered back through [`Display`](fmt::Display). Slice values also
//! expose a lossless [`serialized`](FlagValue::serialized) form, used when a
//! value is copied between aliases, because their display form cannot carry
//! elements that themselves contain commas.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Prefix marking a serialized slice. Setting a slice flag to a string with
/// this prefix replaces the whole slice instead of appending to it.
pub const SERIALIZED_SLICE_PREFIX: &str = "sl:";

/// Kind of value a flag stores.
///
/// # Examples
///
/// ```
/// use flagscope_core::ValueKind;
///
/// assert_eq!(ValueKind::default(), ValueKind::String);
/// assert!(ValueKind::Bool.is_bool());
/// assert!(ValueKind::IntSlice.is_slice());
/// assert_eq!(ValueKind::DurationSlice.to_string(), "duration_slice");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    #[default]
    String,
    Int,
    Uint,
    Float,
    Duration,
    Bool,
    StringSlice,
    IntSlice,
    FloatSlice,
    DurationSlice,
    BoolSlice,
}

impl ValueKind {
    /// Boolean flags do not consume the next argv token as their value.
    pub fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_slice(self) -> bool {
        matches!(
            self,
            Self::StringSlice
                | Self::IntSlice
                | Self::FloatSlice
                | Self::DurationSlice
                | Self::BoolSlice
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Duration => "duration",
            Self::Bool => "bool",
            Self::StringSlice => "string_slice",
            Self::IntSlice => "int_slice",
            Self::FloatSlice => "float_slice",
            Self::DurationSlice => "duration_slice",
            Self::BoolSlice => "bool_slice",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed flag value.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flagscope_core::{FlagValue, ValueKind};
///
/// let v = FlagValue::parse(ValueKind::Int, "5").unwrap();
/// assert_eq!(v, FlagValue::Int(5));
/// assert_eq!(v.to_string(), "5");
///
/// let d = FlagValue::parse(ValueKind::Duration, "1m30s").unwrap();
/// assert_eq!(d.as_duration(), Some(Duration::from_secs(90)));
/// assert_eq!(d.to_string(), "1m 30s");
///
/// let tags = FlagValue::parse(ValueKind::StringSlice, "a,b").unwrap();
/// assert_eq!(tags.serialized().as_deref(), Some(r#"sl:["a","b"]"#));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Duration(Duration),
    Bool(bool),
    StringSlice(Vec<String>),
    IntSlice(Vec<i64>),
    FloatSlice(Vec<f64>),
    DurationSlice(Vec<Duration>),
    BoolSlice(Vec<bool>),
}

impl FlagValue {
    /// The zero value of a kind (empty string, `0`, `false`, empty slice).
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => Self::String(String::new()),
            ValueKind::Int => Self::Int(0),
            ValueKind::Uint => Self::Uint(0),
            ValueKind::Float => Self::Float(0.0),
            ValueKind::Duration => Self::Duration(Duration::ZERO),
            ValueKind::Bool => Self::Bool(false),
            ValueKind::StringSlice => Self::StringSlice(Vec::new()),
            ValueKind::IntSlice => Self::IntSlice(Vec::new()),
            ValueKind::FloatSlice => Self::FloatSlice(Vec::new()),
            ValueKind::DurationSlice => Self::DurationSlice(Vec::new()),
            ValueKind::BoolSlice => Self::BoolSlice(Vec::new()),
        }
    }

    /// Parses `raw` as a value of `kind`.
    ///
    /// Slice kinds accept either a comma-separated list or the serialized
    /// form produced by [`serialized`](Self::serialized).
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Self, ValueError> {
        let value = match kind {
            ValueKind::String => Self::String(raw.to_string()),
            ValueKind::Int => Self::Int(parse_int(raw)?),
            ValueKind::Uint => Self::Uint(parse_uint(raw)?),
            ValueKind::Float => Self::Float(parse_float(raw)?),
            ValueKind::Duration => Self::Duration(parse_duration(raw)?),
            ValueKind::Bool => Self::Bool(parse_bool(raw)?),
            ValueKind::StringSlice => Self::StringSlice(split_items(raw)?),
            ValueKind::IntSlice => Self::IntSlice(parse_items(raw, parse_int)?),
            ValueKind::FloatSlice => Self::FloatSlice(parse_items(raw, parse_float)?),
            ValueKind::DurationSlice => {
                Self::DurationSlice(parse_items(raw, parse_duration)?)
            }
            ValueKind::BoolSlice => Self::BoolSlice(parse_items(raw, parse_bool)?),
        };
        Ok(value)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Float(_) => ValueKind::Float,
            Self::Duration(_) => ValueKind::Duration,
            Self::Bool(_) => ValueKind::Bool,
            Self::StringSlice(_) => ValueKind::StringSlice,
            Self::IntSlice(_) => ValueKind::IntSlice,
            Self::FloatSlice(_) => ValueKind::FloatSlice,
            Self::DurationSlice(_) => ValueKind::DurationSlice,
            Self::BoolSlice(_) => ValueKind::BoolSlice,
        }
    }

    /// Re-parses `raw` into this value, keeping its kind.
    ///
    /// With `append` set, slice values are extended instead of replaced,
    /// unless `raw` is a serialized slice. Scalars are always replaced.
    pub fn set(&mut self, raw: &str, append: bool) -> Result<(), ValueError> {
        let parsed = Self::parse(self.kind(), raw)?;
        let replace = !append || raw.starts_with(SERIALIZED_SLICE_PREFIX);
        match (self, parsed) {
            (Self::StringSlice(cur), Self::StringSlice(new)) if !replace => cur.extend(new),
            (Self::IntSlice(cur), Self::IntSlice(new)) if !replace => cur.extend(new),
            (Self::FloatSlice(cur), Self::FloatSlice(new)) if !replace => cur.extend(new),
            (Self::DurationSlice(cur), Self::DurationSlice(new)) if !replace => cur.extend(new),
            (Self::BoolSlice(cur), Self::BoolSlice(new)) if !replace => cur.extend(new),
            (slot, parsed) => *slot = parsed,
        }
        Ok(())
    }

    /// Lossless string form for kinds whose display form is ambiguous.
    ///
    /// Returns `None` for scalars, whose [`Display`](fmt::Display) output
    /// already parses back to the same value.
    pub fn serialized(&self) -> Option<String> {
        let items: Vec<String> = match self {
            Self::StringSlice(items) => items.clone(),
            Self::IntSlice(items) => items.iter().map(ToString::to_string).collect(),
            Self::FloatSlice(items) => items.iter().map(ToString::to_string).collect(),
            Self::DurationSlice(items) => items.iter().map(|d| format_duration(*d)).collect(),
            Self::BoolSlice(items) => items.iter().map(ToString::to_string).collect(),
            _ => return None,
        };
        serde_json::to_string(&items)
            .ok()
            .map(|json| format!("{SERIALIZED_SLICE_PREFIX}{json}"))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string_slice(&self) -> Option<&[String]> {
        match self {
            Self::StringSlice(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_slice(&self) -> Option<&[i64]> {
        match self {
            Self::IntSlice(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_slice(&self) -> Option<&[f64]> {
        match self {
            Self::FloatSlice(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_duration_slice(&self) -> Option<&[Duration]> {
        match self {
            Self::DurationSlice(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool_slice(&self) -> Option<&[bool]> {
        match self {
            Self::BoolSlice(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Duration(v) => f.write_str(&format_duration(*v)),
            Self::Bool(v) => write!(f, "{v}"),
            Self::StringSlice(v) => f.write_str(&v.join(",")),
            Self::IntSlice(v) => write_joined(f, v.iter()),
            Self::FloatSlice(v) => write_joined(f, v.iter()),
            Self::DurationSlice(v) => {
                write_joined(f, v.iter().map(|d| format_duration(*d)))
            }
            Self::BoolSlice(v) => write_joined(f, v.iter()),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn split_items(raw: &str) -> Result<Vec<String>, ValueError> {
    if let Some(json) = raw.strip_prefix(SERIALIZED_SLICE_PREFIX) {
        return serde_json::from_str(json)
            .map_err(|err| ValueError(format!("malformed serialized slice: {err}")));
    }
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(raw.split(',').map(|s| s.trim().to_string()).collect())
}

fn parse_items<T>(
    raw: &str,
    parse: impl Fn(&str) -> Result<T, ValueError>,
) -> Result<Vec<T>, ValueError> {
    split_items(raw)?
        .iter()
        .map(|item| parse(item.as_str()))
        .collect()
}

/// Splits an optional `0x`/`0o`/`0b` prefix off a number.
fn radix_of(digits: &str) -> (u32, &str) {
    let lower = digits.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0b") => (2, &digits[2..]),
        _ => (10, digits),
    }
}

fn parse_int(raw: &str) -> Result<i64, ValueError> {
    let s = raw.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = radix_of(digits);
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    i64::from_str_radix(&signed, radix)
        .map_err(|err| ValueError(format!("parse error: {err}")))
}

fn parse_uint(raw: &str) -> Result<u64, ValueError> {
    let s = raw.trim();
    let (radix, digits) = radix_of(s.strip_prefix('+').unwrap_or(s));
    u64::from_str_radix(digits, radix).map_err(|err| ValueError(format!("parse error: {err}")))
}

fn parse_float(raw: &str) -> Result<f64, ValueError> {
    raw.trim()
        .parse()
        .map_err(|err| ValueError(format!("parse error: {err}")))
}

/// Accepts `1`, `t`, `true` and their false counterparts, in any of the usual cases.
fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ValueError(format!("invalid boolean: {other:?}"))),
    }
}

/// Parses a duration such as `300ms`, `2h45m` or `1m 30s`.
///
/// Accepts the unit spellings of [`humantime::parse_duration`] (`ns`, `us`,
/// `ms`, `s`, `m`, `h`, `d` and their long forms). A bare `0` is accepted
/// without a unit.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flagscope_core::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("1s 500ms").unwrap(), Duration::from_millis(1500));
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(raw: &str) -> Result<Duration, ValueError> {
    let s = raw.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s)
        .map_err(|err| ValueError(format!("invalid duration {raw:?}: {err}")))
}

/// Formats a duration in the syntax accepted by [`parse_duration`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flagscope_core::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// ```
pub fn format_duration(d: Duration) -> String {
    humantime::format_duration(d).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(
            FlagValue::parse(ValueKind::String, " x ").unwrap(),
            FlagValue::String(" x ".to_string())
        );
        assert_eq!(FlagValue::parse(ValueKind::Int, "-42").unwrap(), FlagValue::Int(-42));
        assert_eq!(FlagValue::parse(ValueKind::Int, "0x1f").unwrap(), FlagValue::Int(31));
        assert_eq!(FlagValue::parse(ValueKind::Uint, "7").unwrap(), FlagValue::Uint(7));
        assert_eq!(FlagValue::parse(ValueKind::Float, "2.5").unwrap(), FlagValue::Float(2.5));
        assert_eq!(FlagValue::parse(ValueKind::Bool, "T").unwrap(), FlagValue::Bool(true));
        assert_eq!(FlagValue::parse(ValueKind::Bool, "0").unwrap(), FlagValue::Bool(false));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(FlagValue::parse(ValueKind::Int, "five").is_err());
        assert!(FlagValue::parse(ValueKind::Uint, "-1").is_err());
        assert!(FlagValue::parse(ValueKind::Bool, "yes").is_err());
        assert!(FlagValue::parse(ValueKind::IntSlice, "1,x").is_err());
        assert!(FlagValue::parse(ValueKind::StringSlice, "sl:[1,").is_err());
    }

    #[test]
    fn test_slice_set_appends_unless_serialized() {
        let mut v = FlagValue::zero(ValueKind::IntSlice);
        v.set("1,2", true).unwrap();
        v.set("3", true).unwrap();
        assert_eq!(v, FlagValue::IntSlice(vec![1, 2, 3]));

        v.set(r#"sl:["9"]"#, true).unwrap();
        assert_eq!(v, FlagValue::IntSlice(vec![9]));

        v.set("4", false).unwrap();
        assert_eq!(v, FlagValue::IntSlice(vec![4]));
    }

    #[test]
    fn test_serialized_preserves_commas_inside_elements() {
        let v = FlagValue::StringSlice(vec!["a,b".to_string(), "c".to_string()]);
        let serialized = v.serialized().unwrap();
        assert_eq!(FlagValue::parse(ValueKind::StringSlice, &serialized).unwrap(), v);
        // The display form splits the first element in two.
        assert_eq!(
            FlagValue::parse(ValueKind::StringSlice, &v.to_string()).unwrap(),
            FlagValue::StringSlice(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_scalars_have_no_serialized_form() {
        assert_eq!(FlagValue::Int(5).serialized(), None);
        assert_eq!(FlagValue::String("x".into()).serialized(), None);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("2h45m").unwrap(), Duration::from_secs(9_900));
        assert_eq!(parse_duration(" 1m 30s ").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_duration_format_parses_back() {
        for d in [
            Duration::from_nanos(15),
            Duration::from_micros(20),
            Duration::from_millis(1_250),
            Duration::from_secs(3_725),
        ] {
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
        assert_eq!(format_duration(Duration::from_secs(3_725)), "1h 2m 5s");
    }

    #[test]
    fn test_duration_slice_survives_alias_copy_form() {
        let v = FlagValue::parse(ValueKind::DurationSlice, "1m 30s,250ms").unwrap();
        assert_eq!(
            v.as_duration_slice(),
            Some(&[Duration::from_secs(90), Duration::from_millis(250)][..])
        );
        let copied = FlagValue::parse(ValueKind::DurationSlice, &v.serialized().unwrap()).unwrap();
        assert_eq!(copied, v);
    }

    #[test]
    fn test_slice_accessors_match_kind() {
        let bools = FlagValue::parse(ValueKind::BoolSlice, "true,0,T").unwrap();
        assert_eq!(bools.as_bool_slice(), Some(&[true, false, true][..]));
        assert_eq!(bools.as_duration_slice(), None);
        assert_eq!(FlagValue::Bool(true).as_bool_slice(), None);
    }

    #[test]
    fn test_value_kind_serde_names() {
        let kind: ValueKind = serde_json::from_str("\"string_slice\"").unwrap();
        assert_eq!(kind, ValueKind::StringSlice);
        assert_eq!(serde_json::to_string(&ValueKind::Uint).unwrap(), "\"uint\"");
    }
}
