use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! name_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

name_newtype!(DashboardId);
name_newtype!(ControlId);
name_newtype!(OutputId);

/// Current value of a single control.
///
/// Dropdowns carry `Text` or `Number` option values, range sliders carry a
/// `[low, high]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Number(f64),
    Text(String),
    Range([f64; 2]),
}

impl ControlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric view of the value. Text that parses as a number is accepted so
    /// that values coming back from an HTML `<select>` still match.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
            Self::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Range([low, high]) => Some((*low, *high)),
            _ => None,
        }
    }
}

impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for ControlValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Values of every control on a page. A missing entry means the control has
/// no selection yet; `null` on the wire is read the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ControlState(BTreeMap<ControlId, ControlValue>);

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<ControlId>, value: impl Into<ControlValue>) -> Self {
        self.set(id, value);
        self
    }

    pub fn set(&mut self, id: impl Into<ControlId>, value: impl Into<ControlValue>) {
        self.0.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&ControlValue> {
        self.0.get(&ControlId::from(id))
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(ControlValue::as_text)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.get(id).and_then(ControlValue::as_number)
    }

    pub fn range(&self, id: &str) -> Option<(f64, f64)> {
        self.get(id).and_then(ControlValue::as_range)
    }

    /// Keeps only the listed controls.
    pub fn project(&self, ids: &[ControlId]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(id, _)| ids.contains(id))
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ControlState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ControlId, Option<ControlValue>>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(id, value)| value.map(|value| (id, value)))
                .collect(),
        ))
    }
}

/// A single axis or label value in a figure. A missing number is written as
/// `null` and read back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDatum {
    Number(f64),
    Text(String),
    Missing(()),
}

impl<'de> Deserialize<'de> for Datum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawDatum::deserialize(deserializer)? {
            RawDatum::Number(value) => Self::Number(value),
            RawDatum::Text(value) => Self::Text(value),
            RawDatum::Missing(()) => Self::Number(f64::NAN),
        })
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_control_values_read_as_unselected() {
        let state: ControlState = serde_json::from_str(
            r#"{"site-dropdown": null, "payload-slider": [0, 10000], "select-year": 1995}"#,
        )
        .expect("json");
        assert!(state.get("site-dropdown").is_none());
        assert_eq!(state.range("payload-slider"), Some((0.0, 10000.0)));
        assert_eq!(state.number("select-year"), Some(1995.0));
    }

    #[test]
    fn placeholder_text_is_not_a_number() {
        let state = ControlState::new().with("select-year", "Select-year");
        assert_eq!(state.number("select-year"), None);
        let state = ControlState::new().with("select-year", "2001");
        assert_eq!(state.number("select-year"), Some(2001.0));
    }

    #[test]
    fn projection_drops_undeclared_controls() {
        let state = ControlState::new()
            .with("a", "x")
            .with("b", 1.0)
            .with("c", "z");
        let projected = state.project(&[ControlId::from("a"), ControlId::from("c")]);
        assert!(projected.get("b").is_none());
        assert_eq!(projected.text("a"), Some("x"));
        assert_eq!(projected.text("c"), Some("z"));
    }

    #[test]
    fn null_datum_reads_as_missing_number() {
        let data: Vec<Datum> = serde_json::from_str(r#"[null, 1980, "Sports"]"#).expect("json");
        assert!(matches!(data[0], Datum::Number(value) if value.is_nan()));
        assert_eq!(data[1], Datum::Number(1980.0));
        assert_eq!(data[2], Datum::Text("Sports".into()));
        assert_eq!(
            serde_json::to_string(&Datum::Number(f64::NAN)).expect("json"),
            "null"
        );
    }
}
