use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{ControlId, ControlState, ControlValue, DashboardId, Datum, OutputId};

/// Reads a numeric series where missing points were written as `null`.
fn numbers_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let raw = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: ControlValue,
}

impl DropdownOption {
    pub fn new(label: impl Into<String>, value: impl Into<ControlValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    Dropdown {
        options: Vec<DropdownOption>,
        placeholder: Option<String>,
        searchable: bool,
    },
    RangeSlider {
        min: f64,
        max: f64,
        step: f64,
        marks: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSpec {
    pub id: ControlId,
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: ControlKind,
    pub initial: Option<ControlValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterMode {
    Markers,
    Lines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(deserialize_with = "numbers_or_nan")]
    pub color: Vec<f64>,
    pub colorscale: String,
    pub showscale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub title: Title,
}

/// One plotly trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Pie {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        labels: Vec<Datum>,
        #[serde(deserialize_with = "numbers_or_nan")]
        values: Vec<f64>,
    },
    Bar {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        x: Vec<Datum>,
        #[serde(deserialize_with = "numbers_or_nan")]
        y: Vec<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        marker: Option<Marker>,
    },
    Scatter {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        mode: ScatterMode,
        x: Vec<Datum>,
        #[serde(deserialize_with = "numbers_or_nan")]
        y: Vec<f64>,
    },
}

impl Trace {
    /// Number of plotted points (pie segments, bars or markers).
    pub fn len(&self) -> usize {
        match self {
            Self::Pie { values, .. } => values.len(),
            Self::Bar { y, .. } | Self::Scatter { y, .. } => y.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl From<&str> for Title {
    fn from(value: &str) -> Self {
        Self {
            text: value.to_string(),
        }
    }
}

impl From<String> for Title {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub title: Title,
    #[serde(default)]
    pub xaxis: Axis,
    #[serde(default)]
    pub yaxis: Axis,
}

/// Plotly-compatible figure: `{ data, layout }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

impl Figure {
    pub fn title(&self) -> &str {
        &self.layout.title.text
    }

    pub fn point_count(&self) -> usize {
        self.data.iter().map(Trace::len).sum()
    }
}

/// Replacement content for one output region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RegionContent {
    Empty,
    Figure(Figure),
    ChartGrid(Vec<Vec<Figure>>),
    Disabled(bool),
}

impl RegionContent {
    /// Every figure in the region, grid cells in row order.
    pub fn figures(&self) -> Vec<&Figure> {
        match self {
            Self::Figure(figure) => vec![figure],
            Self::ChartGrid(rows) => rows.iter().flatten().collect(),
            Self::Empty | Self::Disabled(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionUpdate {
    pub output: OutputId,
    pub content: RegionContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlChange {
    pub changed: ControlId,
    #[serde(default)]
    pub controls: ControlState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewUpdate {
    pub regions: Vec<RegionUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub id: DashboardId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub id: OutputId,
    pub inputs: Vec<ControlId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub id: DashboardId,
    pub title: String,
    pub controls: Vec<ControlSpec>,
    pub outputs: Vec<OutputSpec>,
    pub initial: Vec<RegionUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_points_read_back_as_nan() {
        let figure = Figure {
            data: vec![
                Trace::Bar {
                    name: None,
                    x: vec![Datum::Text("Sports".into()), Datum::Number(f64::NAN)],
                    y: vec![f64::NAN, 2.0],
                    marker: Some(Marker {
                        color: vec![f64::NAN, 1.0],
                        colorscale: "Plasma".into(),
                        showscale: true,
                        colorbar: None,
                    }),
                },
                Trace::Pie {
                    name: None,
                    labels: vec![Datum::Text("Sports".into())],
                    values: vec![f64::NAN],
                },
            ],
            layout: FigureLayout {
                title: "missing".into(),
                xaxis: Axis::default(),
                yaxis: Axis::default(),
            },
        };

        let json = serde_json::to_string(&RegionContent::Figure(figure)).expect("json");
        assert!(json.contains("null"));
        let RegionContent::Figure(read) = serde_json::from_str(&json).expect("read back") else {
            panic!("expected a figure");
        };

        let Trace::Bar { x, y, marker, .. } = &read.data[0] else {
            panic!("expected a bar trace");
        };
        assert_eq!(x[0], Datum::Text("Sports".into()));
        assert!(matches!(x[1], Datum::Number(value) if value.is_nan()));
        assert!(y[0].is_nan());
        assert_eq!(y[1], 2.0);
        let color = &marker.as_ref().expect("marker").color;
        assert!(color[0].is_nan());
        assert_eq!(color[1], 1.0);

        let Trace::Pie { values, .. } = &read.data[1] else {
            panic!("expected a pie trace");
        };
        assert!(values[0].is_nan());
    }
}
