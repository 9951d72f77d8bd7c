use shared::{
    domain::Datum,
    protocol::{Axis, ColorBar, Figure, FigureLayout, Marker, ScatterMode, Title, Trace},
};
use table::{Group, GroupRow, Rows};

fn layout(title: impl Into<Title>, x_title: &str, y_title: &str) -> FigureLayout {
    FigureLayout {
        title: title.into(),
        xaxis: Axis {
            title: Some(x_title.into()),
            tickangle: None,
        },
        yaxis: Axis {
            title: Some(y_title.into()),
            tickangle: None,
        },
    }
}

/// Figure with a title and no traces.
pub(crate) fn empty(title: impl Into<Title>) -> Figure {
    Figure {
        data: Vec::new(),
        layout: FigureLayout {
            title: title.into(),
            xaxis: Axis::default(),
            yaxis: Axis::default(),
        },
    }
}

/// One pie segment per group.
pub(crate) fn pie(title: impl Into<Title>, groups: Vec<Group>) -> Figure {
    let (labels, values) = groups
        .into_iter()
        .map(|group| (Datum::from(group.key), group.value))
        .unzip();
    Figure {
        data: vec![Trace::Pie {
            name: None,
            labels,
            values,
        }],
        layout: FigureLayout {
            title: title.into(),
            xaxis: Axis::default(),
            yaxis: Axis::default(),
        },
    }
}

/// Single x/y series over grouped values.
pub(crate) fn series(
    title: impl Into<Title>,
    groups: Vec<Group>,
    mode: ScatterMode,
    x_title: &str,
    y_title: &str,
) -> Figure {
    let (x, y) = groups
        .into_iter()
        .map(|group| (Datum::from(group.key), group.value))
        .unzip();
    Figure {
        data: vec![Trace::Scatter {
            name: None,
            mode,
            x,
            y,
        }],
        layout: layout(title, x_title, y_title),
    }
}

/// Per-row scatter with one trace per distinct value of `color`.
pub(crate) fn scatter_by(
    title: impl Into<Title>,
    rows: &Rows<'_>,
    x: &str,
    y: &str,
    color: &str,
) -> Figure {
    let data = rows
        .partition_by(color)
        .into_iter()
        .map(|(key, part)| Trace::Scatter {
            name: Some(key.to_string()),
            mode: ScatterMode::Markers,
            x: part.data(x),
            y: part.numbers(y),
        })
        .collect();
    Figure {
        data,
        layout: layout(title, x, y),
    }
}

/// Bar chart with one single-bar trace per group, so every group gets its
/// own colour and legend entry.
pub(crate) fn bars_by_key(
    title: impl Into<Title>,
    groups: Vec<Group>,
    x_title: &str,
    y_title: &str,
    tickangle: Option<i32>,
) -> Figure {
    let data = groups
        .into_iter()
        .map(|group| Trace::Bar {
            name: Some(group.key.to_string()),
            x: vec![Datum::from(group.key)],
            y: vec![group.value],
            marker: None,
        })
        .collect();
    let mut layout = layout(title, x_title, y_title);
    layout.xaxis.tickangle = tickangle;
    Figure { data, layout }
}

/// Bar chart of `values[0]` per group, coloured on a continuous scale by
/// `values[1]`.
pub(crate) fn bars_shaded(
    title: impl Into<Title>,
    groups: Vec<GroupRow>,
    x_title: &str,
    y_title: &str,
    color_title: &str,
    tickangle: Option<i32>,
) -> Figure {
    let mut x = Vec::with_capacity(groups.len());
    let mut y = Vec::with_capacity(groups.len());
    let mut color = Vec::with_capacity(groups.len());
    for group in groups {
        y.push(group.values.first().copied().unwrap_or(f64::NAN));
        color.push(group.values.get(1).copied().unwrap_or(f64::NAN));
        x.push(Datum::from(group.key));
    }
    let mut layout = layout(title, x_title, y_title);
    layout.xaxis.tickangle = tickangle;
    Figure {
        data: vec![Trace::Bar {
            name: None,
            x,
            y,
            marker: Some(Marker {
                color,
                colorscale: "Plasma".to_string(),
                showscale: true,
                colorbar: Some(ColorBar {
                    title: color_title.into(),
                }),
            }),
        }],
        layout,
    }
}
