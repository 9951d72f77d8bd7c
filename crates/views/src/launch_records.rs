//! Launch outcomes per site, and payload mass against outcome.

use std::{collections::BTreeMap, sync::Arc};

use shared::{
    domain::{ControlId, ControlState, ControlValue},
    protocol::{ControlKind, ControlSpec, DropdownOption, RegionContent},
};
use table::{Aggregate, ColumnSpec, Dataset};

use crate::{chart, Dashboard};

pub const ID: &str = "launch-records";
pub const TITLE: &str = "SpaceX Launch Records Dashboard";

pub const SITE: &str = "site-dropdown";
pub const PAYLOAD: &str = "payload-slider";
pub const SUCCESS_PIE: &str = "success-pie-chart";
pub const PAYLOAD_SCATTER: &str = "success-payload-scatter-chart";

/// Site value that selects every launch site.
pub const ALL_SITES: &str = "ALL";

const SITE_COLUMN: &str = "Launch Site";
const CLASS_COLUMN: &str = "class";
const PAYLOAD_COLUMN: &str = "Payload Mass (kg)";
const BOOSTER_COLUMN: &str = "Booster Version Category";

pub const SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::text(SITE_COLUMN),
    ColumnSpec::number(CLASS_COLUMN),
    ColumnSpec::number(PAYLOAD_COLUMN),
    ColumnSpec::text(BOOSTER_COLUMN),
];

pub fn dashboard(dataset: Arc<Dataset>) -> Dashboard {
    let mut options = vec![DropdownOption::new("All Sites", ALL_SITES)];
    options.extend(dataset.distinct(SITE_COLUMN).into_iter().map(|site| {
        let site = site.to_string();
        DropdownOption::new(site.clone(), site.as_str())
    }));

    let controls = vec![
        ControlSpec {
            id: ControlId::from(SITE),
            label: None,
            kind: ControlKind::Dropdown {
                options,
                placeholder: Some("Select a Launch Site".to_string()),
                searchable: true,
            },
            initial: Some(ALL_SITES.into()),
        },
        ControlSpec {
            id: ControlId::from(PAYLOAD),
            label: Some("Payload range (Kg):".to_string()),
            kind: ControlKind::RangeSlider {
                min: 0.0,
                max: 10000.0,
                step: 1000.0,
                marks: BTreeMap::from([
                    ("0".to_string(), "0".to_string()),
                    ("100".to_string(), "100".to_string()),
                ]),
            },
            initial: Some(ControlValue::Range([0.0, 10000.0])),
        },
    ];

    Dashboard::new(ID, TITLE, dataset, controls)
        .bind(SUCCESS_PIE, &[SITE], success_pie)
        .bind(PAYLOAD_SCATTER, &[SITE, PAYLOAD], payload_scatter)
}

fn success_pie(dataset: &Dataset, inputs: &ControlState) -> RegionContent {
    let Some(site) = inputs.text(SITE) else {
        return RegionContent::Empty;
    };

    let figure = if site == ALL_SITES {
        let groups = dataset
            .rows()
            .group_by(SITE_COLUMN, CLASS_COLUMN, Aggregate::Sum);
        chart::pie("Total Success Launches by Site", groups)
    } else {
        let groups = dataset
            .rows()
            .where_text_eq(SITE_COLUMN, site)
            .group_by(CLASS_COLUMN, CLASS_COLUMN, Aggregate::Count);
        chart::pie(format!("Total Success Launches for site {site}"), groups)
    };
    RegionContent::Figure(figure)
}

fn payload_scatter(dataset: &Dataset, inputs: &ControlState) -> RegionContent {
    let (Some(site), Some((low, high))) = (inputs.text(SITE), inputs.range(PAYLOAD)) else {
        return RegionContent::Empty;
    };

    let rows = dataset
        .rows()
        .where_between_exclusive(PAYLOAD_COLUMN, low, high);

    let figure = if site == ALL_SITES {
        chart::scatter_by(
            format!("Correlation between Payload ({low}-{high}) and Success for all sites"),
            &rows,
            PAYLOAD_COLUMN,
            CLASS_COLUMN,
            SITE_COLUMN,
        )
    } else {
        chart::scatter_by(
            format!("Correlation between Payload ({low}-{high}) and Success for {site}"),
            &rows.where_text_eq(SITE_COLUMN, site),
            PAYLOAD_COLUMN,
            CLASS_COLUMN,
            BOOSTER_COLUMN,
        )
    };
    RegionContent::Figure(figure)
}
