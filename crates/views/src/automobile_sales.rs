//! Historical automobile sales, split into a yearly report and a recession
//! period report.

use std::sync::Arc;

use shared::{
    domain::{ControlId, ControlState},
    protocol::{ControlKind, ControlSpec, DropdownOption, Figure, RegionContent, ScatterMode},
};
use table::{Aggregate, ColumnSpec, Dataset};

use crate::{chart, Dashboard};

pub const ID: &str = "automobile-sales";
pub const TITLE: &str = "Automobile Statistics Dashboard";

pub const REPORT: &str = "dropdown-statistics";
pub const YEAR: &str = "select-year";
/// Output that toggles the `disabled` property of the year control.
pub const YEAR_GATE: &str = "select-year";
pub const OUTPUT: &str = "output-container";

pub const YEARLY: &str = "Yearly Statistics";
pub const RECESSION: &str = "Recession Period Statistics";

pub const FIRST_YEAR: i32 = 1980;
pub const LAST_YEAR: i32 = 2023;

const YEAR_COLUMN: &str = "Year";
const MONTH_COLUMN: &str = "Month";
const RECESSION_COLUMN: &str = "Recession";
const SALES_COLUMN: &str = "Automobile_Sales";
const VEHICLE_COLUMN: &str = "Vehicle_Type";
const ADVERTISING_COLUMN: &str = "Advertising_Expenditure";
const UNEMPLOYMENT_COLUMN: &str = "unemployment_rate";

pub const SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::number(YEAR_COLUMN),
    ColumnSpec::text(MONTH_COLUMN),
    ColumnSpec::number(RECESSION_COLUMN),
    ColumnSpec::number(SALES_COLUMN),
    ColumnSpec::text(VEHICLE_COLUMN),
    ColumnSpec::number(ADVERTISING_COLUMN),
    ColumnSpec::number(UNEMPLOYMENT_COLUMN),
];

const X_TICKS_VERTICAL: Option<i32> = Some(270);

pub fn dashboard(dataset: Arc<Dataset>) -> Dashboard {
    let controls = vec![
        ControlSpec {
            id: ControlId::from(REPORT),
            label: Some("Select Statistics:".to_string()),
            kind: ControlKind::Dropdown {
                options: vec![
                    DropdownOption::new(YEARLY, YEARLY),
                    DropdownOption::new(RECESSION, RECESSION),
                ],
                placeholder: Some("Select a report type".to_string()),
                searchable: true,
            },
            initial: Some("Select Statistics".into()),
        },
        ControlSpec {
            id: ControlId::from(YEAR),
            label: None,
            kind: ControlKind::Dropdown {
                options: (FIRST_YEAR..=LAST_YEAR)
                    .map(|year| DropdownOption::new(year.to_string(), f64::from(year)))
                    .collect(),
                placeholder: Some("Select-year".to_string()),
                searchable: true,
            },
            initial: Some("Select-year".into()),
        },
    ];

    Dashboard::new(ID, TITLE, dataset, controls)
        .bind(YEAR_GATE, &[REPORT], year_disabled)
        .bind(OUTPUT, &[REPORT, YEAR], report_charts)
}

/// The year only matters for the yearly report.
fn year_disabled(_dataset: &Dataset, inputs: &ControlState) -> RegionContent {
    RegionContent::Disabled(inputs.text(REPORT) != Some(YEARLY))
}

fn report_charts(dataset: &Dataset, inputs: &ControlState) -> RegionContent {
    match inputs.text(REPORT) {
        Some(RECESSION) => RegionContent::ChartGrid(recession_charts(dataset)),
        Some(YEARLY) => RegionContent::ChartGrid(yearly_charts(dataset, inputs.number(YEAR))),
        _ => RegionContent::Empty,
    }
}

fn recession_charts(dataset: &Dataset) -> Vec<Vec<Figure>> {
    let recession = dataset.rows().where_number_eq(RECESSION_COLUMN, 1.0);

    let sales_over_time = chart::series(
        "Average Automobile Sales fluctuation over Recession Period",
        recession.group_by(YEAR_COLUMN, SALES_COLUMN, Aggregate::Mean),
        ScatterMode::Markers,
        YEAR_COLUMN,
        SALES_COLUMN,
    );
    let sales_by_type = chart::bars_by_key(
        "Average Automobile Sales by Vehicle type",
        recession.group_by(VEHICLE_COLUMN, SALES_COLUMN, Aggregate::Mean),
        VEHICLE_COLUMN,
        SALES_COLUMN,
        X_TICKS_VERTICAL,
    );
    let advertising_share = chart::pie(
        "Total expenditure share by vehicle type",
        recession.group_by(VEHICLE_COLUMN, ADVERTISING_COLUMN, Aggregate::Sum),
    );
    let unemployment_effect = chart::bars_shaded(
        "Effect of Unemployment Rate on Vehicle Type and Sales",
        recession.group_by_many(
            VEHICLE_COLUMN,
            &[
                (SALES_COLUMN, Aggregate::Mean),
                (UNEMPLOYMENT_COLUMN, Aggregate::Mean),
            ],
        ),
        VEHICLE_COLUMN,
        "Average Automobile Sales",
        "Unemployment Rate",
        X_TICKS_VERTICAL,
    );

    vec![
        vec![sales_over_time, sales_by_type],
        vec![advertising_share, unemployment_effect],
    ]
}

/// Charts 1 and 2 cover the whole period; 3 and 4 need a year and are empty
/// without one.
fn yearly_charts(dataset: &Dataset, year: Option<f64>) -> Vec<Vec<Figure>> {
    let all = dataset.rows();

    let sales_per_year = chart::series(
        "Yearly Automobile sales per year",
        all.group_by(YEAR_COLUMN, SALES_COLUMN, Aggregate::Mean),
        ScatterMode::Lines,
        YEAR_COLUMN,
        SALES_COLUMN,
    );
    let sales_per_month = chart::series(
        "Total Monthly Automobile Sales",
        all.group_by(MONTH_COLUMN, SALES_COLUMN, Aggregate::Mean),
        ScatterMode::Lines,
        MONTH_COLUMN,
        SALES_COLUMN,
    );

    const VEHICLES_TITLE: &str = "Average Vehicles Sold by Vehicle Type";
    const ADVERTISING_TITLE: &str = "Total Advertisement Expenditure for each vehicle";

    let (vehicles_in_year, advertising_in_year) = match year {
        Some(year) => {
            let in_year = all.where_number_eq(YEAR_COLUMN, year);
            (
                chart::bars_by_key(
                    format!("{VEHICLES_TITLE} in the year {year}"),
                    in_year.group_by(VEHICLE_COLUMN, SALES_COLUMN, Aggregate::Mean),
                    VEHICLE_COLUMN,
                    SALES_COLUMN,
                    None,
                ),
                chart::pie(
                    ADVERTISING_TITLE,
                    in_year.group_by(VEHICLE_COLUMN, ADVERTISING_COLUMN, Aggregate::Sum),
                ),
            )
        }
        None => (chart::empty(VEHICLES_TITLE), chart::empty(ADVERTISING_TITLE)),
    };

    vec![
        vec![sales_per_year, sales_per_month],
        vec![vehicles_in_year, advertising_in_year],
    ]
}
