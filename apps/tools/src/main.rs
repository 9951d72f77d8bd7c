use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::{ControlId, ControlValue, OutputId};
use table::{Column, DatasetSource};
use tracing_subscriber::EnvFilter;
use views::{automobile_sales, launch_records, Dashboard};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints one output region of a dashboard as JSON.
    Render {
        dashboard: String,
        output: String,
        /// Path or http(s) URL of the dashboard's CSV.
        #[arg(long)]
        data: String,
        /// Control value, `id=value`; `low,high` sets a range.
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(ControlId, ControlValue)>,
        /// Start from the dashboard's initial control values.
        #[arg(long)]
        initial: bool,
    },
    /// Prints the columns and row count of a CSV.
    Describe {
        #[arg(long)]
        data: String,
    },
}

fn parse_assignment(raw: &str) -> Result<(ControlId, ControlValue), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected id=value, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing control id in '{raw}'"));
    }
    Ok((ControlId::from(id), parse_value(value.trim())))
}

fn parse_value(raw: &str) -> ControlValue {
    if let Some((low, high)) = raw.split_once(',') {
        if let (Ok(low), Ok(high)) = (low.trim().parse(), high.trim().parse()) {
            return ControlValue::Range([low, high]);
        }
    }
    match raw.parse::<f64>() {
        Ok(number) => ControlValue::Number(number),
        Err(_) => ControlValue::Text(raw.to_string()),
    }
}

async fn load_dashboard(id: &str, data: &str) -> Result<Dashboard> {
    let source = DatasetSource::parse(data);
    let dashboard = match id {
        launch_records::ID => {
            let dataset = source.load(launch_records::SCHEMA).await?;
            launch_records::dashboard(Arc::new(dataset))
        }
        automobile_sales::ID => {
            let dataset = source.load(automobile_sales::SCHEMA).await?;
            automobile_sales::dashboard(Arc::new(dataset))
        }
        other => bail!(
            "unknown dashboard '{other}', expected {} or {}",
            launch_records::ID,
            automobile_sales::ID
        ),
    };
    Ok(dashboard)
}

/// `RUST_LOG` when it parses, otherwise warnings only so stdout stays JSON.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            dashboard,
            output,
            data,
            set,
            initial,
        } => {
            let dashboard = load_dashboard(&dashboard, &data)
                .await
                .with_context(|| format!("failed to load {data}"))?;
            let mut state = if initial {
                dashboard.initial_state()
            } else {
                Default::default()
            };
            for (id, value) in set {
                state.set(id, value);
            }
            let content = dashboard.render(&OutputId::new(output), &state)?;
            println!("{}", serde_json::to_string_pretty(&content)?);
        }
        Command::Describe { data } => {
            let dataset = DatasetSource::parse(&data)
                .load(&[])
                .await
                .with_context(|| format!("failed to load {data}"))?;
            println!("rows={}", dataset.len());
            for name in dataset.column_names() {
                let kind = match dataset.column(name) {
                    Some(Column::Number(_)) => "number",
                    Some(Column::Text(_)) => "text",
                    None => continue,
                };
                println!("{name}\t{kind}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges_numbers_and_text() {
        assert_eq!(
            parse_assignment("payload-slider=0,10000").expect("range").1,
            ControlValue::Range([0.0, 10000.0])
        );
        assert_eq!(
            parse_assignment("select-year=1995").expect("number").1,
            ControlValue::Number(1995.0)
        );
        assert_eq!(
            parse_assignment("site-dropdown=CCAFS LC-40").expect("text").1,
            ControlValue::Text("CCAFS LC-40".into())
        );
    }

    #[test]
    fn rejects_assignment_without_id() {
        assert!(parse_assignment("=ALL").is_err());
        assert!(parse_assignment("ALL").is_err());
    }

    #[test]
    fn render_command_collects_every_set_flag() {
        let cli = Cli::try_parse_from([
            "tools",
            "render",
            "launch-records",
            "success-payload-scatter-chart",
            "--data",
            "launches.csv",
            "--set",
            "site-dropdown=ALL",
            "--set",
            "payload-slider=0,5000",
        ])
        .expect("cli");
        let Command::Render { set, initial, .. } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(set.len(), 2);
        assert!(!initial);
    }

    #[test]
    fn rust_log_overrides_the_warn_default() {
        assert_eq!(log_filter(None).to_string(), "warn");
        assert_eq!(log_filter(Some("table=debug")).to_string(), "table=debug");
    }
}
