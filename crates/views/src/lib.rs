use std::sync::Arc;

use shared::{
    domain::{ControlId, ControlState, DashboardId, OutputId},
    error::ApiError,
    protocol::{
        ControlChange, ControlSpec, DashboardLayout, DashboardSummary, OutputSpec, RegionContent,
        RegionUpdate, ViewUpdate,
    },
};
use table::Dataset;
use tracing::debug;

pub mod automobile_sales;
mod chart;
pub mod launch_records;

/// Pure computation of one region's content from the projected control
/// state.
pub type Compute = fn(&Dataset, &ControlState) -> RegionContent;

struct Binding {
    output: OutputId,
    inputs: Vec<ControlId>,
    compute: Compute,
}

impl Binding {
    fn depends_on(&self, control: &ControlId) -> bool {
        self.inputs.contains(control)
    }

    fn evaluate(&self, dataset: &Dataset, state: &ControlState) -> RegionUpdate {
        RegionUpdate {
            output: self.output.clone(),
            content: (self.compute)(dataset, &state.project(&self.inputs)),
        }
    }
}

/// One page: its controls, its read-only dataset and the table of bindings
/// from controls to output regions.
pub struct Dashboard {
    id: DashboardId,
    title: String,
    dataset: Arc<Dataset>,
    controls: Vec<ControlSpec>,
    bindings: Vec<Binding>,
}

impl Dashboard {
    pub fn new(
        id: impl Into<DashboardId>,
        title: impl Into<String>,
        dataset: Arc<Dataset>,
        controls: Vec<ControlSpec>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            dataset,
            controls,
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, output: &str, inputs: &[&str], compute: Compute) -> Self {
        self.bindings.push(Binding {
            output: OutputId::from(output),
            inputs: inputs.iter().map(|id| ControlId::from(*id)).collect(),
            compute,
        });
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    pub fn initial_state(&self) -> ControlState {
        let mut state = ControlState::new();
        for control in &self.controls {
            if let Some(value) = &control.initial {
                state.set(control.id.clone(), value.clone());
            }
        }
        state
    }

    pub fn layout(&self) -> DashboardLayout {
        DashboardLayout {
            id: self.id.clone(),
            title: self.title.clone(),
            controls: self.controls.clone(),
            outputs: self
                .bindings
                .iter()
                .map(|binding| OutputSpec {
                    id: binding.output.clone(),
                    inputs: binding.inputs.clone(),
                })
                .collect(),
            initial: self.render_all(&self.initial_state()),
        }
    }

    /// Evaluates every binding, as on first page load.
    pub fn render_all(&self, state: &ControlState) -> Vec<RegionUpdate> {
        self.bindings
            .iter()
            .map(|binding| binding.evaluate(&self.dataset, state))
            .collect()
    }

    pub fn render(
        &self,
        output: &OutputId,
        state: &ControlState,
    ) -> Result<RegionContent, ApiError> {
        let binding = self
            .bindings
            .iter()
            .find(|binding| &binding.output == output)
            .ok_or_else(|| ApiError::not_found(format!("unknown output '{output}'")))?;
        Ok(binding.evaluate(&self.dataset, state).content)
    }

    /// Recomputes every region that depends on the changed control. Regions
    /// that do not depend on it are left out of the update.
    pub fn on_change(&self, change: &ControlChange) -> Result<ViewUpdate, ApiError> {
        if !self.controls.iter().any(|control| control.id == change.changed) {
            return Err(ApiError::validation(format!(
                "unknown control '{}'",
                change.changed
            )));
        }

        let regions: Vec<RegionUpdate> = self
            .bindings
            .iter()
            .filter(|binding| binding.depends_on(&change.changed))
            .map(|binding| binding.evaluate(&self.dataset, &change.controls))
            .collect();
        debug!(
            dashboard = %self.id,
            changed = %change.changed,
            regions = regions.len(),
            "recomputed regions"
        );
        Ok(ViewUpdate { regions })
    }
}

/// Every dashboard the process serves.
#[derive(Default)]
pub struct Catalog {
    dashboards: Vec<Dashboard>,
}

impl Catalog {
    pub fn new(dashboards: Vec<Dashboard>) -> Self {
        Self { dashboards }
    }

    pub fn get(&self, id: &str) -> Result<&Dashboard, ApiError> {
        self.dashboards
            .iter()
            .find(|dashboard| dashboard.id.as_str() == id)
            .ok_or_else(|| ApiError::not_found(format!("unknown dashboard '{id}'")))
    }

    pub fn summaries(&self) -> Vec<DashboardSummary> {
        self.dashboards.iter().map(Dashboard::summary).collect()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
