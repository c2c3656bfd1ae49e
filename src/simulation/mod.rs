//! "What if" projections over an owner's existing grids.

use serde::Serialize;
use tracing::debug;

use crate::domain::{compute_output, is_producing, FleetResult, SolarGrid};
use crate::registry::GridRegistry;

/// A grid together with its output after the projected number of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedGrid {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub network_id: i64,
    pub power_output: f64,
    pub projected_output: f64,
}

#[derive(Clone)]
pub struct SimulationQuery {
    grids: GridRegistry,
}

impl SimulationQuery {
    pub fn new(grids: GridRegistry) -> Self {
        Self { grids }
    }

    /// Total output if every producing grid of the owner had aged `days`.
    ///
    /// Only grids whose stored age is past the commissioning hold count, and
    /// each contributes `compute_output(days)` regardless of its own age.
    pub async fn total_output_after(&self, owner_id: i64, days: u32) -> FleetResult<f64> {
        if !is_producing(days) {
            debug!(owner_id, days, "projection inside commissioning hold");
            return Ok(0.0);
        }

        let per_grid = compute_output(days);
        let grids = self.grids.find_by_owner(owner_id).await?;
        let total = grids
            .iter()
            .filter(|grid| is_producing(grid.age))
            .map(|_| per_grid)
            .sum();
        debug!(owner_id, days, grids = grids.len(), total_output_kw = total, "total output projected");
        Ok(total)
    }

    /// Every grid of the owner with `compute_output(days)` added on top of its
    /// stored output. The addition only applies past the hold, both for `days`
    /// and for the grid's stored age.
    pub async fn network_state_after(
        &self,
        owner_id: i64,
        days: u32,
    ) -> FleetResult<Vec<ProjectedGrid>> {
        let increment = compute_output(days);
        let grids = self.grids.find_by_owner(owner_id).await?;
        Ok(grids
            .into_iter()
            .map(|grid| project(grid, days, increment))
            .collect())
    }
}

fn project(grid: SolarGrid, days: u32, increment: f64) -> ProjectedGrid {
    let projected_output = if is_producing(days) && is_producing(grid.age) {
        grid.power_output + increment
    } else {
        grid.power_output
    };
    ProjectedGrid {
        id: grid.id,
        name: grid.name,
        age: grid.age,
        network_id: grid.network_id,
        power_output: grid.power_output,
        projected_output,
    }
}
