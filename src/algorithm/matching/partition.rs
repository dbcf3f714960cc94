//! Cohort partitioning
//!
//! Splits a population into treated and control cohorts by exact match on the
//! status label.

use log::info;

use crate::algorithm::matching::types::{Cohorts, Population};
use crate::config::DatasetSchema;

/// Partition a population into treated and control cohorts
///
/// Units whose status is neither label are left out of both cohorts. Input
/// order is kept within each cohort.
#[must_use]
pub fn partition(population: &Population, schema: &DatasetSchema) -> Cohorts {
    let mut cohorts = Cohorts::default();
    let mut excluded = 0usize;

    for unit in population.units() {
        if unit.status == schema.treated_label {
            cohorts.treated.push(unit.clone());
        } else if unit.status == schema.control_label {
            cohorts.control.push(unit.clone());
        } else {
            excluded += 1;
        }
    }

    info!(
        "Partitioned {} units: {} treated, {} control, {} excluded",
        population.len(),
        cohorts.treated.len(),
        cohorts.control.len(),
        excluded
    );

    cohorts
}
