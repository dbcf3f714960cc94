use std::fs;
use std::path::{Path, PathBuf};

use cohort_match::{DatasetSchema, MatchingConfig, Population, Unit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Header of the patient fixture tables
pub const PATIENT_HEADER: &str =
    "Patient_ID,Treatment_Status,Pain_Baseline,Urgency_Baseline,Frequency_Baseline";

/// Patient rows used across the context and loading tests
///
/// P06 carries a label outside both cohorts.
pub const PATIENT_ROWS: &[&str] = &[
    "P01,Treated,5,3,2",
    "P02,Treated,7,6,4",
    "P03,Not Yet Treated,5,3,3",
    "P04,Not Yet Treated,8,6,4",
    "P05,Not Yet Treated,1,9,2",
    "P06,Withdrawn,4,4,8",
    "P07,Not Yet Treated,2,2,6",
    "P08,Treated,3,8,3",
];

/// Create a unit with an empty status label
#[must_use]
pub fn unit(id: &str, covariates: &[f64]) -> Unit {
    Unit::new(id, "", covariates.to_vec())
}

/// Write a CSV file with the patient header and the given rows
pub fn write_patient_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from(PATIENT_HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    fs::write(&path, content).expect("write fixture csv");
    path
}

/// Configuration that never takes the parallel scan
#[must_use]
pub fn sequential_config() -> MatchingConfig {
    MatchingConfig::builder().use_parallel(false).build()
}

/// Configuration that always takes the parallel scan
#[must_use]
pub fn parallel_config() -> MatchingConfig {
    MatchingConfig::builder()
        .use_parallel(true)
        .parallel_threshold(1)
        .build()
}

/// Generate a population with integer-valued covariates, so distance ties
/// are common
#[must_use]
pub fn random_population(seed: u64, size: usize) -> Population {
    let schema = DatasetSchema::default();
    let mut rng = StdRng::seed_from_u64(seed);

    let units = (0..size)
        .map(|i| {
            let status = match rng.random_range(0..10_u8) {
                0..=3 => schema.treated_label.as_str(),
                4..=8 => schema.control_label.as_str(),
                _ => "Withdrawn",
            };
            let covariates = (0..schema.dimension())
                .map(|_| f64::from(rng.random_range(0..6_i32)))
                .collect();
            Unit::new(format!("P{i:04}"), status, covariates)
        })
        .collect();

    Population::new(schema.covariate_columns.clone(), units).expect("valid random population")
}
