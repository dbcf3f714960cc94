//! Balance assessment for matched pairs
//!
//! This module joins the covariate values of matched treated and control
//! units and summarises, per covariate, how similar the two matched groups
//! are: group means and standard deviations, the standardized mean
//! difference, and the five-number summary of each side.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::algorithm::matching::types::{Cohorts, MatchingResult, Unit};
use crate::error::Result;

/// Covariate values of the matched pairs, treated and control side aligned
/// by pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedCovariate {
    /// Name of the covariate
    pub name: String,
    /// Values of the matched treated units, in pair order
    pub treated: Vec<f64>,
    /// Values of the matched controls, in pair order
    pub control: Vec<f64>,
}

/// Join treated-side and control-side covariate values through the pairs
///
/// Every id in a result produced from `cohorts` resolves; an unknown id is
/// skipped with a warning.
#[must_use]
pub fn paired_values(
    cohorts: &Cohorts,
    covariate_names: &[String],
    result: &MatchingResult,
) -> Vec<PairedCovariate> {
    let index = |units: &[Unit]| -> FxHashMap<String, usize> {
        units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id.clone(), i))
            .collect()
    };
    let treated_index = index(&cohorts.treated);
    let control_index = index(&cohorts.control);

    let mut paired: Vec<PairedCovariate> = covariate_names
        .iter()
        .map(|name| PairedCovariate {
            name: name.clone(),
            treated: Vec::with_capacity(result.len()),
            control: Vec::with_capacity(result.len()),
        })
        .collect();

    for (treated_id, control_id) in result.id_pairs() {
        let (Some(&t), Some(&c)) = (treated_index.get(treated_id), control_index.get(control_id))
        else {
            warn!("Pair {treated_id} -> {control_id} does not resolve to the cohorts, skipping");
            continue;
        };

        let treated = &cohorts.treated[t];
        let control = &cohorts.control[c];
        for (k, covariate) in paired.iter_mut().enumerate() {
            covariate.treated.push(treated.covariates[k]);
            covariate.control.push(control.covariates[k]);
        }
    }

    paired
}

/// Minimum, quartiles and maximum of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    /// Smallest value
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Largest value
    pub max: f64,
}

impl FiveNumberSummary {
    /// Summarise a non-empty sample, interpolating quantiles linearly
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Metric for balance between matched groups for a single covariate
#[derive(Debug, Clone, Serialize)]
pub struct BalanceMetric {
    /// Name of the covariate
    pub name: String,

    /// Standardized difference between treated and control groups
    pub standardized_difference: f64,

    /// Mean for matched treated units
    pub treated_mean: f64,

    /// Mean for matched controls
    pub control_mean: f64,

    /// Standard deviation for matched treated units
    pub treated_std: f64,

    /// Standard deviation for matched controls
    pub control_std: f64,

    /// Distribution of the treated values
    pub treated_summary: FiveNumberSummary,

    /// Distribution of the control values
    pub control_summary: FiveNumberSummary,
}

/// Summary statistics for a balance report
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    /// Number of covariates above the imbalance threshold
    pub imbalanced_covariates: usize,

    /// Maximum absolute standardized difference
    pub max_standardized_difference: f64,

    /// Mean absolute standardized difference
    pub mean_absolute_standardized_difference: f64,

    /// Total number of covariates assessed
    pub total_covariates: usize,

    /// Threshold used to flag imbalance
    pub imbalance_threshold: f64,
}

/// Report on balance between matched treated units and controls
#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    /// Balance metrics for each covariate
    pub metrics: Vec<BalanceMetric>,

    /// Summary statistics
    pub summary: BalanceSummary,
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Balance Summary:\n\
             - Total covariates: {}\n\
             - Imbalanced covariates (|std diff| > {}): {}\n\
             - Maximum standardized difference: {:.4}\n\
             - Mean absolute standardized difference: {:.4}\n",
            self.summary.total_covariates,
            self.summary.imbalance_threshold,
            self.summary.imbalanced_covariates,
            self.summary.max_standardized_difference,
            self.summary.mean_absolute_standardized_difference
        )?;

        writeln!(
            f,
            "Covariate                      | Treated Mean | Control Mean | Treated SD | Control SD | Std Diff"
        )?;
        writeln!(
            f,
            "-------------------------------|--------------|--------------|------------|------------|---------"
        )?;

        for metric in &self.metrics {
            writeln!(
                f,
                "{:<30} | {:>12.4} | {:>12.4} | {:>10.4} | {:>10.4} | {:>8.4}",
                truncate_string(&metric.name, 30),
                metric.treated_mean,
                metric.control_mean,
                metric.treated_std,
                metric.control_std,
                metric.standardized_difference
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Distribution (min / Q1 / median / Q3 / max):")?;
        for metric in &self.metrics {
            let t = &metric.treated_summary;
            let c = &metric.control_summary;
            writeln!(f, "{}", metric.name)?;
            writeln!(
                f,
                "  Treated: {:.2} / {:.2} / {:.2} / {:.2} / {:.2}",
                t.min, t.q1, t.median, t.q3, t.max
            )?;
            writeln!(
                f,
                "  Control: {:.2} / {:.2} / {:.2} / {:.2} / {:.2}",
                c.min, c.q1, c.median, c.q3, c.max
            )?;
        }

        Ok(())
    }
}

impl BalanceReport {
    /// Write the report to a CSV file
    pub fn write_to_csv(&self, file_path: &Path) -> Result<()> {
        let mut file = BufWriter::new(File::create(file_path)?);

        writeln!(
            file,
            "Covariate,Treated Mean,Control Mean,Treated SD,Control SD,Std Diff,\
             Treated Min,Treated Q1,Treated Median,Treated Q3,Treated Max,\
             Control Min,Control Q1,Control Median,Control Q3,Control Max"
        )?;

        for metric in &self.metrics {
            let t = &metric.treated_summary;
            let c = &metric.control_summary;
            writeln!(
                file,
                "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
                escape_csv(&metric.name),
                metric.treated_mean,
                metric.control_mean,
                metric.treated_std,
                metric.control_std,
                metric.standardized_difference,
                t.min,
                t.q1,
                t.median,
                t.q3,
                t.max,
                c.min,
                c.q1,
                c.median,
                c.q3,
                c.max
            )?;
        }

        file.flush()?;
        Ok(())
    }
}

/// Calculator for balance metrics between matched groups
#[derive(Debug, Clone)]
pub struct BalanceCalculator {
    /// Minimum matched pairs required for assessing a covariate
    min_observations: usize,

    /// Threshold for marking a covariate as imbalanced
    imbalance_threshold: f64,
}

impl Default for BalanceCalculator {
    fn default() -> Self {
        Self {
            min_observations: 2,
            imbalance_threshold: 0.1,
        }
    }
}

impl BalanceCalculator {
    /// Create a new balance calculator with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum required observations for calculating balance
    #[must_use]
    pub const fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    /// Set threshold for marking a covariate as imbalanced
    #[must_use]
    pub const fn with_imbalance_threshold(mut self, threshold: f64) -> Self {
        self.imbalance_threshold = threshold;
        self
    }

    /// Calculate balance metrics for each paired covariate
    ///
    /// Covariates with fewer than the minimum number of pairs are skipped with
    /// a warning.
    #[must_use]
    pub fn calculate_balance(&self, paired: &[PairedCovariate]) -> BalanceReport {
        let metrics: Vec<BalanceMetric> = paired
            .iter()
            .filter_map(|covariate| {
                let metric = self.calculate_metric(covariate);
                if metric.is_none() {
                    warn!(
                        "Too few matched pairs for covariate {} ({}), skipping balance",
                        covariate.name,
                        covariate.treated.len()
                    );
                }
                metric
            })
            .collect();

        let summary = self.calculate_summary_statistics(&metrics);

        info!(
            "Balance assessment complete: {} of {} covariates are imbalanced (stdiff > {})",
            summary.imbalanced_covariates, summary.total_covariates, self.imbalance_threshold
        );

        BalanceReport { metrics, summary }
    }

    fn calculate_metric(&self, covariate: &PairedCovariate) -> Option<BalanceMetric> {
        let n = covariate.treated.len().min(covariate.control.len());
        if n < self.min_observations.max(1) {
            return None;
        }

        let treated_mean = calculate_mean(&covariate.treated);
        let control_mean = calculate_mean(&covariate.control);
        let treated_std = calculate_std_dev(&covariate.treated, treated_mean);
        let control_std = calculate_std_dev(&covariate.control, control_mean);

        Some(BalanceMetric {
            name: covariate.name.clone(),
            standardized_difference: calculate_standardized_difference(
                treated_mean,
                control_mean,
                treated_std,
                control_std,
            ),
            treated_mean,
            control_mean,
            treated_std,
            control_std,
            treated_summary: FiveNumberSummary::from_values(&covariate.treated)?,
            control_summary: FiveNumberSummary::from_values(&covariate.control)?,
        })
    }

    fn calculate_summary_statistics(&self, metrics: &[BalanceMetric]) -> BalanceSummary {
        let mut imbalanced = 0;
        let mut max_std_diff: f64 = 0.0;
        let mut sum_abs_std_diff = 0.0;

        for metric in metrics {
            let abs_std_diff = metric.standardized_difference.abs();
            if abs_std_diff > self.imbalance_threshold {
                imbalanced += 1;
            }
            max_std_diff = max_std_diff.max(abs_std_diff);
            sum_abs_std_diff += abs_std_diff;
        }

        let mean_abs_std_diff = if metrics.is_empty() {
            0.0
        } else {
            sum_abs_std_diff / metrics.len() as f64
        };

        BalanceSummary {
            imbalanced_covariates: imbalanced,
            max_standardized_difference: max_std_diff,
            mean_absolute_standardized_difference: mean_abs_std_diff,
            total_covariates: metrics.len(),
            imbalance_threshold: self.imbalance_threshold,
        }
    }
}

/// Quantile of sorted values with linear interpolation between order statistics
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n−1 divisor)
fn calculate_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let variance =
        values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Difference of means over the pooled standard deviation
fn calculate_standardized_difference(mean1: f64, mean2: f64, std1: f64, std2: f64) -> f64 {
    let pooled_std = (std2.mul_add(std2, std1.powi(2)) / 2.0).sqrt();

    if pooled_std > 0.0 {
        (mean1 - mean2) / pooled_std
    } else {
        0.0
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
