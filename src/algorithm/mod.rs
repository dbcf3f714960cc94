//! Algorithm implementations for observational study workflows
//!
//! This module contains the covariate matching pipeline used to pair
//! treated units with not-yet-treated controls.

pub mod matching;
