//! Tests for the greedy matching pass

use cohort_match::algorithm::matching::covariance;
use cohort_match::{
    ExhaustedControlPool, InverseCovariance, Matcher, MatchingError, Population, Unit,
    mahalanobis, match_cohorts,
};

use crate::utils::{parallel_config, sequential_config, unit};

#[test]
fn test_end_to_end_example() {
    let treated = vec![unit("T1", &[5.0, 3.0, 2.0])];
    let control = vec![unit("C1", &[5.0, 3.0, 2.0]), unit("C2", &[9.0, 9.0, 9.0])];
    let inv = InverseCovariance::identity(3);

    let result = match_cohorts(&treated, &control, &inv).unwrap();

    assert_eq!(result.id_pairs().collect::<Vec<_>>(), vec![("T1", "C1")]);
    assert_eq!(result.pairs[0].distance, 0.0);
    assert!(mahalanobis(&[5.0, 3.0, 2.0], &[9.0, 9.0, 9.0], &inv) > 0.0);
    assert!(result.exhausted.is_none());
}

#[test]
fn test_diagonal_covariance_distance() {
    // Sample variances 2/3 and 8/3, zero covariance
    let population = Population::new(
        vec!["a".to_string(), "b".to_string()],
        vec![
            Unit::new("P1", "Treated", vec![1.0, 0.0]),
            Unit::new("P2", "Treated", vec![-1.0, 0.0]),
            Unit::new("P3", "Not Yet Treated", vec![0.0, 2.0]),
            Unit::new("P4", "Not Yet Treated", vec![0.0, -2.0]),
        ],
    )
    .unwrap();
    let inv = covariance::estimate(&population).unwrap();

    // 1²·1.5 + 2²·0.375 = 3
    let d = mahalanobis(&[0.0, 0.0], &[1.0, 2.0], &inv);
    assert!((d - 3.0f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_greedy_is_not_optimal() {
    let treated = vec![unit("T1", &[2.0, 0.0]), unit("T2", &[0.0, 0.0])];
    let control = vec![unit("C1", &[1.0, 0.0]), unit("C2", &[3.1, 0.0])];
    let inv = InverseCovariance::identity(2);

    let result = match_cohorts(&treated, &control, &inv).unwrap();
    assert_eq!(
        result.id_pairs().collect::<Vec<_>>(),
        vec![("T1", "C1"), ("T2", "C2")]
    );

    let greedy_total = result.total_distance();
    let crossed_total = mahalanobis(&treated[0].covariates, &control[1].covariates, &inv)
        + mahalanobis(&treated[1].covariates, &control[0].covariates, &inv);

    assert!((greedy_total - 4.1).abs() < 1e-9);
    assert!((crossed_total - 2.1).abs() < 1e-9);
    assert!(greedy_total > crossed_total);
}

#[test]
fn test_empty_treated_cohort() {
    let control = vec![unit("C1", &[1.0])];
    let result = match_cohorts(&[], &control, &InverseCovariance::identity(1)).unwrap();
    assert!(result.is_empty());
    assert!(result.exhausted.is_none());
}

#[test]
fn test_empty_control_cohort() {
    let treated = vec![unit("T1", &[1.0]), unit("T2", &[2.0])];
    let result = match_cohorts(&treated, &[], &InverseCovariance::identity(1)).unwrap();
    assert!(result.is_empty());
    assert_eq!(
        result.exhausted,
        Some(ExhaustedControlPool {
            unmatched_treated: 2
        })
    );
}

#[test]
fn test_control_cohort_is_not_mutated() {
    let treated = vec![unit("T1", &[0.0]), unit("T2", &[5.0])];
    let control = vec![unit("C1", &[1.0]), unit("C2", &[4.0]), unit("C3", &[9.0])];
    let before = control.clone();

    let result = match_cohorts(&treated, &control, &InverseCovariance::identity(1)).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(control, before);
}

#[test]
fn test_ties_resolve_to_first_control() {
    let treated = vec![unit("T1", &[0.0, 0.0])];
    let control = vec![
        unit("C1", &[3.0, 0.0]),
        unit("C2", &[0.0, 1.0]),
        unit("C3", &[1.0, 0.0]),
        unit("C4", &[0.0, -1.0]),
    ];
    let inv = InverseCovariance::identity(2);

    let seq = Matcher::new(sequential_config())
        .perform_matching(&treated, &control, &inv)
        .unwrap();
    let par = Matcher::new(parallel_config())
        .perform_matching(&treated, &control, &inv)
        .unwrap();

    assert_eq!(seq.id_pairs().collect::<Vec<_>>(), vec![("T1", "C2")]);
    assert_eq!(seq.pairs, par.pairs);
}

#[test]
fn test_earlier_treated_units_take_precedence() {
    // Both treated units are closest to C1; the first in order gets it
    let treated = vec![unit("T1", &[1.4]), unit("T2", &[1.0])];
    let control = vec![unit("C1", &[1.0]), unit("C2", &[3.0])];

    let result = match_cohorts(&treated, &control, &InverseCovariance::identity(1)).unwrap();
    assert_eq!(
        result.id_pairs().collect::<Vec<_>>(),
        vec![("T1", "C1"), ("T2", "C2")]
    );
}

#[test]
fn test_dimension_mismatch_is_rejected() {
    let treated = vec![unit("T1", &[1.0, 2.0, 3.0])];
    let control = vec![unit("C1", &[1.0, 2.0, 3.0])];
    let err = match_cohorts(&treated, &control, &InverseCovariance::identity(2)).unwrap_err();
    assert!(matches!(err, MatchingError::DimensionMismatch { .. }));
}
