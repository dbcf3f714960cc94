//! Invariants of the matching pass over generated populations

use std::collections::HashSet;

use cohort_match::{Matcher, MatchingContext};

use crate::utils::{parallel_config, random_population, sequential_config};

const SEEDS: [u64; 6] = [1, 7, 42, 99, 1234, 2024];

#[test]
fn test_controls_are_used_at_most_once() {
    for seed in SEEDS {
        let context =
            MatchingContext::from_population(random_population(seed, 120), sequential_config())
                .unwrap();
        let result = context.run().unwrap();

        let mut controls = HashSet::new();
        let mut treated = HashSet::new();
        for (t, c) in result.id_pairs() {
            assert!(controls.insert(c), "control {c} reused (seed {seed})");
            assert!(treated.insert(t), "treated {t} matched twice (seed {seed})");
        }
    }
}

#[test]
fn test_pair_count_is_min_of_cohorts() {
    for seed in SEEDS {
        let context =
            MatchingContext::from_population(random_population(seed, 80), sequential_config())
                .unwrap();
        let result = context.run().unwrap();
        let cohorts = context.cohorts();

        assert_eq!(
            result.len(),
            cohorts.treated.len().min(cohorts.control.len()),
            "seed {seed}"
        );
        assert_eq!(
            result.exhausted.is_some(),
            cohorts.treated.len() > cohorts.control.len(),
            "seed {seed}"
        );
    }
}

#[test]
fn test_pairs_follow_treated_order_and_resolve() {
    let context =
        MatchingContext::from_population(random_population(5, 100), sequential_config()).unwrap();
    let result = context.run().unwrap();
    let cohorts = context.cohorts();

    let treated_ids: Vec<&str> = cohorts.treated.iter().map(|u| u.id.as_str()).collect();
    let control_ids: HashSet<&str> = cohorts.control.iter().map(|u| u.id.as_str()).collect();

    let matched: Vec<&str> = result.id_pairs().map(|(t, _)| t).collect();
    assert_eq!(matched, treated_ids[..matched.len()]);
    assert!(result.id_pairs().all(|(_, c)| control_ids.contains(c)));
}

#[test]
fn test_runs_are_deterministic() {
    for seed in SEEDS {
        let context =
            MatchingContext::from_population(random_population(seed, 90), sequential_config())
                .unwrap();
        let first = context.run().unwrap();
        let second = context.run().unwrap();
        assert_eq!(first.pairs, second.pairs, "seed {seed}");
    }
}

#[test]
fn test_parallel_scan_matches_sequential() {
    for seed in SEEDS {
        let population = random_population(seed, 150);
        let context = MatchingContext::from_population(population, sequential_config()).unwrap();
        let cohorts = context.cohorts();
        let inv = context.inverse_covariance();

        let seq = Matcher::new(sequential_config())
            .perform_matching(&cohorts.treated, &cohorts.control, inv)
            .unwrap();
        let par = Matcher::new(parallel_config())
            .perform_matching(&cohorts.treated, &cohorts.control, inv)
            .unwrap();

        assert_eq!(seq.pairs, par.pairs, "seed {seed}");
        assert_eq!(seq.exhausted, par.exhausted, "seed {seed}");
    }
}

#[test]
fn test_each_pick_is_nearest_remaining() {
    use cohort_match::mahalanobis;

    let context =
        MatchingContext::from_population(random_population(77, 60), sequential_config()).unwrap();
    let result = context.run().unwrap();
    let cohorts = context.cohorts();
    let inv = context.inverse_covariance();

    let mut used = HashSet::new();
    for pair in &result.pairs {
        let treated = cohorts
            .treated
            .iter()
            .find(|u| u.id == pair.treated_id)
            .unwrap();
        let best = cohorts
            .control
            .iter()
            .filter(|c| !used.contains(c.id.as_str()))
            .map(|c| mahalanobis(&treated.covariates, &c.covariates, inv))
            .fold(f64::INFINITY, f64::min);

        assert!((pair.distance - best).abs() < 1e-12);
        used.insert(pair.control_id.as_str());
    }
}
