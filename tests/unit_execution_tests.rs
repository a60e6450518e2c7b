//! # Execution Module Unit Tests / Execution 模块单元测试
//!
//! Tests for the orchestrator: worker fan-out, seed derivation, warm-up,
//! verdict aggregation and early shutdown.
//!
//! 编排器的测试：工作线程数量、种子派生、预热、结论汇总以及提前关闭。

mod common;

use common::{Behavior, MockUnit, broken_kind, failing_kind, panicking_kind, passing_kind, registry_of};
use matrix_stress::core::config::StressConfig;
use matrix_stress::core::error::StressError;
use matrix_stress::core::execution::{Orchestrator, RunVerdict, derive_worker_seeds, warm_up};
use matrix_stress::core::models::{TestUnit, UnitError};
use matrix_stress::core::worker::{WorkerFailure, WorkerReport};
use matrix_stress::kinds;
use matrix_stress::kinds::model::interned_names;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn quick_config(threads_factor: usize, stress_time_secs: u64) -> StressConfig {
    StressConfig {
        seed: 77,
        threads_factor,
        stress_time_secs,
        poll_interval_ms: 50,
        ..StressConfig::default()
    }
}

fn report(name: &str, executed: u64) -> WorkerReport {
    WorkerReport {
        name: name.to_string(),
        seed: 1,
        executed,
        failure: None,
    }
}

#[cfg(test)]
mod seed_tests {
    use super::*;

    #[test]
    fn test_worker_seeds_are_reproducible() {
        assert_eq!(derive_worker_seeds(42, 5), derive_worker_seeds(42, 5));
        assert_ne!(derive_worker_seeds(42, 5), derive_worker_seeds(43, 5));
    }

    #[test]
    fn test_worker_seeds_extend_as_a_prefix() {
        let five = derive_worker_seeds(9, 5);
        let eight = derive_worker_seeds(9, 8);
        assert_eq!(five[..], eight[..5]);
    }

    #[test]
    fn test_worker_seeds_are_distinct() {
        let seeds = derive_worker_seeds(1, 16);
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
    }
}

#[cfg(test)]
mod verdict_tests {
    use super::*;

    #[test]
    fn test_passing_verdict_into_result() {
        let verdict = RunVerdict {
            seed: 1,
            matrix_size: 10,
            workers: vec![report("a", 3), report("b", 4)],
            elapsed: Duration::from_secs(1),
        };
        assert!(!verdict.is_failed());
        assert_eq!(verdict.total_executed(), 7);
        assert!(verdict.into_result().is_ok());
    }

    #[test]
    fn test_one_failed_worker_fails_the_verdict() {
        let failed = WorkerReport {
            failure: Some(WorkerFailure {
                index: 4,
                test: Arc::new(MockUnit::new(4, Behavior::FailAfter(1))) as Arc<dyn TestUnit>,
                cause: UnitError::Assertion("mock #4 failed on run 1".to_string()),
            }),
            ..report("b", 2)
        };
        let verdict = RunVerdict {
            seed: 1,
            matrix_size: 10,
            workers: vec![report("a", 3), failed, report("c", 5)],
            elapsed: Duration::from_secs(1),
        };

        assert!(verdict.is_failed());
        assert_eq!(verdict.failed_count(), 1);
        assert_eq!(verdict.total_executed(), 10);
        assert!(matches!(
            verdict.into_result(),
            Err(StressError::WorkersFailed { failed: 1, total: 3 })
        ));
    }

    #[test]
    fn test_warm_up_ignores_panicking_units() {
        let registry = registry_of(&[panicking_kind("P"), passing_kind("A")]);
        assert_eq!(warm_up(&registry).unwrap(), 2);
    }

    #[test]
    fn test_warm_up_primes_reflective_name_index() {
        assert_eq!(warm_up(&kinds::registry()).unwrap(), 5);
        assert!(interned_names() > 0);
    }

    #[test]
    fn test_warm_up_counts_kinds() {
        let registry = registry_of(&[passing_kind("A"), failing_kind("F")]);
        // Failures of the units themselves are ignored during warm-up.
        assert_eq!(warm_up(&registry).unwrap(), 2);
    }

    #[test]
    fn test_warm_up_construction_failure_is_fatal() {
        let registry = registry_of(&[passing_kind("A"), broken_kind("Broken")]);
        assert!(matches!(
            warm_up(&registry),
            Err(StressError::Setup { kind, .. }) if kind == "Broken"
        ));
    }
}

#[cfg(test)]
mod orchestrator_tests {
    use super::*;

    #[test]
    fn test_threads_factor_one_spawns_five_workers() {
        let orchestrator =
            Orchestrator::new(quick_config(1, 1), registry_of(&[passing_kind("A")]));
        let verdict = orchestrator.run().unwrap();

        assert_eq!(verdict.workers.len(), 5);
        assert_eq!(verdict.seed, 77);
        assert_eq!(verdict.matrix_size, 6 * 4 * 4);
        assert!(verdict.total_executed() > 0);
        assert!(verdict.elapsed >= Duration::from_secs(1));

        let names: Vec<&str> = verdict.workers.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names[0], "Worker #1/5");
        assert_eq!(names[4], "Worker #5/5");
    }

    #[test]
    fn test_worker_seeds_come_from_master_seed() {
        let orchestrator =
            Orchestrator::new(quick_config(3, 1), registry_of(&[passing_kind("A")]));
        let verdict = orchestrator.execute().unwrap();

        let seeds: Vec<u64> = verdict.workers.iter().map(|w| w.seed).collect();
        assert_eq!(seeds, derive_worker_seeds(77, 3));
    }

    #[test]
    fn test_failing_units_fail_the_run() {
        let orchestrator =
            Orchestrator::new(quick_config(2, 30), registry_of(&[failing_kind("F")]));
        let verdict = orchestrator.execute().unwrap();

        assert!(verdict.is_failed());
        assert_eq!(verdict.failed_count(), 2);
        // Monitoring stops as soon as a failure shows up, long before the budget.
        assert!(verdict.elapsed < Duration::from_secs(10));
        for worker in &verdict.workers {
            let failure = worker.failure.as_ref().unwrap();
            assert_eq!(failure.test.kind(), "Mock");
        }

        assert!(matches!(
            verdict.into_result(),
            Err(StressError::WorkersFailed { failed: 2, total: 2 })
        ));
    }

    #[test]
    fn test_ignored_failures_pass_the_run() {
        let config = StressConfig {
            ignore_test_failures: true,
            ..quick_config(2, 1)
        };
        let orchestrator =
            Orchestrator::new(config, registry_of(&[passing_kind("A"), failing_kind("F")]));
        let verdict = orchestrator.run().unwrap();
        assert!(!verdict.is_failed());
    }

    #[test]
    fn test_cancelled_shutdown_ends_the_run_early() {
        let token = CancellationToken::new();
        token.cancel();
        let orchestrator =
            Orchestrator::new(quick_config(2, 60), registry_of(&[passing_kind("A")]))
                .with_shutdown(token);

        let verdict = orchestrator.run().unwrap();
        assert!(verdict.elapsed < Duration::from_secs(10));
        assert!(!verdict.is_failed());
    }

    #[test]
    fn test_empty_matrix_is_an_error() {
        let orchestrator = Orchestrator::new(
            quick_config(1, 1),
            registry_of(&[passing_kind("R").redefine_focused()]),
        );
        assert!(matches!(orchestrator.run(), Err(StressError::EmptyMatrix)));
    }

    #[test]
    fn test_setup_failure_aborts_before_spawning() {
        let orchestrator = Orchestrator::new(
            quick_config(1, 1),
            registry_of(&[passing_kind("A"), broken_kind("Broken")]),
        );
        assert!(matches!(
            orchestrator.run(),
            Err(StressError::Setup { .. })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let orchestrator =
            Orchestrator::new(quick_config(0, 1), registry_of(&[passing_kind("A")]));
        assert!(matches!(
            orchestrator.run(),
            Err(StressError::InvalidConfig(_))
        ));
    }
}
