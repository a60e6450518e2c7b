//! # Time Budget Unit Tests / 时间预算单元测试

use matrix_stress::core::budget::TimeBudget;
use std::thread;
use std::time::Duration;

#[cfg(test)]
mod budget_tests {
    use super::*;

    #[test]
    fn test_unstarted_budget_does_not_run() {
        let budget = TimeBudget::new(Duration::from_secs(10));
        assert!(!budget.continue_execution());
        assert_eq!(budget.time_left(), Duration::from_secs(10));
        assert_eq!(budget.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_started_budget_runs_until_spent() {
        let mut budget = TimeBudget::new(Duration::from_millis(100));
        budget.start(Duration::ZERO);
        assert!(budget.continue_execution());
        assert!(budget.time_left() <= Duration::from_millis(100));

        thread::sleep(Duration::from_millis(150));
        assert!(!budget.continue_execution());
        assert_eq!(budget.time_left(), Duration::ZERO);
    }

    #[test]
    fn test_offset_is_charged_up_front() {
        let mut budget = TimeBudget::new(Duration::from_secs(10));
        budget.start(Duration::from_secs(4));
        assert!(budget.time_left() <= Duration::from_secs(6));
        assert!(budget.elapsed() >= Duration::from_secs(4));

        let mut spent = TimeBudget::new(Duration::from_secs(1));
        spent.start(Duration::from_secs(2));
        assert!(!spent.continue_execution());
    }

    #[test]
    fn test_finish_freezes_elapsed_time() {
        let mut budget = TimeBudget::new(Duration::from_secs(10));
        budget.start(Duration::ZERO);
        thread::sleep(Duration::from_millis(20));
        let total = budget.finish();

        assert!(total >= Duration::from_millis(20));
        assert!(!budget.continue_execution());
        thread::sleep(Duration::from_millis(20));
        assert_eq!(budget.elapsed(), total);
    }
}
