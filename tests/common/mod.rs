// Shared test helpers for integration tests
#![allow(dead_code)]

use matrix_stress::core::models::{TestUnit, UnitConfig, UnitError};
use matrix_stress::core::planner::TestMatrix;
use matrix_stress::core::registry::{Registry, TestKind};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// How a [`MockUnit`] behaves once it has been run `after` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Pass,
    /// Returns an assertion error from the `after`-th run onwards.
    FailAfter(u64),
    /// Returns normally but reports itself failed.
    ReportAfter(u64),
    PanicAfter(u64),
}

/// A configurable test unit that counts its runs.
pub struct MockUnit {
    pub id: usize,
    pub config: UnitConfig,
    behavior: Behavior,
    runs: AtomicU64,
    reported: AtomicBool,
    delay: Duration,
    log: Option<Arc<Mutex<Vec<usize>>>>,
}

impl MockUnit {
    pub fn new(id: usize, behavior: Behavior) -> Self {
        Self {
            id,
            config: UnitConfig::default(),
            behavior,
            runs: AtomicU64::new(0),
            reported: AtomicBool::new(false),
            delay: Duration::ZERO,
            log: None,
        }
    }

    pub fn with_config(mut self, config: UnitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Appends `id` to `log` on every run.
    pub fn with_log(mut self, log: Arc<Mutex<Vec<usize>>>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }
}

impl fmt::Display for MockUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mock#{}[{}]", self.id, self.config)
    }
}

impl TestUnit for MockUnit {
    fn kind(&self) -> &'static str {
        "Mock"
    }

    fn config(&self) -> &UnitConfig {
        &self.config
    }

    fn run(&self) -> Result<(), UnitError> {
        if let Some(log) = &self.log {
            log.lock().push(self.id);
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        match self.behavior {
            Behavior::Pass => Ok(()),
            Behavior::FailAfter(n) if run >= n => {
                Err(UnitError::Assertion(format!("mock #{} failed on run {run}", self.id)))
            }
            Behavior::ReportAfter(n) if run >= n => {
                self.reported.store(true, Ordering::SeqCst);
                Ok(())
            }
            Behavior::PanicAfter(n) if run >= n => panic!("mock #{} panicked", self.id),
            _ => Ok(()),
        }
    }

    fn is_failed(&self) -> bool {
        self.reported.load(Ordering::SeqCst)
    }
}

/// Wraps the given units in a matrix, keeping typed handles for inspection.
pub fn matrix_of(units: Vec<Arc<MockUnit>>) -> Arc<TestMatrix> {
    Arc::new(TestMatrix::from_units(
        units
            .into_iter()
            .map(|u| u as Arc<dyn TestUnit>)
            .collect(),
    ))
}

pub fn passing_units(count: usize) -> Vec<Arc<MockUnit>> {
    (0..count)
        .map(|id| Arc::new(MockUnit::new(id, Behavior::Pass)))
        .collect()
}

fn passing_factory(config: UnitConfig) -> Result<Box<dyn TestUnit>, String> {
    Ok(Box::new(MockUnit::new(0, Behavior::Pass).with_config(config)))
}

fn failing_factory(config: UnitConfig) -> Result<Box<dyn TestUnit>, String> {
    Ok(Box::new(MockUnit::new(0, Behavior::FailAfter(1)).with_config(config)))
}

fn panicking_factory(config: UnitConfig) -> Result<Box<dyn TestUnit>, String> {
    Ok(Box::new(MockUnit::new(0, Behavior::PanicAfter(1)).with_config(config)))
}

fn broken_factory(_: UnitConfig) -> Result<Box<dyn TestUnit>, String> {
    Err("resource unavailable".to_string())
}

pub fn passing_kind(name: &'static str) -> TestKind {
    TestKind::new(name, passing_factory)
}

pub fn failing_kind(name: &'static str) -> TestKind {
    TestKind::new(name, failing_factory)
}

pub fn panicking_kind(name: &'static str) -> TestKind {
    TestKind::new(name, panicking_factory)
}

pub fn broken_kind(name: &'static str) -> TestKind {
    TestKind::new(name, broken_factory)
}

pub fn registry_of(kinds: &[TestKind]) -> Registry {
    kinds.iter().copied().collect()
}
