//! Scenario-driven test units.
//!
//! A [`Scenario`] describes a class hierarchy, the calls to make against it and
//! the expected outcomes. A [`ScenarioUnit`] runs one scenario under one
//! [`UnitConfig`], routing every call through the invocation path selected by
//! the execution mode.
//!
//! 场景驱动的测试单元。`Scenario` 描述类层次结构、要执行的调用以及预期结果；
//! `ScenarioUnit` 在某个 `UnitConfig` 下运行一个场景，并按执行模式选择调用路径。

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::core::models::{ACC_SYNCHRONIZED, ExecutionMode, TestUnit, UnitConfig, UnitError};
use crate::kinds::model::{
    Body, ClassDef, DEFAULT_METHODS_VERSION, Hierarchy, MethodDef, ResolutionError,
    reflective_lookup,
};

/// Call sites linked through the `INDY` path, process-wide.
static INDY_BOOTSTRAPS: AtomicU64 = AtomicU64::new(0);

pub fn indy_bootstraps() -> u64 {
    INDY_BOOTSTRAPS.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Virtual {
        receiver: &'static str,
        method: &'static str,
    },
    Static {
        owner: &'static str,
        method: &'static str,
    },
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::Virtual { receiver, method } => write!(f, "new {receiver}().{method}()"),
            Call::Static { owner, method } => write!(f, "{owner}.{method}()"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub call: Call,
    pub expect: Result<i64, ResolutionError>,
}

impl Check {
    pub const fn virtual_(receiver: &'static str, method: &'static str, expect: Result<i64, ResolutionError>) -> Self {
        Self {
            call: Call::Virtual { receiver, method },
            expect,
        }
    }

    pub const fn static_(owner: &'static str, method: &'static str, expect: Result<i64, ResolutionError>) -> Self {
        Self {
            call: Call::Static { owner, method },
            expect,
        }
    }
}

/// A method body swap applied when redefinition is active, and what must hold afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Redefinition {
    pub class: &'static str,
    pub method: &'static str,
    pub body: Body,
    pub checks: &'static [Check],
}

#[derive(Debug)]
pub struct Scenario {
    pub kind: &'static str,
    pub classes: fn() -> Vec<ClassDef>,
    pub checks: &'static [Check],
    pub redefinition: Option<Redefinition>,
    /// Reason the scenario is known to fail under a configuration, if it is.
    pub known_failure: fn(&UnitConfig) -> Option<&'static str>,
}

pub fn no_known_failures(_: &UnitConfig) -> Option<&'static str> {
    None
}

/// One configured instance of a scenario.
/// 场景的一个已配置实例。
pub struct ScenarioUnit {
    scenario: &'static Scenario,
    config: UnitConfig,
    failed: AtomicBool,
    /// Held around every call when `ACC_SYNCHRONIZED` is set.
    monitor: Mutex<()>,
}

impl ScenarioUnit {
    pub fn new(scenario: &'static Scenario, config: UnitConfig) -> Self {
        Self {
            scenario,
            config,
            failed: AtomicBool::new(false),
            monitor: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Hierarchy, ResolutionError> {
        let mut hierarchy = Hierarchy::new(self.config.version);
        for class in (self.scenario.classes)() {
            hierarchy.define(class)?;
        }
        Ok(hierarchy)
    }

    fn crash(&self, error: ResolutionError) -> Result<(), UnitError> {
        if self.config.ignore_crashes {
            Ok(())
        } else {
            Err(UnitError::Environment(format!("{self}: {error}")))
        }
    }

    fn invoke(&self, hierarchy: &Hierarchy, call: Call) -> Result<i64, ResolutionError> {
        let _guard = (self.config.flags & ACC_SYNCHRONIZED != 0).then(|| self.monitor.lock());
        match self.config.mode {
            ExecutionMode::Direct | ExecutionMode::Redefinition => match call {
                Call::Virtual { receiver, method } => hierarchy.invoke_virtual(receiver, method),
                Call::Static { owner, method } => hierarchy.invoke_static(owner, method),
            },
            ExecutionMode::Reflection | ExecutionMode::InvokeWithArgs => {
                let target = match call {
                    Call::Virtual { receiver, method } => reflective_lookup(
                        hierarchy,
                        receiver,
                        method,
                        self.config.mode == ExecutionMode::InvokeWithArgs,
                    )?,
                    Call::Static { owner, method } => hierarchy.resolve_static(owner, method)?,
                };
                hierarchy.invoke(&target)
            }
            ExecutionMode::InvokeExact => {
                let handle = bind(hierarchy, call)?;
                handle()
            }
            ExecutionMode::InvokeGeneric => {
                // Generic invocation narrows through the boxed `int` return type.
                let handle = bind(hierarchy, call)?;
                let value = handle()?;
                Ok(i64::from(i32::try_from(value).unwrap_or(i32::MAX)))
            }
            ExecutionMode::Indy => {
                INDY_BOOTSTRAPS.fetch_add(1, Ordering::Relaxed);
                let handle = bind(hierarchy, call)?;
                handle()
            }
        }
    }

    fn verify(&self, hierarchy: &Hierarchy, checks: &[Check]) -> Result<(), UnitError> {
        for check in checks {
            let actual = self.invoke(hierarchy, check.call);
            if actual == check.expect {
                if !self.config.silent {
                    println!("  {} {} = {:?}", self.scenario.kind, check.call, actual);
                }
                continue;
            }

            let message = format!(
                "{self}: {} expected {:?}, got {:?}",
                check.call, check.expect, actual
            );
            if !self.config.silent {
                println!("  FAILED {message}");
            }
            if self.config.fail_fast {
                return Err(match (self.scenario.known_failure)(&self.config) {
                    Some(reason) => UnitError::KnownFailure(format!("{reason}: {message}")),
                    None => UnitError::Assertion(message),
                });
            }
            self.failed.store(true, Ordering::Release);
        }
        Ok(())
    }
}

/// Resolves `call` once and returns a handle that evaluates the resolved target.
fn bind(
    hierarchy: &Hierarchy,
    call: Call,
) -> Result<impl Fn() -> Result<i64, ResolutionError> + '_, ResolutionError> {
    let target: MethodDef = match call {
        Call::Virtual { receiver, method } => hierarchy.select(receiver, method)?,
        Call::Static { owner, method } => hierarchy.resolve_static(owner, method)?,
    };
    Ok(move || hierarchy.invoke(&target))
}

impl TestUnit for ScenarioUnit {
    fn kind(&self) -> &'static str {
        self.scenario.kind
    }

    fn config(&self) -> &UnitConfig {
        &self.config
    }

    fn run(&self) -> Result<(), UnitError> {
        if self.config.ignore_known_failures
            && (self.scenario.known_failure)(&self.config).is_some()
        {
            return Ok(());
        }

        let mut hierarchy = match self.load() {
            Ok(hierarchy) => hierarchy,
            // Interface method bodies are rejected before version 52.
            Err(ResolutionError::ClassFormat(_))
                if self.config.version < DEFAULT_METHODS_VERSION =>
            {
                return Ok(());
            }
            Err(e) => return self.crash(e),
        };
        self.verify(&hierarchy, self.scenario.checks)?;

        if self.config.redefine {
            match self.scenario.redefinition {
                Some(r) => {
                    if let Err(e) = hierarchy.redefine(r.class, r.method, r.body) {
                        return self.crash(e);
                    }
                    self.verify(&hierarchy, r.checks)?;
                }
                None => {
                    hierarchy.retransform();
                    self.verify(&hierarchy, self.scenario.checks)?;
                }
            }
        }
        Ok(())
    }

    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl fmt::Display for ScenarioUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.scenario.kind, self.config)
    }
}
