//! # Test Kind Registry / 测试类型注册表
//!
//! An explicit, static table of the test kinds a run samples from. Each entry
//! knows how to instantiate a [`TestUnit`] for a given [`UnitConfig`].
//!
//! 一个显式的静态测试类型表。每个条目都知道如何根据 `UnitConfig` 实例化 `TestUnit`。

use crate::core::error::StressError;
use crate::core::models::{TestUnit, UnitConfig};
use std::fmt;

/// Constructor for the units of one test kind. Returns a reason on failure.
pub type UnitFactory = fn(UnitConfig) -> Result<Box<dyn TestUnit>, String>;

/// One registered test kind.
/// 一个已注册的测试类型。
#[derive(Clone, Copy)]
pub struct TestKind {
    pub name: &'static str,
    /// Kinds that only make sense with class redefinition active.
    /// 仅在启用类重定义时才有意义的测试类型。
    pub redefine_focused: bool,
    factory: UnitFactory,
}

impl TestKind {
    pub const fn new(name: &'static str, factory: UnitFactory) -> Self {
        Self {
            name,
            redefine_focused: false,
            factory,
        }
    }

    pub const fn redefine_focused(mut self) -> Self {
        self.redefine_focused = true;
        self
    }

    /// Creates a unit after validating `config`. Any failure is a fatal setup error.
    /// 在验证 `config` 之后创建单元。任何失败都是致命的设置错误。
    pub fn instantiate(&self, config: UnitConfig) -> Result<Box<dyn TestUnit>, StressError> {
        config
            .validate()
            .map_err(|reason| StressError::setup(self.name, reason))?;
        (self.factory)(config).map_err(|reason| StressError::setup(self.name, reason))
    }
}

impl fmt::Debug for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestKind")
            .field("name", &self.name)
            .field("redefine_focused", &self.redefine_focused)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of test kinds. Iteration order is registration order.
/// 测试类型的有序集合。迭代顺序即注册顺序。
#[derive(Debug, Clone, Default)]
pub struct Registry {
    kinds: Vec<TestKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: TestKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn kinds(&self) -> &[TestKind] {
        &self.kinds
    }

    pub fn find(&self, name: &str) -> Option<&TestKind> {
        self.kinds.iter().find(|k| k.name == name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FromIterator<TestKind> for Registry {
    fn from_iter<I: IntoIterator<Item = TestKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}
