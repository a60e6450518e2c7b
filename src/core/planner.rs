//! # Matrix Planner Module / 矩阵规划模块
//!
//! Expands the configuration dimensions into the full, ordered list of test
//! units. Exclusion rules are evaluated per combination *before* a unit is
//! instantiated, so excluded tuples never construct anything.
//!
//! 将配置维度展开为完整且有序的测试单元列表。
//! 排除规则在实例化单元之前针对每个组合进行评估，因此被排除的元组不会构造任何东西。

use std::sync::Arc;

use crate::core::error::StressError;
use crate::core::models::{
    ACC_STRICT, ACC_SYNCHRONIZED, ExecutionMode, MAX_CLASS_VERSION, MIN_CLASS_VERSION, TestUnit,
    UnitConfig,
};
use crate::core::registry::{Registry, TestKind};

/// The one declared mode no generator supports. It is skipped regardless of
/// any other setting.
pub const UNSUPPORTED_MODE: &str = "REDEFINITION";

/// Default lower bound of the version dimension.
pub const DEFAULT_MIN_VERSION: u16 = 49;

/// Inputs of the matrix builder.
/// 矩阵构建器的输入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixOptions {
    /// Lowest class-file version; the dimension runs up to `MAX_CLASS_VERSION`.
    pub min_version: u16,
    /// Adds `true` to the redefine dimension.
    pub redefine: bool,
    /// Declared execution modes, before the unsupported one is dropped.
    pub modes: Vec<ExecutionMode>,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            min_version: DEFAULT_MIN_VERSION,
            redefine: false,
            modes: ExecutionMode::ALL.to_vec(),
        }
    }
}

/// A named, finite, ordered axis of the matrix.
/// 矩阵中一个具名的、有限的、有序的维度。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension<T> {
    pub name: &'static str,
    pub values: Vec<T>,
}

impl<T: Copy> Dimension<T> {
    pub fn new(name: &'static str, values: Vec<T>) -> Self {
        Self { name, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().copied()
    }
}

/// One tuple of dimension values together with the test kind.
/// 一个维度值元组及其测试类型。
#[derive(Debug, Clone, Copy)]
pub struct Combination<'a> {
    pub kind: &'a TestKind,
    pub mode: ExecutionMode,
    pub version: u16,
    pub flags: u16,
    pub redefine: bool,
}

impl Combination<'_> {
    pub fn config(&self) -> UnitConfig {
        UnitConfig::for_matrix(self.mode, self.version, self.flags, self.redefine)
    }
}

/// A predicate that removes combinations from the matrix.
/// 从矩阵中移除组合的谓词。
#[derive(Debug, Clone, Copy)]
pub struct ExclusionRule {
    pub name: &'static str,
    pub excludes: fn(&Combination<'_>) -> bool,
}

/// Built-in rules, evaluated in this order.
pub const DEFAULT_EXCLUSIONS: [ExclusionRule; 2] = [
    ExclusionRule {
        name: "redefine-kind-with-reflection",
        excludes: redefine_kind_with_reflection,
    },
    ExclusionRule {
        name: "redefine-kind-without-redefinition",
        excludes: redefine_kind_without_redefinition,
    },
];

// Redefinition cannot be expressed through reflective invocation.
fn redefine_kind_with_reflection(c: &Combination<'_>) -> bool {
    c.kind.redefine_focused && c.mode.is_reflection_based()
}

fn redefine_kind_without_redefinition(c: &Combination<'_>) -> bool {
    c.kind.redefine_focused && !c.redefine
}

/// The dimensions and rules a matrix is built from.
/// 构建矩阵所依据的维度和规则。
#[derive(Debug, Clone)]
pub struct MatrixPlan<'r> {
    registry: &'r Registry,
    pub modes: Dimension<ExecutionMode>,
    pub versions: Dimension<u16>,
    pub flags: Dimension<u16>,
    pub redefine: Dimension<bool>,
    rules: Vec<ExclusionRule>,
}

impl<'r> MatrixPlan<'r> {
    pub fn new(registry: &'r Registry, options: &MatrixOptions) -> Result<Self, StressError> {
        if !(MIN_CLASS_VERSION..=MAX_CLASS_VERSION).contains(&options.min_version) {
            return Err(StressError::InvalidConfig(format!(
                "minimum class file version {} must be within {}..={}",
                options.min_version, MIN_CLASS_VERSION, MAX_CLASS_VERSION
            )));
        }

        let versions = (options.min_version..=MAX_CLASS_VERSION).collect();
        let flags = vec![0, ACC_STRICT, ACC_SYNCHRONIZED, ACC_STRICT | ACC_SYNCHRONIZED];
        let redefine = if options.redefine {
            vec![true, false]
        } else {
            vec![false]
        };
        let modes = options
            .modes
            .iter()
            .copied()
            .filter(|m| m.as_str() != UNSUPPORTED_MODE)
            .collect();

        Ok(Self {
            registry,
            modes: Dimension::new("mode", modes),
            versions: Dimension::new("version", versions),
            flags: Dimension::new("flags", flags),
            redefine: Dimension::new("redefine", redefine),
            rules: DEFAULT_EXCLUSIONS.to_vec(),
        })
    }

    /// Replaces the exclusion rules.
    pub fn with_rules(mut self, rules: Vec<ExclusionRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Size of the full Cartesian product, before exclusions.
    /// 排除前完整笛卡尔积的大小。
    pub fn upper_bound(&self) -> usize {
        self.registry.len()
            * self.modes.len()
            * self.versions.len()
            * self.flags.len()
            * self.redefine.len()
    }

    /// Name of the first rule that excludes `combination`, if any.
    pub fn excluded_by(&self, combination: &Combination<'_>) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| (rule.excludes)(combination))
            .map(|rule| rule.name)
    }

    /// All surviving combinations in build order: kind, mode, version, flags, redefine.
    /// 按构建顺序列出所有保留的组合：类型、模式、版本、标志、重定义。
    pub fn combinations(&self) -> Vec<Combination<'r>> {
        let mut out = Vec::with_capacity(self.upper_bound());
        for kind in self.registry.kinds() {
            for mode in self.modes.iter() {
                for version in self.versions.iter() {
                    for flags in self.flags.iter() {
                        for redefine in self.redefine.iter() {
                            let combination = Combination {
                                kind,
                                mode,
                                version,
                                flags,
                                redefine,
                            };
                            if self.excluded_by(&combination).is_none() {
                                out.push(combination);
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// Instantiates one unit per surviving combination. The first construction
    /// failure aborts the whole build.
    ///
    /// 为每个保留的组合实例化一个单元。第一次构造失败即中止整个构建。
    pub fn build(&self) -> Result<TestMatrix, StressError> {
        let units = self
            .combinations()
            .into_iter()
            .map(|c| {
                c.kind
                    .instantiate(c.config())
                    .map(Arc::<dyn TestUnit>::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TestMatrix { units })
    }
}

/// Shorthand for `MatrixPlan::new(..)?.build()`.
pub fn build_matrix(registry: &Registry, options: &MatrixOptions) -> Result<TestMatrix, StressError> {
    MatrixPlan::new(registry, options)?.build()
}

/// The immutable list of units shared by every worker.
/// 所有工作线程共享的不可变单元列表。
#[derive(Default, Clone)]
pub struct TestMatrix {
    units: Vec<Arc<dyn TestUnit>>,
}

impl TestMatrix {
    pub fn from_units(units: Vec<Arc<dyn TestUnit>>) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn TestUnit>> {
        self.units.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TestUnit>> {
        self.units.iter()
    }
}

impl std::fmt::Debug for TestMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestMatrix")
            .field("len", &self.units.len())
            .finish()
    }
}
