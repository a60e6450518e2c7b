//! # Built-in Test Kinds / 内置测试类型
//!
//! Synthetic test kinds exercising default-method resolution over a small
//! class model. They are what the `matrix-stress` binary samples from; the
//! harness itself only sees them through [`TestUnit`].
//!
//! 在小型类模型上验证默认方法解析的合成测试类型。
//! 它们是 `matrix-stress` 可执行文件的采样对象；框架本身只通过 `TestUnit` 看到它们。

pub mod model;
pub mod scenario;

use crate::core::models::{ExecutionMode, TestUnit, UnitConfig};
use crate::core::registry::{Registry, TestKind};
use model::{Body, ClassDef, MethodDef, ResolutionError};
use scenario::{Check, Redefinition, Scenario, ScenarioUnit, no_known_failures};

/// Every built-in kind, in registration order.
/// 所有内置类型，按注册顺序排列。
pub fn registry() -> Registry {
    Registry::new()
        .with(TestKind::new(BASIC_DEFAULT.kind, |c| unit(&BASIC_DEFAULT, c)))
        .with(TestKind::new(CONFLICTING_DEFAULTS.kind, |c| {
            unit(&CONFLICTING_DEFAULTS, c)
        }))
        .with(TestKind::new(SUPER_CALL.kind, |c| unit(&SUPER_CALL, c)))
        .with(TestKind::new(STATIC_INTERFACE.kind, |c| {
            unit(&STATIC_INTERFACE, c)
        }))
        .with(TestKind::new(REDEFINE.kind, |c| unit(&REDEFINE, c)).redefine_focused())
}

fn unit(scenario: &'static Scenario, config: UnitConfig) -> Result<Box<dyn TestUnit>, String> {
    Ok(Box::new(ScenarioUnit::new(scenario, config)))
}

pub static BASIC_DEFAULT: Scenario = Scenario {
    kind: "BasicDefault",
    classes: basic_default_classes,
    checks: &[
        Check::virtual_("C", "m", Ok(1)),
        Check::virtual_("C", "n", Err(ResolutionError::AbstractMethod("n"))),
    ],
    redefinition: None,
    known_failure: no_known_failures,
};

fn basic_default_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::interface("I").method(MethodDef::new("m", Body::Const(1))),
        ClassDef::interface("J").method(MethodDef::abstract_("n")),
        ClassDef::class("C").implements("I").implements("J"),
    ]
}

pub static CONFLICTING_DEFAULTS: Scenario = Scenario {
    kind: "ConflictingDefaults",
    classes: conflicting_defaults_classes,
    checks: &[
        Check::virtual_("C", "m", Err(ResolutionError::IncompatibleClassChange("m"))),
        Check::virtual_("D", "m", Ok(3)),
    ],
    redefinition: None,
    known_failure: no_known_failures,
};

fn conflicting_defaults_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::interface("I").method(MethodDef::new("m", Body::Const(1))),
        ClassDef::interface("J").method(MethodDef::new("m", Body::Const(2))),
        ClassDef::class("C").implements("I").implements("J"),
        ClassDef::class("D")
            .implements("I")
            .implements("J")
            .method(MethodDef::new("m", Body::Const(3))),
    ]
}

pub static SUPER_CALL: Scenario = Scenario {
    kind: "SuperCall",
    classes: super_call_classes,
    checks: &[
        Check::virtual_("C", "m", Ok(11)),
        Check::virtual_("D", "m", Ok(5)),
        Check::virtual_("E", "m", Ok(5)),
    ],
    redefinition: None,
    known_failure: no_known_failures,
};

fn super_call_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::interface("I").method(MethodDef::new("m", Body::Const(1))),
        ClassDef::interface("K")
            .implements("I")
            .method(MethodDef::new("m", Body::Const(5))),
        ClassDef::class("C").implements("I").method(MethodDef::new(
            "m",
            Body::SuperCall { iface: "I", add: 10 },
        )),
        ClassDef::class("D").implements("I").implements("K"),
        ClassDef::class("E").extends("D"),
    ]
}

pub static STATIC_INTERFACE: Scenario = Scenario {
    kind: "StaticInterface",
    classes: static_interface_classes,
    checks: &[
        Check::static_("I", "s", Ok(7)),
        Check::virtual_("C", "s", Err(ResolutionError::NoSuchMethod("s"))),
    ],
    redefinition: None,
    known_failure: static_interface_known_failure,
};

fn static_interface_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::interface("I").method(MethodDef::static_("s", 7)),
        ClassDef::class("C").implements("I"),
    ]
}

// Reflective invocation with boxed arguments finds static interface methods
// through the instance receiver.
fn static_interface_known_failure(config: &UnitConfig) -> Option<&'static str> {
    (config.mode == ExecutionMode::InvokeWithArgs)
        .then_some("reflective invocation resolves static interface methods on instances")
}

pub static REDEFINE: Scenario = Scenario {
    kind: "Redefine",
    classes: redefine_classes,
    checks: &[Check::virtual_("C", "m", Ok(1))],
    redefinition: Some(Redefinition {
        class: "I",
        method: "m",
        body: Body::Const(2),
        checks: &[Check::virtual_("C", "m", Ok(2))],
    }),
    known_failure: no_known_failures,
};

fn redefine_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::interface("I").method(MethodDef::new("m", Body::Const(1))),
        ClassDef::class("C").implements("I"),
    ]
}
