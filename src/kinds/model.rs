//! A tiny class/interface model with default-method resolution.
//!
//! 一个支持默认方法解析的小型类/接口模型。

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// First class-file version that allows method bodies in interfaces.
pub const DEFAULT_METHODS_VERSION: u16 = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("AbstractMethodError: {0}")]
    AbstractMethod(&'static str),
    #[error("IncompatibleClassChangeError: {0}")]
    IncompatibleClassChange(&'static str),
    #[error("NoSuchMethodError: {0}")]
    NoSuchMethod(&'static str),
    #[error("ClassFormatError: {0}")]
    ClassFormat(&'static str),
    #[error("NoClassDefFoundError: {0}")]
    NoClassDef(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Abstract,
    Const(i64),
    /// `Iface.super.name() + add`
    SuperCall { iface: &'static str, add: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDef {
    pub name: &'static str,
    pub body: Body,
    pub is_static: bool,
}

impl MethodDef {
    pub fn new(name: &'static str, body: Body) -> Self {
        Self {
            name,
            body,
            is_static: false,
        }
    }

    pub fn abstract_(name: &'static str) -> Self {
        Self::new(name, Body::Abstract)
    }

    pub fn static_(name: &'static str, value: i64) -> Self {
        Self {
            name,
            body: Body::Const(value),
            is_static: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: &'static str,
    pub is_interface: bool,
    pub superclass: Option<&'static str>,
    pub interfaces: Vec<&'static str>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn class(name: &'static str) -> Self {
        Self {
            name,
            is_interface: false,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn interface(name: &'static str) -> Self {
        Self {
            is_interface: true,
            ..Self::class(name)
        }
    }

    pub fn extends(mut self, superclass: &'static str) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, iface: &'static str) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    fn declared(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A loaded set of classes for one class-file version.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    version: u16,
    classes: Vec<ClassDef>,
    /// Bumped by every redefinition.
    epoch: u32,
}

impl Hierarchy {
    pub fn new(version: u16) -> Self {
        Self {
            version,
            classes: Vec::new(),
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Loads `class`. Interfaces may only carry bodies or static methods from
    /// version 52 on; supertypes must already be loaded.
    pub fn define(&mut self, class: ClassDef) -> Result<(), ResolutionError> {
        if class.is_interface && self.version < DEFAULT_METHODS_VERSION {
            if let Some(m) = class
                .methods
                .iter()
                .find(|m| m.is_static || m.body != Body::Abstract)
            {
                return Err(ResolutionError::ClassFormat(m.name));
            }
        }
        for dep in class.superclass.iter().chain(class.interfaces.iter()) {
            if self.class(dep).is_none() {
                return Err(ResolutionError::NoClassDef(*dep));
            }
        }
        self.classes.push(class);
        Ok(())
    }

    /// Replaces the body of `class.method`, as a class redefinition would.
    pub fn redefine(
        &mut self,
        class: &str,
        method: &'static str,
        body: Body,
    ) -> Result<(), ResolutionError> {
        let def = self
            .classes
            .iter_mut()
            .find(|c| c.name == class)
            .and_then(|c| c.methods.iter_mut().find(|m| m.name == method))
            .ok_or(ResolutionError::NoSuchMethod(method))?;
        def.body = body;
        self.epoch += 1;
        Ok(())
    }

    /// Redefinition with identical class bytes.
    pub fn retransform(&mut self) {
        self.epoch += 1;
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Virtual method selection on an instance of `receiver`.
    /// 在 `receiver` 实例上进行虚方法选择。
    pub fn select(&self, receiver: &str, name: &'static str) -> Result<MethodDef, ResolutionError> {
        let mut current = self.class(receiver);
        let mut chain = Vec::new();
        while let Some(class) = current {
            if let Some(m) = class.declared(name).filter(|m| !m.is_static) {
                return match m.body {
                    Body::Abstract => Err(ResolutionError::AbstractMethod(name)),
                    _ => Ok(*m),
                };
            }
            chain.push(class);
            current = class.superclass.and_then(|s| self.class(s));
        }
        if chain.is_empty() {
            return Err(ResolutionError::NoClassDef("receiver"));
        }

        let mut ifaces = Vec::new();
        for class in &chain {
            self.collect_interfaces(class, &mut ifaces);
        }
        let candidates: Vec<(&ClassDef, &MethodDef)> = ifaces
            .iter()
            .filter_map(|i| i.declared(name).filter(|m| !m.is_static).map(|m| (*i, m)))
            .collect();
        let maximal: Vec<&(&ClassDef, &MethodDef)> = candidates
            .iter()
            .filter(|(owner, _)| {
                !candidates
                    .iter()
                    .any(|(other, _)| other.name != owner.name && self.is_subinterface(other, owner.name))
            })
            .collect();

        let concrete: Vec<_> = maximal
            .iter()
            .filter(|(_, m)| m.body != Body::Abstract)
            .collect();
        match concrete.as_slice() {
            [(_, m)] => Ok(**m),
            [] if maximal.is_empty() => Err(ResolutionError::NoSuchMethod(name)),
            [] => Err(ResolutionError::AbstractMethod(name)),
            _ => Err(ResolutionError::IncompatibleClassChange(name)),
        }
    }

    pub fn invoke_virtual(&self, receiver: &str, name: &'static str) -> Result<i64, ResolutionError> {
        let m = self.select(receiver, name)?;
        self.invoke(&m)
    }

    /// Resolution for `invokestatic owner.name()`; static methods are never inherited.
    pub fn resolve_static(&self, owner: &str, name: &'static str) -> Result<MethodDef, ResolutionError> {
        let class = self.class(owner).ok_or(ResolutionError::NoClassDef("owner"))?;
        match class.declared(name) {
            Some(m) if m.is_static => Ok(*m),
            Some(_) => Err(ResolutionError::IncompatibleClassChange(name)),
            None => Err(ResolutionError::NoSuchMethod(name)),
        }
    }

    pub fn invoke_static(&self, owner: &str, name: &'static str) -> Result<i64, ResolutionError> {
        let m = self.resolve_static(owner, name)?;
        self.invoke(&m)
    }

    /// Evaluates an already selected method.
    pub fn invoke(&self, m: &MethodDef) -> Result<i64, ResolutionError> {
        match m.body {
            Body::Abstract => Err(ResolutionError::AbstractMethod(m.name)),
            Body::Const(v) => Ok(v),
            Body::SuperCall { iface, add } => {
                let target = self
                    .class(iface)
                    .and_then(|i| i.declared(m.name))
                    .ok_or(ResolutionError::NoSuchMethod(m.name))?;
                Ok(self.invoke(target)? + add)
            }
        }
    }

    fn collect_interfaces<'a>(&'a self, class: &'a ClassDef, out: &mut Vec<&'a ClassDef>) {
        for name in &class.interfaces {
            if let Some(iface) = self.class(name) {
                if !out.iter().any(|c| c.name == iface.name) {
                    out.push(iface);
                    self.collect_interfaces(iface, out);
                }
            }
        }
    }

    fn is_subinterface(&self, iface: &ClassDef, ancestor: &str) -> bool {
        iface.interfaces.iter().any(|name| {
            *name == ancestor
                || self
                    .class(name)
                    .is_some_and(|parent| self.is_subinterface(parent, ancestor))
        })
    }
}

/// Interned method names shared by every reflective lookup in the process.
/// Populated lazily on first reflective use.
static REFLECTION_NAMES: Lazy<RwLock<HashMap<&'static str, usize>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Reflective lookup: resolves the method object for `receiver.name`, interning
/// the name in the process-wide table.
///
/// With `search_statics` the lookup also returns static interface methods
/// reachable from `receiver`, which real virtual selection never does.
pub fn reflective_lookup(
    hierarchy: &Hierarchy,
    receiver: &str,
    name: &'static str,
    search_statics: bool,
) -> Result<MethodDef, ResolutionError> {
    intern(name);
    match hierarchy.select(receiver, name) {
        Err(ResolutionError::NoSuchMethod(_)) if search_statics => {
            let class = hierarchy
                .class(receiver)
                .ok_or(ResolutionError::NoClassDef("receiver"))?;
            let mut ifaces = Vec::new();
            hierarchy.collect_interfaces(class, &mut ifaces);
            ifaces
                .iter()
                .find_map(|i| i.declared(name).filter(|m| m.is_static).copied())
                .ok_or(ResolutionError::NoSuchMethod(name))
        }
        other => other,
    }
}

fn intern(name: &'static str) -> usize {
    if let Some(id) = REFLECTION_NAMES.read().get(name) {
        return *id;
    }
    let mut names = REFLECTION_NAMES.write();
    let next = names.len();
    *names.entry(name).or_insert(next)
}

/// Number of distinct names interned so far.
pub fn interned_names() -> usize {
    REFLECTION_NAMES.read().len()
}
