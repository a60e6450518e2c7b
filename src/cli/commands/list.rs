//! # List Command Module / 列表命令模块
//!
//! Prints every unit the matrix builder would create, without instantiating
//! or running any of them.
//!
//! 打印矩阵构建器将要创建的所有单元，但不实例化也不运行它们。

use anyhow::{Result, bail};

use crate::{
    core::{
        planner::{MatrixOptions, MatrixPlan},
        registry::Registry,
    },
    infra::t,
    kinds,
    reporting::console::print_matrix_listing,
};

pub fn execute(
    min_version: Option<u16>,
    redefine: bool,
    kind: Option<&str>,
    locale: &str,
) -> Result<()> {
    let registry = select_kinds(kinds::registry(), kind, locale)?;
    let options = MatrixOptions {
        min_version: min_version.unwrap_or(MatrixOptions::default().min_version),
        redefine,
        ..MatrixOptions::default()
    };

    let plan = MatrixPlan::new(&registry, &options)?;
    let combinations = plan.combinations();
    print_matrix_listing(&combinations, plan.upper_bound(), locale);
    Ok(())
}

/// Narrows `registry` to the kind named `kind`, if one is given.
pub fn select_kinds(registry: Registry, kind: Option<&str>, locale: &str) -> Result<Registry> {
    let Some(name) = kind else {
        return Ok(registry);
    };
    match registry.find(name) {
        Some(found) => Ok(Registry::new().with(*found)),
        None => {
            let available = registry
                .kinds()
                .iter()
                .map(|k| k.name)
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "{}",
                t!("unknown_kind", locale = locale, name = name, available = available)
            )
        }
    }
}
