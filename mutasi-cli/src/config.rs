use anyhow::{Context, Result};
use mutasi_ingest::{Layout, LayoutRegistry, StatementParser};
use std::fs;
use std::path::Path;

/// Read a layout from a TOML file (the format `mutasi layout` prints).
pub fn load_layout(path: &Path) -> Result<Layout> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let layout: Layout =
        toml::from_str(&s).with_context(|| format!("parse layout {}", path.display()))?;
    layout
        .validate()
        .with_context(|| format!("layout {}", path.display()))?;
    Ok(layout)
}

pub fn layout_to_toml(layout: &Layout) -> Result<String> {
    toml::to_string_pretty(layout).context("serialize layout")
}

/// Built-in layouts, plus the one from `layout_file` when given (it replaces
/// a built-in of the same bank name).
pub fn registry(layout_file: Option<&Path>) -> Result<LayoutRegistry> {
    let mut registry = LayoutRegistry::with_builtin().context("load built-in layouts")?;
    if let Some(path) = layout_file {
        registry.register(load_layout(path)?)?;
    }
    Ok(registry)
}

pub fn parser_for_bank<'r>(registry: &'r LayoutRegistry, bank: &str) -> Result<&'r StatementParser> {
    registry.get(bank).with_context(|| {
        format!(
            "unknown bank {bank:?} (supported: {})",
            registry.supported_banks().join(", ")
        )
    })
}
