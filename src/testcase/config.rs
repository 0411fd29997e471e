//! Test case configuration (`testcases/<tc>/<tc>.json`).
//!
//! Only `top_module` is interpreted here; every other field belongs to the
//! packet generator and is carried through untouched.

use super::{HBM_TOP, validate_name};
use crate::Result;
use crate::layout::SimLayout;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

const TOP_MODULE: &str = "top_module";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TestConfig {
    pub fields: Map<String, Value>,
}

impl TestConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read test case config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse test case config {}", path.display()))
    }

    /// Raw `top_module` value, whatever its JSON type.
    pub fn top_module(&self) -> Option<&Value> {
        self.fields.get(TOP_MODULE)
    }

    /// Point an explicit `top_module` at the HBM testbench. Returns the
    /// previous value; a config without the key is left alone.
    pub fn force_hbm_top(&mut self) -> Option<Value> {
        let top = self.fields.get_mut(TOP_MODULE)?;
        let previous = std::mem::replace(top, Value::String(HBM_TOP.to_string()));
        log::info!("top module: {} -> {}", describe(&previous), HBM_TOP);
        Some(previous)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text + "\n").with_context(|| format!("write {}", path.display()))
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Top module for the simulator run. Always the HBM testbench; the test
/// case's own `<tc>.json` is consulted only to report the conversion.
pub fn resolve_top_module(layout: &SimLayout, testcase: &str) -> Result<String> {
    validate_name(testcase)?;
    let path = layout
        .testcase_dir(testcase)
        .join(format!("{}.json", testcase));

    if path.is_file() {
        let config = TestConfig::load(&path)?;
        match config.top_module() {
            Some(top) if top.as_str() != Some(HBM_TOP) => {
                log::info!("converting top module {} to {}", describe(top), HBM_TOP);
            }
            _ => {}
        }
    } else {
        log::debug!("{} not found, defaulting top module", path.display());
    }

    log::info!("using top module: {}", HBM_TOP);
    Ok(HBM_TOP.to_string())
}
