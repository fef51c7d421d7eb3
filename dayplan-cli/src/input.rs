use anyhow::{Context, Result, bail};
use dayplan_core::TimeBlock;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Task exports are either a bare array of records or `{"records": [...]}`.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let v: Value = serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    records_from_value(v).with_context(|| format!("unexpected task export shape in {}", path.display()))
}

fn records_from_value(v: Value) -> Result<Vec<Value>> {
    match v {
        Value::Array(items) => Ok(items),
        Value::Object(mut o) => match o.remove("records") {
            Some(Value::Array(items)) => Ok(items),
            _ => bail!("expected a JSON array or an object with a `records` array"),
        },
        _ => bail!("expected a JSON array or an object with a `records` array"),
    }
}

pub fn read_blocks(path: &Path) -> Result<Vec<TimeBlock>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse blocks from {}", path.display()))
}
