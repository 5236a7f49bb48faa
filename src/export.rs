// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write records as CSV. The header comes from the first record's keys in
/// declaration order; an empty slice writes nothing.
pub fn write_csv<T: Serialize, W: Write>(records: &[T], out: W) -> Result<usize> {
    let rows: Vec<Map<String, Value>> = records
        .iter()
        .map(|r| -> Result<Map<String, Value>> {
            match serde_json::to_value(r)? {
                Value::Object(map) => Ok(map),
                other => bail!("CSV export expects object records, got {}", other),
            }
        })
        .collect::<Result<_>>()?;

    let mut wtr = csv::Writer::from_writer(out);
    if let Some(first) = rows.first() {
        let keys: Vec<&String> = first.keys().collect();
        wtr.write_record(keys.iter().map(|k| k.as_str()))?;
        for row in &rows {
            wtr.write_record(keys.iter().map(|k| row.get(*k).map(cell).unwrap_or_default()))?;
        }
    }
    wtr.flush()?;
    Ok(rows.len())
}

pub fn write_csv_file<T: Serialize>(records: &[T], path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Create CSV {}", path.display()))?;
    let n = write_csv(records, file)?;
    tracing::info!(rows = n, path = %path.display(), "csv written");
    Ok(n)
}

/// `<resource>_<YYYY-MM-DD>.csv` unless the caller picked a path.
pub fn default_csv_path(resource: &str, today: NaiveDate, out: Option<&str>) -> PathBuf {
    match out {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(format!("{}_{}.csv", resource, today.format("%Y-%m-%d"))),
    }
}

fn cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_writes_nothing() {
        let mut buf = Vec::new();
        let n = write_csv::<Value, _>(&[], &mut buf).unwrap();
        assert_eq!(n, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn nulls_become_empty_cells() {
        let mut buf = Vec::new();
        write_csv(&[json!({"Notes": null, "Qty": 2})], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Notes,Qty\n,2\n");
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(write_csv(&[1, 2], Vec::new()).is_err());
    }

    #[test]
    fn default_name_uses_resource_and_date() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            default_csv_path("sales", d, None),
            PathBuf::from("sales_2024-01-05.csv")
        );
    }
}
