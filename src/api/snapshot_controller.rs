use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::Point;
use crate::error::{OverlayError, OverlayResult};
use crate::host::ChartHost;
use crate::tools::{ToolExport, ToolInstance};

use super::OverlayEngine;

pub const TOOLS_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Versioned wrapper around the exported tool array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub tools: Vec<ToolExport>,
}

/// Import record; `options` may be partial and merge onto the kind's defaults.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    id: String,
    kind: String,
    #[serde(default)]
    points: Vec<Point>,
    #[serde(default)]
    options: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ImportContract {
    schema_version: u32,
    tools: Vec<ImportRecord>,
}

fn parse_import(input: &str) -> OverlayResult<Vec<ImportRecord>> {
    let value: Value = serde_json::from_str(input)
        .map_err(|e| OverlayError::InvalidImport(format!("failed to parse tools json: {e}")))?;
    match value {
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| OverlayError::InvalidImport(format!("invalid tool record: {e}"))),
        Value::Object(_) => {
            let contract: ImportContract = serde_json::from_value(value)
                .map_err(|e| OverlayError::InvalidImport(format!("invalid tools contract: {e}")))?;
            if contract.schema_version != TOOLS_SNAPSHOT_JSON_SCHEMA_V1 {
                return Err(OverlayError::InvalidImport(format!(
                    "unsupported tools schema version: {}",
                    contract.schema_version
                )));
            }
            Ok(contract.tools)
        }
        _ => Err(OverlayError::InvalidImport(
            "tools json must be an array or a versioned contract".to_owned(),
        )),
    }
}

impl<H: ChartHost> OverlayEngine<H> {
    /// Serializable records of every settled tool, in z-order.
    ///
    /// A tool still being created is left out until it finishes.
    #[must_use]
    pub fn export_all(&self) -> Vec<ToolExport> {
        self.tools
            .iter()
            .filter(|tool| !tool.is_creating())
            .map(ToolInstance::export_data)
            .collect()
    }

    pub fn export_all_json(&self) -> OverlayResult<String> {
        serde_json::to_string(&self.export_all())
            .map_err(|e| OverlayError::InvalidData(format!("failed to serialize tools: {e}")))
    }

    pub fn export_all_json_contract_v1_pretty(&self) -> OverlayResult<String> {
        let payload = ToolsSnapshotJsonContractV1 {
            schema_version: TOOLS_SNAPSHOT_JSON_SCHEMA_V1,
            tools: self.export_all(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            OverlayError::InvalidData(format!("failed to serialize tools contract v1: {e}"))
        })
    }

    /// Upserts every record of a bare array or a v1 contract.
    ///
    /// Existing tools that are not mentioned stay untouched. All records are
    /// validated before any is applied, so a failing import changes nothing.
    /// Returns the number of records applied.
    pub fn import_all(&mut self, input: &str) -> OverlayResult<usize> {
        let records = parse_import(input)?;
        let mut prepared = Vec::with_capacity(records.len());
        for record in records {
            if record.id.is_empty() {
                return Err(OverlayError::InvalidImport("tool record id must not be empty".to_owned()));
            }
            if record.points.is_empty() {
                return Err(OverlayError::InvalidImport(format!(
                    "tool `{}` has no points",
                    record.id
                )));
            }
            let tool = self
                .build_tool(&record.id, &record.kind, record.points, record.options.as_ref())
                .map_err(|e| OverlayError::InvalidImport(format!("tool `{}`: {e}", record.id)))?;
            prepared.push(tool);
        }

        let applied = prepared.len();
        for tool in prepared {
            self.upsert_tool(tool);
        }
        self.dispatch_events();
        debug!(applied, total = self.tools.len(), "tools imported");
        Ok(applied)
    }

    pub fn get_selected_json(&self) -> OverlayResult<String> {
        to_json(&self.get_selected())
    }

    pub fn get_by_id_json(&self, id: &str) -> OverlayResult<String> {
        to_json(&self.get_by_id(id))
    }

    pub fn get_by_id_pattern_json(&self, pattern: &str) -> OverlayResult<String> {
        to_json(&self.get_by_id_pattern(pattern))
    }
}

fn to_json<T: Serialize>(value: &T) -> OverlayResult<String> {
    serde_json::to_string(value)
        .map_err(|e| OverlayError::InvalidData(format!("failed to serialize tool data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array_and_contract() {
        let bare = r#"[{"id":"a","kind":"TrendLine","points":[{"timestamp":1.0,"price":2.0}]}]"#;
        let records = parse_import(bare).expect("bare array");
        assert_eq!(records.len(), 1);
        assert!(records[0].options.is_none());

        let contract = r#"{"schema_version":1,"tools":[{"id":"b","kind":"Text"}]}"#;
        let records = parse_import(contract).expect("contract");
        assert_eq!(records[0].id, "b");
        assert!(records[0].points.is_empty());
    }

    #[test]
    fn rejects_scalars_and_unknown_versions() {
        assert!(matches!(parse_import("42"), Err(OverlayError::InvalidImport(_))));
        assert!(matches!(parse_import("not json"), Err(OverlayError::InvalidImport(_))));
        let future = r#"{"schema_version":2,"tools":[]}"#;
        assert!(matches!(parse_import(future), Err(OverlayError::InvalidImport(_))));
    }
}
