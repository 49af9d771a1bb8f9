//! Table-metadata registry.
//!
//! An explicitly owned store of per-table metadata (column counts, row
//! estimates, index lists, whatever the live connection reported) used to
//! enrich parsed plans. Owned and passed explicitly; there is no global
//! registry.

use crate::QueryPlan;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TableMetadataRegistry {
    tables: HashMap<String, Map<String, Value>>,
}

impl TableMetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, table: impl Into<String>, metadata: Map<String, Value>) {
        self.tables.insert(table.into(), metadata);
    }

    /// Absorb a parsed tables-metadata mapping (table name → metadata
    /// record). Non-object records are skipped.
    pub fn update_many(&mut self, tables: &Map<String, Value>) {
        for (table, value) in tables {
            if let Value::Object(metadata) = value {
                self.tables.insert(table.clone(), metadata.clone());
            }
        }
    }

    pub fn get(&self, table: &str) -> Option<&Map<String, Value>> {
        self.tables.get(table)
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Copy registered metadata into the `metadata` map of every operation
    /// that references the table.
    pub fn enrich(&self, plan: &mut QueryPlan) {
        for op in &mut plan.operations {
            let Some(name) = op.table_name.as_deref() else {
                continue;
            };
            if let Some(metadata) = self.tables.get(name) {
                for (key, value) in metadata {
                    op.metadata.insert(key.clone(), value.clone());
                }
            }
        }
    }
}
