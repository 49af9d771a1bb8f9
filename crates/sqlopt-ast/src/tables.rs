//! Table-name collection from raw SQL text.
//!
//! Used to decide which table metadata to fetch before a query is sent
//! off for optimization. Deliberately regex-based: the input is whatever
//! the user pasted into the chat, which a strict SQL parser would reject
//! more often than not.

use regex::Regex;

pub struct TableCollector {
    pattern: Regex,
}

impl TableCollector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"(?i)(?:FROM|JOIN)\s+([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)",
            )
            .unwrap(),
        }
    }

    /// Collect referenced table names in first-occurrence order, schema
    /// prefixes stripped, duplicates removed.
    pub fn collect(&self, query: &str) -> Vec<String> {
        let mut tables: Vec<String> = Vec::new();

        for cap in self.pattern.captures_iter(query) {
            let full = cap[1].trim();
            let table = match full.split_once('.') {
                Some((_schema, table)) => table,
                None => full,
            };
            if !tables.iter().any(|t| t == table) {
                tables.push(table.to_string());
            }
        }

        tables
    }
}

impl Default for TableCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect table names with a freshly built [`TableCollector`].
pub fn collect_tables(query: &str) -> Vec<String> {
    TableCollector::new().collect(query)
}
