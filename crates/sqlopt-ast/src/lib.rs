//! Sqlopt AST: execution-plan structuring for SQL optimization chat
//!
//! This crate turns textual, EXPLAIN-style execution-plan dumps into flat
//! sequences of typed operation records with recomputed cost/row totals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PLAN STRUCTURING PIPELINE                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  plan text ──► PlanParser ───► QueryPlan { operations, totals } │
//! │       │        (line scan,                      ▲               │
//! │       │         detail fold)                    │enrich         │
//! │       │                                         │               │
//! │       └──────► PlanAnalyzer ──► QueryPlan  TableMetadataRegistry│
//! │                (per-line                                        │
//! │                 classification)                                 │
//! │                                                                 │
//! │  SQL text ───► collect_tables ──► ["orders", "users", ...]     │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All entry points are total functions over arbitrary text: unparsable
//! fragments degrade to defaults ("0" statistics, absent table names),
//! never to errors. Aggregate totals on [`QueryPlan`] are always
//! recomputed from the operation list, never supplied independently.

pub mod analyzer;
pub mod metadata;
pub mod plan;
pub mod tables;

use serde::{Deserialize, Serialize};

pub use analyzer::{analyze_query_plan, OperationType, PlanAnalyzer};
pub use metadata::TableMetadataRegistry;
pub use plan::{parse_query_plan, PlanParser};
pub use tables::{collect_tables, TableCollector};

// ============================================================================
// Core Types
// ============================================================================

/// Per-operation estimates, kept in the string form they carry in plan text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub cost: String,
    pub rows: String,
    pub width: String,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            cost: "0".to_string(),
            rows: "0".to_string(),
            width: "0".to_string(),
        }
    }
}

/// One node/step of an execution plan (a scan, join, sort, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Free-text operation description, e.g. "Seq Scan on orders (...)".
    pub op_type: String,
    /// Target table when an `on <identifier>` fragment was found.
    pub table_name: Option<String>,
    pub statistics: Statistics,
    /// Access keys collected from `Key:` lines.
    pub keys: Vec<String>,
    /// `Index Cond:` / `Filter:` fragments, in encounter order.
    pub conditions: Vec<String>,
    /// Freeform metadata. Empty from the line scanner; the analyzer stores
    /// timing statistics here and [`TableMetadataRegistry::enrich`] copies
    /// table metadata in.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Reserved; always empty from the parsers in this crate.
    pub additional_info: Vec<String>,
}

/// A structured execution plan: ordered operations plus recomputed totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub operations: Vec<Operation>,
    /// Sum of per-operation cost estimates.
    pub cost: f64,
    pub planning_time_ms: f64,
    pub execution_time_ms: f64,
    /// Decimal string form of [`QueryPlan::cost`].
    pub total_cost: String,
    /// Decimal string form of the summed row estimates.
    pub total_rows: String,
}

impl QueryPlan {
    /// Build a plan from sealed operations, recomputing the aggregates.
    ///
    /// Timing fields start at 0; the plan-text formats handled here carry
    /// no plan-level timing, only [`PlanAnalyzer`] fills them in.
    pub fn from_operations(operations: Vec<Operation>) -> Self {
        // fold, not sum: the empty f64 sum is -0.0, which would stringify
        // the totals of an empty plan as "-0".
        let cost: f64 = operations
            .iter()
            .map(|op| float_or_nan(&op.statistics.cost))
            .fold(0.0, |acc, x| acc + x);
        let rows: f64 = operations
            .iter()
            .map(|op| float_or_nan(&op.statistics.rows))
            .fold(0.0, |acc, x| acc + x);

        Self {
            total_cost: cost.to_string(),
            total_rows: rows.to_string(),
            cost,
            planning_time_ms: 0.0,
            execution_time_ms: 0.0,
            operations,
        }
    }
}

/// Float parse with NaN fallback. A malformed statistic poisons the whole
/// aggregate with NaN instead of being clamped to 0; the statistics written
/// by the parsers in this crate are regex-validated, so NaN only surfaces
/// for operations constructed by hand.
pub(crate) fn float_or_nan(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}
