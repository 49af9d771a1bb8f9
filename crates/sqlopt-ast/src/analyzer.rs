//! Line-local plan classifier.
//!
//! A coarser companion to [`crate::plan`]: every non-blank line either
//! yields one whole classified operation or contributes plan-level timing.
//! Nothing is folded into a preceding operation, so the analyzer also
//! handles plan dialects where statistics sit on the operation line
//! itself, and it knows the MPP motion operators the scanner does not.

use crate::{Operation, QueryPlan};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Known operation kinds, including the Greenplum-style motion operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    SequentialScan,
    IndexScan,
    BitmapHeapScan,
    BitmapIndexScan,
    Sort,
    Hash,
    HashJoin,
    NestedLoop,
    MergeJoin,
    Aggregate,
    GatherMotion,
    RedistributeMotion,
    BroadcastMotion,
}

/// Labels checked most-specific-first, so a "Hash Join" line is never
/// classified as a bare "Hash" and bitmap scans never as plain index scans.
const OPERATION_LABELS: &[(&str, OperationType)] = &[
    ("Bitmap Heap Scan", OperationType::BitmapHeapScan),
    ("Bitmap Index Scan", OperationType::BitmapIndexScan),
    ("Gather Motion", OperationType::GatherMotion),
    ("Redistribute Motion", OperationType::RedistributeMotion),
    ("Broadcast Motion", OperationType::BroadcastMotion),
    ("Seq Scan", OperationType::SequentialScan),
    ("Index Scan", OperationType::IndexScan),
    ("Hash Join", OperationType::HashJoin),
    ("Merge Join", OperationType::MergeJoin),
    ("Nested Loop", OperationType::NestedLoop),
    ("Aggregate", OperationType::Aggregate),
    ("Sort", OperationType::Sort),
    ("Hash", OperationType::Hash),
];

impl OperationType {
    /// The label as it appears in plan text.
    pub fn label(&self) -> &'static str {
        match self {
            OperationType::SequentialScan => "Seq Scan",
            OperationType::IndexScan => "Index Scan",
            OperationType::BitmapHeapScan => "Bitmap Heap Scan",
            OperationType::BitmapIndexScan => "Bitmap Index Scan",
            OperationType::Sort => "Sort",
            OperationType::Hash => "Hash",
            OperationType::HashJoin => "Hash Join",
            OperationType::NestedLoop => "Nested Loop",
            OperationType::MergeJoin => "Merge Join",
            OperationType::Aggregate => "Aggregate",
            OperationType::GatherMotion => "Gather Motion",
            OperationType::RedistributeMotion => "Redistribute Motion",
            OperationType::BroadcastMotion => "Broadcast Motion",
        }
    }

    /// Classify a plan line by the first (most specific) matching label.
    pub fn classify(line: &str) -> Option<OperationType> {
        OPERATION_LABELS
            .iter()
            .find(|(label, _)| line.contains(label))
            .map(|&(_, kind)| kind)
    }
}

/// Classifier with pre-compiled statistic patterns.
pub struct PlanAnalyzer {
    table: Regex,
    cost: Regex,
    rows: Regex,
    width: Regex,
    actual_time: Regex,
    planning_time: Regex,
    execution_time: Regex,
    hash_key: Regex,
}

impl PlanAnalyzer {
    pub fn new() -> Self {
        Self {
            table: Regex::new(r"on\s+(\S+)").unwrap(),
            cost: Regex::new(r"cost=(\d+\.\d+)").unwrap(),
            rows: Regex::new(r"rows=(\d+)").unwrap(),
            width: Regex::new(r"width=(\d+)").unwrap(),
            actual_time: Regex::new(r"actual time=(\d+\.\d+)").unwrap(),
            planning_time: Regex::new(r"planning time=(\d+\.\d+)").unwrap(),
            execution_time: Regex::new(r"execution time=(\d+\.\d+)").unwrap(),
            hash_key: Regex::new(r"Hash Key: (\S+)").unwrap(),
        }
    }

    /// Classify every line of a plan dump. Total over arbitrary text.
    pub fn analyze(&self, text: &str) -> QueryPlan {
        let mut operations: Vec<Operation> = Vec::new();
        let mut hash_keys: BTreeSet<String> = BTreeSet::new();
        let mut planning_time_ms = 0.0;
        let mut execution_time_ms = 0.0;
        let mut has_redistribute = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Plan-level timing may appear on any line, classified or not.
            if let Some(cap) = self.planning_time.captures(line) {
                planning_time_ms = crate::float_or_nan(&cap[1]);
            }
            if let Some(cap) = self.execution_time.captures(line) {
                execution_time_ms = crate::float_or_nan(&cap[1]);
            }

            let Some(kind) = OperationType::classify(line) else {
                continue;
            };
            has_redistribute |= kind == OperationType::RedistributeMotion;

            let mut op = Operation {
                op_type: kind.label().to_string(),
                ..Operation::default()
            };
            if let Some(cap) = self.table.captures(line) {
                op.table_name = Some(cap[1].to_string());
            }
            if let Some(cap) = self.cost.captures(line) {
                op.statistics.cost = cap[1].to_string();
            }
            if let Some(cap) = self.rows.captures(line) {
                op.statistics.rows = cap[1].to_string();
            }
            if let Some(cap) = self.width.captures(line) {
                op.statistics.width = cap[1].to_string();
            }
            if let Some(cap) = self.actual_time.captures(line) {
                op.metadata.insert(
                    "actual time".to_string(),
                    serde_json::Value::String(cap[1].to_string()),
                );
            }
            if kind == OperationType::Hash {
                if let Some(cap) = self.hash_key.captures(line) {
                    hash_keys.insert(cap[1].to_string());
                }
            }

            operations.push(op);
        }

        // Hash keys without a visible motion operator mean the planner will
        // redistribute; surface that as an explicit operation.
        if !hash_keys.is_empty() && !has_redistribute {
            tracing::debug!(
                keys = hash_keys.len(),
                "synthesizing redistribute motion from collected hash keys"
            );
            let mut op = Operation {
                op_type: OperationType::RedistributeMotion.label().to_string(),
                ..Operation::default()
            };
            op.keys = hash_keys.into_iter().collect();
            operations.push(op);
        }

        let mut plan = QueryPlan::from_operations(operations);
        plan.planning_time_ms = planning_time_ms;
        plan.execution_time_ms = execution_time_ms;
        plan
    }
}

impl Default for PlanAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze one plan dump with a freshly built [`PlanAnalyzer`].
pub fn analyze_query_plan(text: &str) -> QueryPlan {
    PlanAnalyzer::new().analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_most_specific_label_first() {
        assert_eq!(
            OperationType::classify("Hash Join (cost=1.00..2.00)"),
            Some(OperationType::HashJoin)
        );
        assert_eq!(
            OperationType::classify("-> Hash (cost=1.00..2.00)"),
            Some(OperationType::Hash)
        );
        assert_eq!(
            OperationType::classify("Bitmap Index Scan on idx_orders"),
            Some(OperationType::BitmapIndexScan)
        );
        assert_eq!(OperationType::classify("Planning note"), None);
    }

    #[test]
    fn statistics_are_read_from_the_operation_line() {
        let plan = analyze_query_plan(
            "Seq Scan on orders (cost=0.00 rows=100 width=8) (actual time=1.25 loops=1)",
        );
        assert_eq!(plan.operations.len(), 1);
        let op = &plan.operations[0];
        assert_eq!(op.op_type, "Seq Scan");
        assert_eq!(op.table_name.as_deref(), Some("orders"));
        assert_eq!(op.statistics.cost, "0.00");
        assert_eq!(op.statistics.rows, "100");
        assert_eq!(
            op.metadata.get("actual time"),
            Some(&serde_json::Value::String("1.25".to_string()))
        );
    }

    #[test]
    fn timing_lines_fill_plan_totals() {
        let plan = analyze_query_plan(
            "Seq Scan on t (cost=1.50 rows=1 width=4)\nplanning time=0.42\nexecution time=12.05",
        );
        assert_eq!(plan.planning_time_ms, 0.42);
        assert_eq!(plan.execution_time_ms, 12.05);
        assert_eq!(plan.operations.len(), 1);
    }

    #[test]
    fn hash_keys_synthesize_a_redistribute_motion() {
        let plan = analyze_query_plan("Hash Key: user_id\nHash Key: region");
        assert_eq!(plan.operations.len(), 3);
        let synth = plan.operations.last().unwrap();
        assert_eq!(synth.op_type, "Redistribute Motion");
        assert_eq!(synth.keys, vec!["region".to_string(), "user_id".to_string()]);
    }

    #[test]
    fn no_synthesis_when_redistribute_motion_already_present() {
        let plan =
            analyze_query_plan("Redistribute Motion 2:2\nHash Key: user_id\nHash Cond: a = b");
        let motions = plan
            .operations
            .iter()
            .filter(|op| op.op_type == "Redistribute Motion")
            .count();
        assert_eq!(motions, 1);
    }

    #[test]
    fn unclassified_text_yields_empty_plan() {
        let plan = analyze_query_plan("nothing to see here\n\njust prose");
        assert!(plan.operations.is_empty());
        assert_eq!(plan.cost, 0.0);
    }
}
