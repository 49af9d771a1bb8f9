//! Line-oriented scanner for textual execution plans.
//!
//! A single forward pass over the lines of an EXPLAIN-style dump, with one
//! piece of mutable state: the operation currently being built. A line
//! either opens a new operation (arrow marker or a known operation-type
//! keyword at line start) or, while an operation is open, contributes
//! detail to it. An operation line yields its own cost/rows/width when it
//! carries them inline, but it never contributes detail to the previous
//! operation; `Index Cond:` / `Filter:` / `Key:` markers are only read
//! from detail lines. Detail lines before the first operation are ignored.

use crate::{Operation, QueryPlan};
use regex::Regex;

/// Scanner with pre-compiled patterns. Reuse one instance when parsing
/// many plans; [`parse_query_plan`] builds a fresh one per call.
pub struct PlanParser {
    op_start: Regex,
    table: Regex,
    cost: Regex,
    rows: Regex,
    width: Regex,
}

impl PlanParser {
    pub fn new() -> Self {
        Self {
            op_start: Regex::new(r"^(Seq Scan|Index Scan|Nested Loop|Hash Join|Sort|Aggregate|Limit)")
                .unwrap(),
            table: Regex::new(r"(?i)on\s+(\w+)").unwrap(),
            cost: Regex::new(r"cost=(\d+\.\d+)\.\.(\d+\.\d+)").unwrap(),
            rows: Regex::new(r"rows=(\d+)").unwrap(),
            width: Regex::new(r"width=(\d+)").unwrap(),
        }
    }

    /// Parse arbitrary plan text. Total: unrecognized lines are skipped,
    /// unparsable statistics stay at their "0" defaults.
    pub fn parse(&self, text: &str) -> QueryPlan {
        let mut operations: Vec<Operation> = Vec::new();
        let mut current: Option<Operation> = None;

        for line in text.lines() {
            let content = line.trim();
            if content.is_empty() {
                continue;
            }

            if content.starts_with("->") || self.op_start.is_match(content) {
                // Seal the open operation before starting the next one.
                if let Some(op) = current.take() {
                    operations.push(op);
                }

                let mut op = Operation {
                    op_type: content.replacen("->", "", 1).trim().to_string(),
                    ..Operation::default()
                };
                if let Some(cap) = self.table.captures(content) {
                    op.table_name = Some(cap[1].to_string());
                }
                // Plans that put the estimate parenthetical on the operation
                // line itself still get their statistics.
                if let Some(cap) = self.cost.captures(content) {
                    op.statistics.cost = cap[2].to_string();
                }
                if let Some(cap) = self.rows.captures(content) {
                    op.statistics.rows = cap[1].to_string();
                }
                if let Some(cap) = self.width.captures(content) {
                    op.statistics.width = cap[1].to_string();
                }
                current = Some(op);
            } else if let Some(op) = current.as_mut() {
                // Checks are independent: one line may carry several details.
                if let Some(cap) = self.cost.captures(content) {
                    // Second float: the estimated total cost.
                    op.statistics.cost = cap[2].to_string();
                }
                if let Some(cap) = self.rows.captures(content) {
                    op.statistics.rows = cap[1].to_string();
                }
                if let Some(cap) = self.width.captures(content) {
                    op.statistics.width = cap[1].to_string();
                }
                if content.contains("Index Cond:") {
                    op.conditions
                        .push(content.replacen("Index Cond:", "", 1).trim().to_string());
                }
                if content.contains("Filter:") {
                    op.conditions
                        .push(content.replacen("Filter:", "", 1).trim().to_string());
                }
                if content.contains("Key:") {
                    op.keys
                        .push(content.replacen("Key:", "", 1).trim().to_string());
                }
            }
        }

        if let Some(op) = current.take() {
            operations.push(op);
        }

        QueryPlan::from_operations(operations)
    }
}

impl Default for PlanParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one plan dump with a freshly built [`PlanParser`].
pub fn parse_query_plan(text: &str) -> QueryPlan {
    PlanParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_scan_with_filter() {
        let plan = parse_query_plan(
            "Seq Scan on orders (cost=0.00..10.50 rows=100 width=8)\n  Filter: status = 'open'",
        );

        assert_eq!(plan.operations.len(), 1);
        let op = &plan.operations[0];
        assert!(op.op_type.starts_with("Seq Scan"));
        assert_eq!(op.table_name.as_deref(), Some("orders"));
        assert_eq!(op.statistics.cost, "10.50");
        assert_eq!(op.statistics.rows, "100");
        assert_eq!(op.statistics.width, "8");
        assert_eq!(op.conditions, vec!["status = 'open'".to_string()]);
        assert_eq!(plan.cost, 10.50);
        assert_eq!(plan.total_rows, "100");
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        let plan = parse_query_plan("");
        assert!(plan.operations.is_empty());
        assert_eq!(plan.cost, 0.0);
        assert_eq!(plan.total_cost, "0");
        assert_eq!(plan.total_rows, "0");
    }

    #[test]
    fn arrow_marker_opens_operation_and_is_stripped() {
        let plan = parse_query_plan("  ->  Index Scan using idx on users\n    (cost=0.25..4.50 rows=1 width=44)");
        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].op_type, "Index Scan using idx on users");
        assert_eq!(plan.operations[0].table_name.as_deref(), Some("users"));
        assert_eq!(plan.operations[0].statistics.cost, "4.50");
    }

    #[test]
    fn operations_seal_in_order_of_appearance() {
        let text = "Hash Join\n  (cost=1.00..2.00 rows=5 width=4)\n-> Seq Scan on a\n  (cost=0.00..3.50 rows=10 width=4)\n-> Seq Scan on b\n  (cost=0.00..4.00 rows=20 width=4)";
        let plan = parse_query_plan(text);

        assert_eq!(plan.operations.len(), 3);
        assert!(plan.operations[0].op_type.starts_with("Hash Join"));
        assert_eq!(plan.operations[1].table_name.as_deref(), Some("a"));
        assert_eq!(plan.operations[2].table_name.as_deref(), Some("b"));
        assert_eq!(plan.cost, 2.00 + 3.50 + 4.00);
        assert_eq!(plan.total_rows, "35");
    }

    #[test]
    fn detail_lines_before_any_operation_are_ignored() {
        let plan = parse_query_plan("  (cost=0.00..9.99 rows=3 width=4)\n  Filter: x > 1");
        assert!(plan.operations.is_empty());
        assert_eq!(plan.cost, 0.0);
    }

    #[test]
    fn inline_statistics_belong_to_the_new_operation() {
        // An operation line carrying cost/rows/width keeps them for itself;
        // it never feeds the previous operation.
        let text = "Seq Scan on a (cost=0.00..5.00 rows=2 width=4)\nSort (cost=1.00..6.00 rows=3 width=4)";
        let plan = parse_query_plan(text);
        assert_eq!(plan.operations.len(), 2);
        assert_eq!(plan.operations[0].statistics.cost, "5.00");
        assert_eq!(plan.operations[1].statistics.cost, "6.00");
        assert_eq!(plan.operations[1].statistics.rows, "3");
        assert_eq!(plan.cost, 11.0);
    }

    #[test]
    fn index_cond_and_filter_accumulate_in_encounter_order() {
        let text = "Index Scan on t\n  Index Cond: (id = 5)\n  Filter: active";
        let plan = parse_query_plan(text);
        assert_eq!(
            plan.operations[0].conditions,
            vec!["(id = 5)".to_string(), "active".to_string()]
        );

        let reversed = "Index Scan on t\n  Filter: active\n  Index Cond: (id = 5)";
        let plan = parse_query_plan(reversed);
        assert_eq!(
            plan.operations[0].conditions,
            vec!["active".to_string(), "(id = 5)".to_string()]
        );
    }

    #[test]
    fn key_lines_accumulate() {
        let text = "Index Scan on t\n  Key: a\n  Key: b";
        let plan = parse_query_plan(text);
        assert_eq!(
            plan.operations[0].keys,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn keyword_led_key_line_opens_a_new_operation() {
        // "Sort Key: ..." starts with an operation keyword, so it seals the
        // open operation instead of contributing a key to it.
        let plan = parse_query_plan("Index Scan on t\n  Key: id\nSort Key: created_at");
        assert_eq!(plan.operations.len(), 2);
        assert_eq!(plan.operations[0].keys, vec!["id".to_string()]);
        assert!(plan.operations[1].op_type.starts_with("Sort"));
        assert!(plan.operations[1].keys.is_empty());
    }

    #[test]
    fn table_name_absent_without_identifier() {
        let plan = parse_query_plan("Nested Loop\n  (cost=0.00..1.00 rows=1 width=4)");
        assert_eq!(plan.operations[0].table_name, None);
    }

    #[test]
    fn keyword_match_is_case_sensitive_and_anchored() {
        // "seq scan" and a mid-line keyword open nothing.
        let plan = parse_query_plan("seq scan on t\nsome Sort note");
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "Seq Scan on orders (cost=0.00..10.50 rows=100 width=8)\n  Filter: status = 'open'\n-> Sort\n  Sort Key: id";
        let parser = PlanParser::new();
        assert_eq!(parser.parse(text), parser.parse(text));
    }
}
