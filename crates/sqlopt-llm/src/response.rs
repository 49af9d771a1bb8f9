//! Response segmenter.
//!
//! Splits one model-generated markdown document into named sections by
//! independent, order-insensitive pattern searches over the full text.
//! First match of each pattern wins. Sections may be missing, reordered
//! or malformed; each extraction degrades on its own without affecting
//! the others. Deliberately not a single-pass grammar: a strict grammar
//! would reject documents this parser tolerates.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlopt_ast::{PlanParser, QueryPlan};

/// Structured form of one optimization reply.
///
/// String fields default to `""`, optional fields to `None`; absence is
/// always explicit. `optimized_query` is never empty when
/// `original_query` is non-empty (fallback chain in [`ResponseParser::parse`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub original_query: String,
    pub optimized_query: String,
    pub optimization_rationale: String,
    pub performance_impact: String,
    pub potential_risks: String,
    pub original_plan: Option<QueryPlan>,
    pub optimized_plan: Option<QueryPlan>,
    pub tables_metadata: Option<Map<String, Value>>,
}

/// Segmenter with pre-compiled section patterns.
///
/// The section labels are the Cyrillic headings the backend prompt asks
/// the model to produce; they are part of the wire contract with the
/// model, best-effort by nature.
pub struct ResponseParser {
    original_query: Regex,
    optimized_query: Regex,
    any_sql_block: Regex,
    rationale: Regex,
    impact: Regex,
    risks: Regex,
    original_plan: Regex,
    optimized_plan: Regex,
    tables_metadata: Regex,
    plan_parser: PlanParser,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            original_query: Regex::new(r"(?s)Исходный запрос\s*```sql\s*(.*?)\s*```").unwrap(),
            optimized_query: Regex::new(r"(?s)Оптимизированный запрос\s*```sql\s*(.*?)\s*```")
                .unwrap(),
            any_sql_block: Regex::new(r"(?s)```sql\s*(.*?)\s*```").unwrap(),
            rationale: Regex::new(r"(?s)Обоснование оптимизации\s*(.*?)(?:##|$)").unwrap(),
            impact: Regex::new(r"(?s)Оценка улучшения\s*(.*?)(?:##|$)").unwrap(),
            risks: Regex::new(r"(?s)Потенциальные риски\s*(.*?)(?:##|$)").unwrap(),
            original_plan: Regex::new(r"(?s)План исходного запроса\s*```sql\s*(.*?)\s*```")
                .unwrap(),
            optimized_plan: Regex::new(
                r"(?s)План оптимизированного запроса\s*```sql\s*(.*?)\s*```",
            )
            .unwrap(),
            tables_metadata: Regex::new(r"(?s)Метаданные таблиц\s*```json\s*(.*?)\s*```").unwrap(),
            plan_parser: PlanParser::new(),
        }
    }

    /// Segment one reply. Total; never raises.
    pub fn parse(&self, text: &str) -> ParsedResponse {
        let mut response = ParsedResponse::default();

        if let Some(cap) = self.original_query.captures(text) {
            response.original_query = cap[1].trim().to_string();
        }

        if let Some(cap) = self.optimized_query.captures(text) {
            response.optimized_query = cap[1].trim().to_string();
        } else if let Some(cap) = self.any_sql_block.captures(text) {
            // No dedicated section; take the first sql block anywhere.
            response.optimized_query = cap[1].trim().to_string();
        }
        if response.optimized_query.is_empty() {
            response.optimized_query = response.original_query.clone();
        }

        if let Some(cap) = self.rationale.captures(text) {
            response.optimization_rationale = cap[1].trim().to_string();
        }
        if let Some(cap) = self.impact.captures(text) {
            response.performance_impact = cap[1].trim().to_string();
        }
        if let Some(cap) = self.risks.captures(text) {
            response.potential_risks = cap[1].trim().to_string();
        }

        if let Some(cap) = self.original_plan.captures(text) {
            response.original_plan = Some(self.plan_parser.parse(cap[1].trim()));
        }
        if let Some(cap) = self.optimized_plan.captures(text) {
            response.optimized_plan = Some(self.plan_parser.parse(cap[1].trim()));
        }

        if let Some(cap) = self.tables_metadata.captures(text) {
            match serde_json::from_str::<Map<String, Value>>(cap[1].trim()) {
                Ok(tables) => response.tables_metadata = Some(tables),
                Err(err) => {
                    // Best effort: keep the field absent, keep the rest.
                    tracing::warn!(error = %err, "failed to parse tables metadata block");
                }
            }
        }

        response
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment one reply with a freshly built [`ResponseParser`].
pub fn parse_llm_response(text: &str) -> ParsedResponse {
    ResponseParser::new().parse(text)
}
