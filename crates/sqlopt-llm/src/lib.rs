//! Sqlopt LLM: structuring of model-generated optimization replies
//!
//! The optimization backend answers with free-form markdown: labeled
//! sections for the original and optimized query, rationale, impact and
//! risk prose, embedded execution plans and a JSON table-metadata block.
//! This crate cuts that document into a [`ParsedResponse`] and selects
//! the prompt template the request side sends out.
//!
//! ```text
//!  LLM markdown ──► ResponseParser ──► ParsedResponse
//!                        │                  ├─ queries / prose (String)
//!                        │ plan blocks      ├─ plans (sqlopt-ast)
//!                        └─────────────────►└─ tables metadata (JSON)
//! ```
//!
//! Every extraction is independent and failure-isolated: a missing or
//! garbled section yields an empty/absent field and never prevents the
//! other sections from being extracted. Nothing here raises; the single
//! recoverable failure (a malformed JSON metadata block) is logged and
//! degraded to absence.

pub mod prompt;
pub mod response;

pub use prompt::{render_prompt, select_prompt_template, PromptContext};
pub use response::{parse_llm_response, ParsedResponse, ResponseParser};

// Re-export the plan types callers receive inside a ParsedResponse.
pub use sqlopt_ast::{Operation, QueryPlan, Statistics};
