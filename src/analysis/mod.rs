// src/analysis/mod.rs

//! Read-only analysis over finished crawls.
//!
//! - Visible text and page summaries (`text`)
//! - Technology detection from a signature table (`techstack`)

pub mod techstack;
pub mod text;

pub use techstack::{Category, Detection, SIGNATURES, Scope, Signature, TechDetector, TechUsage};
pub use text::{PageSummary, html_to_text, summarize_page};
