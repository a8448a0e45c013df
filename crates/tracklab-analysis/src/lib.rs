//! # TrackLab Analysis
//!
//! End-of-day analysis pipeline: format the day's work logs into a prompt,
//! ask a local Ollama model for a structured review, parse the reply
//! permissively, and upsert one summary per calendar date.
//!
//! The parsing contract is deliberately one-sided: a reply that was received
//! always becomes a structurally valid [`AnalysisReport`], however mangled
//! the model's output. Only transport failures surface as errors.

pub mod ollama;
pub mod parse;
pub mod pipeline;

pub use ollama::{OllamaClient, OllamaHealth};
pub use pipeline::{analyze, run_daily_analysis};
