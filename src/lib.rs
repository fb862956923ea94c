//! Copyglot - placeholder-safe translation of web copy
//!
//! Translates short English strings with an LLM while keeping `[placeholder]`
//! tokens intact, and measures quality against human references with METEOR
//! and BLEU, side by side with a baseline machine translator.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod language;
pub mod placeholder;
pub mod quality;
pub mod report;
pub mod translate;
pub mod workflow;
