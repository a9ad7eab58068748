//! # standup-digest
//!
//! Summarizes the commits you authored during a workday, across several
//! branches, using a Gemini model.
//!
//! - [`git`] aggregates per-branch history into one deduplicated commit list
//!   tagged with the branches each commit was seen on.
//! - [`ai`] discovers and ranks Gemini models, then generates with
//!   per-model retry and fallback across the ranked list.
//! - [`digest`] wires both together for a single run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod data;
pub mod digest;
pub mod git;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of standup-digest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
