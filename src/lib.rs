//! Mines git history for refactoring signals: hotspots (change
//! frequency × indentation complexity), change coupling between files,
//! and knowledge-ownership concentration (truck factor).
//!
//! Everything here is a pure, synchronous transformation over the
//! commit list produced by [`git::log_stream`] — no state survives a
//! run, and no function touches the repository except the complexity
//! scorer's injected file reads.

pub mod analyzers;
pub mod config;
pub mod filters;
pub mod git;
pub mod grouping;
pub mod reporters;
pub mod types;
