//! taintpatch library — deterministic source instrumentation for
//! taint-propagation experiments.
//!
//! The core is a parser-free patch engine: anchor resolution with fallback
//! chains, statement/header boundary detection by lexical scanning, and
//! idempotent marker-tracked block insertion (see [domain]). Adapters wire
//! the engine to analyzer result tables and the filesystem.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
