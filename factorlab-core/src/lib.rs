//! factorlab core — the factor computation engine.
//!
//! This crate contains the heart of the factor research stack:
//! - Panel domain types (observations, aligned panels, factor series)
//! - Operator library (rolling and cross-sectional numeric primitives)
//! - Feature builder (returns, vwap, average-volume columns)
//! - Factor trait, registry, and the built-in factor units
//! - Computation pipeline wiring registry → join → compute → sink
//!
//! No I/O happens here; loading, evaluation, and export live in the
//! companion backtest crate.

pub mod domain;
pub mod factors;
pub mod features;
pub mod ops;
pub mod pipeline;
