//! Similia is a rule-based repertorization engine for classical homeopathy
//! case analysis. Given a structured patient case it maps symptoms onto
//! repertory rubrics, pools and scores the graded remedies, applies
//! clinical and safety screening, and returns a ranked suggestion list
//! with dosing guidance — persisting a full case record for later
//! decision and outcome follow-up.
//!
//! The library is invoked programmatically by a request-handling layer;
//! it exposes no protocol of its own. See [`engine::RuleEngine`] for the
//! entry point and [`config::EngineConfig`] for the tunables.

pub mod config;
pub mod db;
pub mod engine;
pub mod models;

pub use config::EngineConfig;
pub use engine::RuleEngine;
