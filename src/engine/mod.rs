//! The eight-stage repertorization pipeline.
//!
//! Stages run in sequence per case: normalize → match rubrics → build
//! remedy pool → score → clinical adjustments → contradiction screen →
//! assemble suggestions → persist. Stages 1–7 are pure given the
//! reference snapshot; the facade owns orchestration and the single
//! stage-8 insert.

pub mod clinical;
pub mod contradiction;
pub mod facade;
pub mod matching;
pub mod normalize;
pub mod outcome;
pub mod pool;
pub mod reasoning;
pub mod scoring;
pub mod suggestion;
pub mod types;

pub use facade::RuleEngine;
pub use types::*;
