//! The review pipeline, stage by stage.
//!
//! `run` drives the whole thing; the other modules are the individual
//! stages, each usable on its own in tests.

pub mod dedup;
pub mod eligibility;
pub mod prompts;
pub mod publish;
pub mod resolve;
pub mod review;
pub mod run;
