//! Data types for the editorial pipeline.

pub mod config;
pub mod decision;
pub mod intake;
pub mod records;
pub mod run;
