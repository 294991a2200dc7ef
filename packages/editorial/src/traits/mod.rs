//! Core trait abstractions (ReviewModel, Snapshotter, storage).

pub mod ai;
pub mod snapshot;
pub mod store;
