//! Shared functionality
//!
//! This crate supplies a number of shared structures and functionality that is used by the
//! other tagsoup crates: node identifiers, the character stream with its locations, and the
//! common error types.

pub mod byte_stream;
pub mod node;
pub mod types;
