//! Domain types and pure logic for the Personafy backend.
//!
//! Nothing in this crate performs I/O: the database, the generative model
//! and HTTP live in the sibling crates.

pub mod data_url;
pub mod error;
pub mod prompt;
pub mod transformation;
pub mod types;
