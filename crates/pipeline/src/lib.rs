//! The photo-to-character transform pipeline.
//!
//! [`transform::TransformPipeline`] runs one transformation request end to
//! end. It reaches the outside world only through two seams:
//!
//! - [`store::TransformStore`] for characters, transformation records and the
//!   per-user counter (PostgreSQL in production),
//! - [`generator::ImageGenerator`] for the generative model (Gemini in
//!   production).

pub mod error;
pub mod generator;
pub mod store;
pub mod transform;
