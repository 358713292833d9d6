//! REST client library for the Gemini `generateContent` endpoint.
//!
//! Provides typed request/response messages, client configuration, and an
//! HTTP wrapper used by the transform pipeline to request image generation.

pub mod api;
pub mod config;
pub mod messages;
