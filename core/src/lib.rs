//! # Verification Core
//!
//! Core logic for multi-channel verification challenges.
//! This crate contains the challenge entities, the challenge engine and its
//! ticker, the collaborator traits, and the error types the other crates build on.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
