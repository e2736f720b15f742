//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep CLI/embedding layers decoupled from store details.

pub mod backlinks;
pub mod run;
