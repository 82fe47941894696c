//! Core domain concepts shared across the chat subdomain.
//!
//! - [`model::Model`]: an LLM model and its context budget
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
