//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! The token counting port lives in the domain, since messages measure
//! themselves at construction.

pub mod chat_gateway;
pub mod completion_client;
pub mod conversation_logger;
