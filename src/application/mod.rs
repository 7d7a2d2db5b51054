//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Relay: Member cache, relay rules and the engine running them
//! - Errors: Domain-specific errors

pub mod errors;
pub mod relay;
