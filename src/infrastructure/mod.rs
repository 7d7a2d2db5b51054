//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Host integrations (in-memory directory, console dev mode)

pub mod config;
pub mod adapters;
