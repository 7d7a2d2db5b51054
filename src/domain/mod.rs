//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (User, Room, messages, bindings, settings)
//! - Traits: Abstractions over the host platform (directories, sender, clock)

pub mod entities;
pub mod traits;
