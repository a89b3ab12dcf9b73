//! Domain layer - Pure business logic.

pub mod error;
pub mod media_type;
pub mod object_key;
pub mod orientation;
pub mod video;
