//! Adapters - Concrete implementations of ports.

#[cfg(feature = "aws")]
pub mod aws;

pub mod entropy;
pub mod ffmpeg;
pub mod local;
