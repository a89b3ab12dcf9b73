//! Ports - Trait definitions for everything the pipeline talks to.

pub mod entropy;
pub mod media;
pub mod repository;
pub mod staging;
pub mod storage;
