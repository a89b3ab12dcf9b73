//! Local adapters for single-server deployment and development.

pub mod fs;
pub mod memory;
pub mod staging;

pub use fs::FsStorage;
pub use memory::InMemoryVideoRepository;
pub use staging::TempDirStaging;
