pub mod assemble;
pub use assemble::assemble_media;
pub mod config;
pub use config::{CategoryConfig, CategoryRegistry};
pub mod error;
pub use error::{MediaError, MediaResult};
pub mod types;
pub use types::*;
