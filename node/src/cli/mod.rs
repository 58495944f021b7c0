pub mod cli_main;
pub use cli_main::*;
pub mod logger;
pub use logger::*;
pub mod service;
pub use service::*;
