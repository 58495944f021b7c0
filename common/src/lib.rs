pub mod error;
pub use error::*;
pub mod ids;
pub use ids::*;
pub mod metrics;
pub mod terminate_sig;
pub use terminate_sig::TerimateSignal;
pub mod type_map;
pub use type_map::*;
