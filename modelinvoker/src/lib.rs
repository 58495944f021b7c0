pub mod embedding;
pub use embedding::EmbeddingInvoker;
pub mod error;
pub use error::{ModelError, ModelErrorKind, ModelResult};
pub mod generative;
pub use generative::*;
pub mod invoker;
pub use invoker::ModelInvoker;
pub mod multimodal;
pub use multimodal::{generate_multimodal, strip_json_fence};
pub mod vertex;
pub use vertex::VertexAiClient;
