pub mod analyze_workflow;
pub use analyze_workflow::AnalyzeWorkflowConfig;
pub mod embed_worker;
pub use embed_worker::EmbedWorker;
pub mod resize_workflow;
pub mod search_service;
pub use search_service::SearchService;
pub mod supervisor;
pub use supervisor::{Healthz, ListenerSupervisor};
