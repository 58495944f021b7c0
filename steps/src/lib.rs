pub mod assemble_media;
pub use assemble_media::AssembleMedia;
pub mod cleanup;
pub use cleanup::Cleanup;
pub mod external_transcode;
pub use external_transcode::{ExternalTranscode, TranscodeConfig};
pub mod keys;
pub mod notification;
pub use notification::Notification;
pub mod parse_notification;
pub use parse_notification::ParseNotification;
pub mod persist_media;
pub use persist_media::PersistMedia;
pub mod prompts;
pub use prompts::PromptsConfig;
pub mod request_summary;
pub use request_summary::RequestSummary;
pub mod scene_extractor;
pub use scene_extractor::SceneExtractor;
pub mod summary_json_to_struct;
pub use summary_json_to_struct::SummaryJsonToStruct;
