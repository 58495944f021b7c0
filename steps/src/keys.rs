//! Well-known [`mediasearch_pipeline::PipelineContext`] bag keys shared
//! across this crate's Steps, distinct from the pipeline's own `__IN__`/
//! `__OUT__` piping keys.

pub const GCS_OBJECT_KEY: &str = "gcs_object";
pub const HI_RES_OBJECT_KEY: &str = "hi_res_object";
pub const LO_RES_OBJECT_KEY: &str = "lo_res_object";
pub const MEDIA_SUMMARY_KEY: &str = "media_summary";
pub const SCENES_KEY: &str = "scenes";
pub const MEDIA_KEY: &str = "media";
