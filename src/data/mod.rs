//! Data models and processing.
//!
//! Wire records for the REST surface ([`model`]), the run-metadata
//! derivation layer ([`meta`]), and elapsed-time helpers ([`duration`]).

pub mod duration;
pub mod meta;
pub mod model;

pub use duration::{elapsed_between, format_elapsed};
pub use meta::{
    parse_run_metadata, parse_run_metadata_with, scan_timestamp, DefaultMatchers, LineMatchers,
    LineTimestamp, ModelDetail, RunMetadata,
};
pub use model::{
    BundledMeta, HealthPayload, JobStatus, LocalModels, NewSchedule, NewSource, NextRun, Report,
    Schedule, SettingUpdate, Settings, Source, IDLE_STATUS,
};
