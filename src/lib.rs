// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # luxprima-ops
//!
//! An operations TUI and library for supervising the LuxPrima autonomous
//! briefing service.
//!
//! The backend crawls configured sources, synthesizes a daily intelligence
//! briefing with an LLM, and exposes a REST API. This crate watches that
//! service from a terminal: it polls health and job status in the
//! background, derives run metadata from each briefing's execution log,
//! and lets an operator manage sources, schedules, and configuration.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │ (parsing)│    │(render) │    │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │ Update channel                                      │
//! │  ┌────┴────┐    ┌──────────┐                                │
//! │  │  poll   │◀───│  client  │◀── LuxPrima REST API           │
//! │  │ (loops) │    │  (HTTP)  │                                │
//! │  └─────────┘    └──────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user actions
//! - **[`client`]**: HTTP client for the backend REST surface
//! - **[`poll`]**: Cancellable fixed-interval polling loops - dual-cadence
//!   health probing and job-status edge detection
//! - **[`data`]**: Wire records plus the execution-log metadata parser
//! - **[`ui`]**: Terminal rendering using ratatui, one module per view
//!
//! ## Features
//!
//! - **Dashboard**: Live run status, next scheduled run, latest briefings
//! - **Run metadata**: Sources, model, and duration recovered from raw
//!   execution logs (midnight rollover handled)
//! - **Dual health probes**: System backend plus the local inference
//!   endpoint when one is configured
//! - **Edge-triggered refresh**: The archive refetches exactly once when a
//!   generation run finishes
//!
//! ## Usage
//!
//! ```bash
//! # Point at a backend and watch it
//! luxprima-ops --api-base http://localhost:8000/api
//!
//! # Faster status polling, with a trace log
//! luxprima-ops --status-refresh 1 --log-file ops.log
//! ```

pub mod app;
pub mod client;
pub mod data;
pub mod events;
pub mod poll;
pub mod ui;

pub use app::{App, InputMode, View};
pub use client::{ApiClient, ClientError, ClientResult};
pub use data::{
    parse_run_metadata, parse_run_metadata_with, scan_timestamp, DefaultMatchers, LineMatchers,
    ModelDetail, Report, RunMetadata, Schedule, Settings, Source,
};
pub use poll::{
    EdgeDetector, HealthMonitor, HealthSignal, IntelligenceSignal, PollingLoop, ProbePeriods,
    StatusWatcher, Update,
};
