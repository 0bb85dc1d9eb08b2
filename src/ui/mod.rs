//! TUI rendering, split per view plus shared chrome.

pub mod common;
pub mod dashboard;
pub mod detail;
pub mod reports;
pub mod schedules;
pub mod settings;
pub mod sources;
pub mod theme;

pub use theme::Theme;
