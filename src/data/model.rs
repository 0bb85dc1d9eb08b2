//! Wire records for the LuxPrima REST surface.
//!
//! These mirror the JSON bodies served by the backend. Optional fields use
//! serde defaults so a missing `logs` or `content_json` never fails a fetch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored source feeding the report generator.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Body for `POST /sources/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSource {
    pub url: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub source_type: String,
}

impl NewSource {
    pub fn primary(url: String, name: Option<String>) -> Self {
        Self {
            url,
            name,
            is_active: true,
            source_type: "primary".to_string(),
        }
    }
}

/// Metadata the backend may bundle alongside a report, used as a fallback
/// when the execution log yields only defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundledMeta {
    #[serde(default)]
    pub source_count: Option<usize>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub generation_time: Option<f64>,
}

/// A generated report record.
#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub content_markdown: Option<String>,
    #[serde(default)]
    pub content_json: Option<BundledMeta>,
    /// Raw execution log, one line per recorded event. The sole input to
    /// the run-metadata parser.
    #[serde(default)]
    pub logs: Vec<String>,
}

/// A recurring generation trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct Schedule {
    pub id: i64,
    /// "HH:MM" local time.
    pub time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body for `POST /schedules/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSchedule {
    pub time: String,
    pub is_active: bool,
}

/// `GET /schedules/next-run` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NextRun {
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
}

/// `GET /reports/status` payload. The string is a free-form progress label;
/// only the `"Idle"` sentinel has meaning to this client.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub status: String,
}

/// Sentinel status meaning no run is in progress.
pub const IDLE_STATUS: &str = "Idle";

/// Root health endpoint payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
}

/// One key/value pair for the settings batch upsert.
#[derive(Debug, Clone, Serialize)]
pub struct SettingUpdate {
    pub key: String,
    pub value: String,
}

/// `GET /settings/local-models` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalModels {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Backend configuration, fetched as a flat key/value map and replaced
/// wholesale on every refetch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub HashMap<String, String>);

impl Settings {
    /// Setting value by key, empty values treated as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Configured LLM provider selector ("openai", "gemini", "local", ...).
    pub fn llm_provider(&self) -> Option<&str> {
        self.get("llm_provider")
    }

    /// Configured base URL of the local inference endpoint.
    pub fn llm_base_url(&self) -> Option<&str> {
        self.get("llm_base_url")
    }

    /// Base URL to probe for intelligence health, or `None` when the probe
    /// should not run (non-local provider, or no base URL configured).
    ///
    /// The inference endpoint is typically configured with an OpenAI-style
    /// `/v1` suffix; the health route lives above it, so a trailing `/v1`
    /// is stripped.
    pub fn intelligence_probe_base(&self) -> Option<String> {
        if self.llm_provider() != Some("local") {
            return None;
        }
        let base = self.llm_base_url()?;
        let mut trimmed = base.trim().trim_end_matches('/');
        if let Some(stripped) = trimmed.strip_suffix("/v1") {
            trimmed = stripped;
        }
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        Settings(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_probe_base_requires_local_provider() {
        let s = settings(&[
            ("llm_provider", "openai"),
            ("llm_base_url", "http://host:8080/v1"),
        ]);
        assert_eq!(s.intelligence_probe_base(), None);
    }

    #[test]
    fn test_probe_base_requires_base_url() {
        let s = settings(&[("llm_provider", "local")]);
        assert_eq!(s.intelligence_probe_base(), None);

        let empty = settings(&[("llm_provider", "local"), ("llm_base_url", "")]);
        assert_eq!(empty.intelligence_probe_base(), None);
    }

    #[test]
    fn test_probe_base_strips_v1_suffix() {
        for url in ["http://host:8080/v1", "http://host:8080/v1/", "http://host:8080"] {
            let s = settings(&[("llm_provider", "local"), ("llm_base_url", url)]);
            assert_eq!(
                s.intelligence_probe_base().as_deref(),
                Some("http://host:8080"),
                "input: {url}"
            );
        }
    }

    #[test]
    fn test_report_deserializes_with_missing_optionals() {
        let json = r#"{"id": 3, "title": "Daily Brief", "generated_at": "2025-03-14T08:30:15Z"}"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.id, 3);
        assert!(report.logs.is_empty());
        assert!(report.content_json.is_none());
    }

    #[test]
    fn test_settings_is_a_flat_map() {
        let json = r#"{"llm_provider": "local", "smtp_port": "587"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.get("smtp_port"), Some("587"));
    }
}
