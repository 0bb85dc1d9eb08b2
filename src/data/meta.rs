//! Run metadata derivation from execution logs.
//!
//! Reports carry their raw execution log as an ordered list of free-text
//! lines. This module folds those lines into structured [`RunMetadata`]:
//! elapsed wall time, the model used, and the set of distinct source URLs
//! touched. Absence of any marker is expected and yields defaults, never an
//! error.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use super::duration::elapsed_between;
use super::model::BundledMeta;

/// Marker preceding the model identifier in the log.
const MODEL_MARKER: &str = "Initializing LLM Provider:";

fn full_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2}):(\d{2})\]").unwrap()
    })
}

fn short_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(\d{2}):(\d{2}):(\d{2})\]").unwrap())
}

fn source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Source: (https?://\S+)").unwrap())
}

/// How much of the model marker line to keep.
///
/// The compact list rows only have room for the first token of the model
/// name; the detail view shows the full remainder. Each granularity carries
/// the sentinel its rendering context expects when no marker is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDetail {
    /// First whitespace-delimited token (list rows).
    ShortToken,
    /// Entire trimmed remainder of the marker line (detail view).
    FullText,
}

impl ModelDetail {
    /// Default model label when no marker line is present.
    pub fn sentinel(&self) -> &'static str {
        match self {
            ModelDetail::ShortToken => "Hybrid",
            ModelDetail::FullText => "Hybrid Engine",
        }
    }
}

/// A timestamp scanned from the front of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTimestamp {
    /// Seconds since midnight.
    pub secs: u32,
    /// Calendar date, only present for the `[YYYY-MM-DD HH:MM:SS]` form.
    pub date: Option<NaiveDate>,
}

/// Scan a line for a leading bracketed timestamp.
///
/// Tries `[YYYY-MM-DD HH:MM:SS]` first, then `[HH:MM:SS]`. Returns `None`
/// when no timestamp is present (most lines) or when a component is out of
/// range — an "hour" of 25 is treated as not-a-timestamp rather than fed
/// into the duration arithmetic.
pub fn scan_timestamp(line: &str) -> Option<LineTimestamp> {
    if let Some(caps) = full_timestamp_re().captures(line) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        let secs = clock_seconds(&caps[4], &caps[5], &caps[6])?;
        return Some(LineTimestamp {
            secs,
            date: Some(date),
        });
    }

    if let Some(caps) = short_timestamp_re().captures(line) {
        let secs = clock_seconds(&caps[1], &caps[2], &caps[3])?;
        return Some(LineTimestamp { secs, date: None });
    }

    None
}

/// Combine clock components into seconds since midnight, rejecting
/// out-of-range values.
fn clock_seconds(h: &str, m: &str, s: &str) -> Option<u32> {
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    let s: u32 = s.parse().ok()?;
    if h > 23 || m > 59 || s > 59 {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}

/// Structured metadata derived from one run's execution log.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    /// Number of distinct source URLs observed.
    pub source_count: usize,
    /// Distinct source URLs in first-seen order.
    pub source_list: Vec<String>,
    /// Best-known model identifier, or the granularity's sentinel.
    pub model_used: String,
    /// Elapsed wall time between first and last timestamp, in seconds.
    pub generation_secs: u64,
    /// Start of the run, only derivable when the first line carries a
    /// date-bearing timestamp.
    pub start_date: Option<NaiveDateTime>,
}

impl RunMetadata {
    /// Metadata for a run with no (or no useful) log.
    pub fn empty(detail: ModelDetail) -> Self {
        Self {
            source_count: 0,
            source_list: Vec::new(),
            model_used: detail.sentinel().to_string(),
            generation_secs: 0,
            start_date: None,
        }
    }

    /// True if the model field still holds the sentinel for `detail`.
    pub fn model_is_default(&self, detail: ModelDetail) -> bool {
        self.model_used == detail.sentinel()
    }

    /// Fill default/zero fields from metadata bundled with the report
    /// record. Log-derived values always win when non-default.
    pub fn or_bundled(mut self, bundled: &BundledMeta, detail: ModelDetail) -> Self {
        if self.source_count == 0 {
            if let Some(count) = bundled.source_count {
                self.source_count = count;
            }
        }
        if self.model_is_default(detail) {
            if let Some(ref model) = bundled.model_used {
                if !model.is_empty() {
                    self.model_used = model.clone();
                }
            }
        }
        if self.generation_secs == 0 {
            if let Some(secs) = bundled.generation_time {
                self.generation_secs = secs as u64;
            }
        }
        self
    }
}

/// Per-line field extractors the folding algorithm runs.
///
/// The fold itself is format-agnostic; swapping in a different matcher set
/// adapts it to another logging format without touching the aggregation
/// rules (first/last timestamp, last model marker, deduped sources).
pub trait LineMatchers {
    /// Extract a leading timestamp, if the line carries one.
    fn timestamp(&self, line: &str) -> Option<LineTimestamp>;

    /// Extract the trimmed model identifier text, if the line carries the
    /// model marker. Granularity is applied by the fold, not the matcher.
    fn model<'a>(&self, line: &'a str) -> Option<&'a str>;

    /// Extract a source URL, if the line carries the source marker.
    fn source<'a>(&self, line: &'a str) -> Option<&'a str>;
}

/// The matchers for the backend's native log format: bracketed leading
/// timestamps, `Initializing LLM Provider:` marker, `Source: <url>` marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMatchers;

impl LineMatchers for DefaultMatchers {
    fn timestamp(&self, line: &str) -> Option<LineTimestamp> {
        scan_timestamp(line)
    }

    fn model<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.split(MODEL_MARKER).nth(1).map(str::trim)
    }

    fn source<'a>(&self, line: &'a str) -> Option<&'a str> {
        source_re()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Fold an ordered sequence of log lines into [`RunMetadata`] using the
/// backend's native log format.
pub fn parse_run_metadata(lines: &[String], detail: ModelDetail) -> RunMetadata {
    parse_run_metadata_with(lines, detail, &DefaultMatchers)
}

/// Fold an ordered sequence of log lines into [`RunMetadata`] with a custom
/// matcher set.
///
/// The first timestamp-bearing line fixes the start of the elapsed window;
/// the last one fixes the end. The model marker's last occurrence wins;
/// duplicate source URLs are counted once, in first-seen order.
pub fn parse_run_metadata_with<M: LineMatchers>(
    lines: &[String],
    detail: ModelDetail,
    matchers: &M,
) -> RunMetadata {
    let mut meta = RunMetadata::empty(detail);
    let mut first_secs: Option<u32> = None;
    let mut last_secs: Option<u32> = None;

    for (index, line) in lines.iter().enumerate() {
        if let Some(ts) = matchers.timestamp(line) {
            if index == 0 {
                if let Some(date) = ts.date {
                    let time = NaiveTime::from_num_seconds_from_midnight_opt(ts.secs, 0);
                    meta.start_date = time.map(|t| date.and_time(t));
                }
            }
            if first_secs.is_none() {
                first_secs = Some(ts.secs);
            }
            last_secs = Some(ts.secs);
        }

        if let Some(trimmed) = matchers.model(line) {
            let extracted = match detail {
                ModelDetail::ShortToken => trimmed.split_whitespace().next().unwrap_or(""),
                ModelDetail::FullText => trimmed,
            };
            if !extracted.is_empty() {
                meta.model_used = extracted.to_string();
            }
        }

        if let Some(url) = matchers.source(line) {
            if !meta.source_list.iter().any(|s| s == url) {
                meta.source_list.push(url.to_string());
            }
        }
    }

    if let (Some(first), Some(last)) = (first_secs, last_secs) {
        meta.generation_secs = elapsed_between(first, last);
    }
    meta.source_count = meta.source_list.len();
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scan_full_timestamp() {
        let ts = scan_timestamp("[2025-03-14 08:30:15] Crawl started").unwrap();
        assert_eq!(ts.secs, 8 * 3600 + 30 * 60 + 15);
        assert_eq!(ts.date, NaiveDate::from_ymd_opt(2025, 3, 14));
    }

    #[test]
    fn test_scan_short_timestamp() {
        let ts = scan_timestamp("[08:00:05] Fetching").unwrap();
        assert_eq!(ts.secs, 8 * 3600 + 5);
        assert!(ts.date.is_none());
    }

    #[test]
    fn test_scan_no_timestamp() {
        assert!(scan_timestamp("plain line with no bracket").is_none());
        assert!(scan_timestamp("mid-line [08:00:05] timestamp").is_none());
    }

    #[test]
    fn test_scan_rejects_out_of_range_clock() {
        assert!(scan_timestamp("[25:00:00] impossible hour").is_none());
        assert!(scan_timestamp("[10:61:00] impossible minute").is_none());
        assert!(scan_timestamp("[2025-02-30 10:00:00] bad date").is_none());
    }

    #[test]
    fn test_no_timestamps_means_zero_duration() {
        let meta = parse_run_metadata(
            &lines(&["starting up", "done"]),
            ModelDetail::ShortToken,
        );
        assert_eq!(meta.generation_secs, 0);
        assert!(meta.start_date.is_none());
    }

    #[test]
    fn test_single_timestamp_means_zero_duration() {
        let meta = parse_run_metadata(&lines(&["[08:00:00] only line"]), ModelDetail::ShortToken);
        assert_eq!(meta.generation_secs, 0);
    }

    #[test]
    fn test_simple_duration() {
        let meta = parse_run_metadata(
            &lines(&["[08:00:00] start", "no stamp here", "[08:00:05] end"]),
            ModelDetail::ShortToken,
        );
        assert_eq!(meta.generation_secs, 5);
    }

    #[test]
    fn test_midnight_rollover_duration() {
        let meta = parse_run_metadata(
            &lines(&["[23:59:50] start", "[00:00:10] end"]),
            ModelDetail::ShortToken,
        );
        assert_eq!(meta.generation_secs, 20);
    }

    #[test]
    fn test_last_timestamp_wins() {
        // A trailing line without a timestamp does not move the end marker.
        let meta = parse_run_metadata(
            &lines(&["[10:00:00] a", "[10:00:30] b", "wrapping up"]),
            ModelDetail::ShortToken,
        );
        assert_eq!(meta.generation_secs, 30);
    }

    #[test]
    fn test_sources_deduped_in_first_seen_order() {
        let meta = parse_run_metadata(
            &lines(&[
                "Processing Source: https://a.example",
                "Processing Secondary Source: https://b.example",
                "Retrying Source: https://a.example",
            ]),
            ModelDetail::ShortToken,
        );
        assert_eq!(meta.source_count, 2);
        assert_eq!(meta.source_list, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_model_granularities() {
        let input = lines(&["[09:00:00] Initializing LLM Provider: gpt-4o turbo"]);
        let short = parse_run_metadata(&input, ModelDetail::ShortToken);
        assert_eq!(short.model_used, "gpt-4o");
        let full = parse_run_metadata(&input, ModelDetail::FullText);
        assert_eq!(full.model_used, "gpt-4o turbo");
    }

    #[test]
    fn test_model_last_occurrence_wins() {
        let meta = parse_run_metadata(
            &lines(&[
                "Initializing LLM Provider: gpt-4o",
                "Initializing LLM Provider: llama-3-8b",
            ]),
            ModelDetail::FullText,
        );
        assert_eq!(meta.model_used, "llama-3-8b");
    }

    #[test]
    fn test_model_sentinel_when_absent() {
        let meta = parse_run_metadata(&lines(&["no marker"]), ModelDetail::FullText);
        assert_eq!(meta.model_used, "Hybrid Engine");
        assert!(meta.model_is_default(ModelDetail::FullText));
    }

    #[test]
    fn test_start_date_only_from_first_line() {
        let with_date = parse_run_metadata(
            &lines(&["[2025-03-14 08:30:15] begin", "[08:30:20] end"]),
            ModelDetail::FullText,
        );
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        assert_eq!(with_date.start_date, Some(expected));

        // Date on a later line does not count.
        let late_date = parse_run_metadata(
            &lines(&["begin", "[2025-03-14 08:30:15] end"]),
            ModelDetail::FullText,
        );
        assert!(late_date.start_date.is_none());
    }

    #[test]
    fn test_custom_matchers_reuse_the_fold() {
        // A pipe-delimited format: "<secs>|model=<m>|src=<url>|<text>"
        struct PipeMatchers;

        impl LineMatchers for PipeMatchers {
            fn timestamp(&self, line: &str) -> Option<LineTimestamp> {
                let secs = line.split('|').next()?.parse().ok()?;
                Some(LineTimestamp { secs, date: None })
            }

            fn model<'a>(&self, line: &'a str) -> Option<&'a str> {
                line.split('|').find_map(|f| f.strip_prefix("model="))
            }

            fn source<'a>(&self, line: &'a str) -> Option<&'a str> {
                line.split('|').find_map(|f| f.strip_prefix("src="))
            }
        }

        let meta = parse_run_metadata_with(
            &lines(&[
                "100|src=https://a.example|crawl",
                "115|model=mistral-7b|synthesize",
            ]),
            ModelDetail::FullText,
            &PipeMatchers,
        );
        assert_eq!(meta.generation_secs, 15);
        assert_eq!(meta.model_used, "mistral-7b");
        assert_eq!(meta.source_list, vec!["https://a.example"]);
    }

    #[test]
    fn test_bundled_fallback_fills_defaults_only() {
        let bundled = BundledMeta {
            source_count: Some(7),
            model_used: Some("archived-model".to_string()),
            generation_time: Some(42.0),
        };

        let derived = parse_run_metadata(
            &lines(&[
                "[08:00:00] Initializing LLM Provider: gpt-4o",
                "Source: https://a.example",
                "[08:00:09] done",
            ]),
            ModelDetail::ShortToken,
        );
        let merged = derived.or_bundled(&bundled, ModelDetail::ShortToken);
        // Log-derived non-defaults win.
        assert_eq!(merged.source_count, 1);
        assert_eq!(merged.model_used, "gpt-4o");
        assert_eq!(merged.generation_secs, 9);

        let empty = RunMetadata::empty(ModelDetail::ShortToken)
            .or_bundled(&bundled, ModelDetail::ShortToken);
        assert_eq!(empty.source_count, 7);
        assert_eq!(empty.model_used, "archived-model");
        assert_eq!(empty.generation_secs, 42);
    }
}
