//! Application state and navigation logic.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::client::ApiClient;
use crate::data::{
    parse_run_metadata, ModelDetail, NewSchedule, NewSource, Report, RunMetadata, Schedule,
    SettingUpdate, Settings, Source, IDLE_STATUS,
};
use crate::poll::{HealthMonitor, HealthSignal, IntelligenceSignal, StatusWatcher, Update};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live status, next run, and the latest briefings.
    Dashboard,
    /// Full report archive.
    Reports,
    /// Monitored source URLs.
    Sources,
    /// Recurring generation triggers.
    Schedules,
    /// Backend configuration.
    Settings,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Reports,
        View::Sources,
        View::Schedules,
        View::Settings,
    ];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Reports => "Reports",
            View::Sources => "Sources",
            View::Schedules => "Schedules",
            View::Settings => "Settings",
        }
    }
}

/// Active text-entry prompt, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// URL for a new source.
    AddSourceUrl,
    /// Optional display name for a new source (empty = none).
    AddSourceName { url: String },
    /// HH:MM time for a new schedule.
    AddScheduleTime,
    /// Recipient address for sharing the selected report.
    ShareEmail { report_id: i64 },
    /// New value for a settings key.
    EditSetting { key: String },
}

impl InputMode {
    /// Prompt label shown in the input line.
    pub fn prompt(&self) -> String {
        match self {
            InputMode::AddSourceUrl => "Source URL".to_string(),
            InputMode::AddSourceName { .. } => "Source name (optional)".to_string(),
            InputMode::AddScheduleTime => "Schedule time (HH:MM)".to_string(),
            InputMode::ShareEmail { .. } => "Recipient email".to_string(),
            InputMode::EditSetting { key } => format!("New value for {key}"),
        }
    }
}

/// Settings keys offered for editing, in display order. Keys the backend
/// returns beyond these are appended after them.
const KNOWN_SETTING_KEYS: &[&str] = &[
    "llm_provider",
    "llm_base_url",
    "llm_model",
    "llm_api_key",
    "smtp_host",
    "smtp_port",
    "smtp_user",
    "smtp_pass",
    "smtp_stream",
    "research_breadth",
    "research_depth",
];

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,
    pub detail_scroll: u16,

    handle: Handle,
    client: ApiClient,
    rx: UnboundedReceiver<Update>,
    tx: UnboundedSender<Update>,
    monitor: HealthMonitor,
    watcher: StatusWatcher,

    // Live display state, overwritten by poll updates (last write wins)
    pub system_health: HealthSignal,
    pub system_service: Option<String>,
    pub intelligence: IntelligenceSignal,
    pub job_status: String,

    // Fetched collections
    pub settings: Option<Settings>,
    pub settings_error: Option<String>,
    pub setting_keys: Vec<String>,
    pub local_models: Vec<String>,
    pub reports: Vec<Report>,
    pub sources: Vec<Source>,
    pub schedules: Vec<Schedule>,
    pub next_run: Option<DateTime<Utc>>,

    // Navigation state
    pub selected_report: usize,
    pub selected_source: usize,
    pub selected_schedule: usize,
    pub selected_setting: usize,

    // Text entry
    pub input_mode: Option<InputMode>,
    pub input_buffer: String,

    // UI
    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app around already-spawned background watchers.
    ///
    /// Must be called from within the runtime context that `handle`
    /// belongs to.
    pub fn new(
        handle: Handle,
        client: ApiClient,
        monitor: HealthMonitor,
        watcher: StatusWatcher,
        tx: UnboundedSender<Update>,
        rx: UnboundedReceiver<Update>,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_detail_overlay: false,
            detail_scroll: 0,
            handle,
            client,
            rx,
            tx,
            monitor,
            watcher,
            system_health: HealthSignal::Unknown,
            system_service: None,
            intelligence: IntelligenceSignal::NotApplicable,
            job_status: IDLE_STATUS.to_string(),
            settings: None,
            settings_error: None,
            setting_keys: Vec::new(),
            local_models: Vec::new(),
            reports: Vec::new(),
            sources: Vec::new(),
            schedules: Vec::new(),
            next_run: None,
            selected_report: 0,
            selected_source: 0,
            selected_schedule: 0,
            selected_setting: 0,
            input_mode: None,
            input_buffer: String::new(),
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Whether the configuration could not be loaded at all. The settings
    /// view shows a blocking setup-required screen in this state, distinct
    /// from a transient probe failure.
    pub fn setup_required(&self) -> bool {
        self.settings.is_none() && self.settings_error.is_some()
    }

    /// True while a generation run is in progress.
    pub fn run_active(&self) -> bool {
        self.job_status != IDLE_STATUS
    }

    /// Set a temporary status message shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    // --- initial / on-demand fetching ---

    /// Fetch everything once at startup.
    pub fn load_initial(&mut self) {
        self.reload_settings();
        self.reload_reports();
        self.reload_sources();
        self.reload_schedules();
        self.reload_next_run();
    }

    /// Fetch the settings snapshot, replace the old one wholesale, and
    /// reconcile the health monitor against it.
    pub fn reload_settings(&mut self) {
        match self.handle.block_on(self.client.settings()) {
            Ok(settings) => {
                self.setting_keys = ordered_setting_keys(&settings);
                self.settings = Some(settings);
                self.settings_error = None;
            }
            Err(err) => {
                warn!(%err, "settings fetch failed");
                self.settings_error = Some(err.to_string());
            }
        }
        // Spawning the probe loops needs the runtime context; the draw
        // loop runs outside it.
        let _guard = self.handle.enter();
        self.monitor.reconcile(self.settings.as_ref());
    }

    pub fn reload_reports(&mut self) {
        match self.handle.block_on(self.client.reports()) {
            Ok(reports) => self.set_reports(reports),
            Err(err) => self.set_status_message(format!("Failed to load reports: {err}")),
        }
    }

    pub fn reload_sources(&mut self) {
        match self.handle.block_on(self.client.sources()) {
            Ok(sources) => {
                self.sources = sources;
                self.clamp_selections();
            }
            Err(err) => self.set_status_message(format!("Failed to load sources: {err}")),
        }
    }

    pub fn reload_schedules(&mut self) {
        match self.handle.block_on(self.client.schedules()) {
            Ok(schedules) => {
                self.schedules = schedules;
                self.clamp_selections();
            }
            Err(err) => self.set_status_message(format!("Failed to load schedules: {err}")),
        }
    }

    pub fn reload_next_run(&mut self) {
        match self.handle.block_on(self.client.next_run()) {
            Ok(next) => self.next_run = next.next_run,
            Err(err) => warn!(%err, "next-run fetch failed"),
        }
    }

    fn set_reports(&mut self, mut reports: Vec<Report>) {
        // Newest first
        reports.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        self.reports = reports;
        self.clamp_selections();
    }

    /// Refetch the reports list off the UI thread; the result arrives as
    /// an [`Update::Reports`] message.
    fn spawn_reports_refresh(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            match client.reports().await {
                Ok(reports) => {
                    let _ = tx.send(Update::Reports(reports));
                }
                Err(err) => warn!(%err, "background reports refresh failed"),
            }
        });
    }

    /// Drain pending poll updates into display state. Called once per
    /// frame; later messages win.
    pub fn drain_updates(&mut self) {
        while let Ok(update) = self.rx.try_recv() {
            match update {
                Update::SystemHealth { signal, service } => {
                    self.system_health = signal;
                    self.system_service = service;
                }
                Update::Intelligence(signal) => self.intelligence = signal,
                Update::JobStatus(status) => self.job_status = status,
                Update::RunFinished => {
                    self.spawn_reports_refresh();
                    self.reload_next_run();
                }
                Update::Reports(reports) => self.set_reports(reports),
            }
        }
    }

    // --- user actions (errors surface synchronously as status messages) ---

    /// Trigger a generation run.
    pub fn generate_report(&mut self) {
        if self.run_active() {
            self.set_status_message("A run is already in progress".to_string());
            return;
        }
        match self.handle.block_on(self.client.generate_report()) {
            Ok(()) => self.set_status_message("Generation started in background".to_string()),
            Err(err) => self.set_status_message(format!("Failed to start generation: {err}")),
        }
    }

    pub fn delete_selected_report(&mut self) {
        let Some(report) = self.reports.get(self.selected_report) else {
            return;
        };
        let id = report.id;
        let title = report.title.clone();
        match self.handle.block_on(self.client.delete_report(id)) {
            Ok(()) => {
                self.set_status_message(format!("Deleted \"{title}\""));
                self.show_detail_overlay = false;
                self.reload_reports();
            }
            Err(err) => self.set_status_message(format!("Delete failed: {err}")),
        }
    }

    /// Download the selected report's PDF into the working directory.
    pub fn download_selected_pdf(&mut self) {
        let Some(report) = self.reports.get(self.selected_report) else {
            return;
        };
        let id = report.id;
        match self.handle.block_on(self.client.report_pdf(id)) {
            Ok(bytes) => {
                let path = format!("luxprima_briefing_{id}.pdf");
                match std::fs::write(&path, bytes) {
                    Ok(()) => self.set_status_message(format!("Saved {path}")),
                    Err(err) => self.set_status_message(format!("Write failed: {err}")),
                }
            }
            Err(err) => self.set_status_message(format!("PDF download failed: {err}")),
        }
    }

    fn share_report(&mut self, report_id: i64, email: &str) {
        match self
            .handle
            .block_on(self.client.share_report(report_id, email))
        {
            Ok(()) => self.set_status_message(format!("Briefing shared with {email}")),
            Err(err) => self.set_status_message(format!("Share failed: {err}")),
        }
    }

    fn add_source(&mut self, url: String, name: Option<String>) {
        let new = NewSource::primary(url, name);
        match self.handle.block_on(self.client.create_source(&new)) {
            Ok(_) => {
                self.set_status_message("Source added".to_string());
                self.reload_sources();
            }
            Err(err) => self.set_status_message(format!("Failed to add source: {err}")),
        }
    }

    pub fn delete_selected_source(&mut self) {
        let Some(source) = self.sources.get(self.selected_source) else {
            return;
        };
        let id = source.id;
        match self.handle.block_on(self.client.delete_source(id)) {
            Ok(()) => {
                self.set_status_message("Source deleted".to_string());
                self.reload_sources();
            }
            Err(err) => self.set_status_message(format!("Delete failed: {err}")),
        }
    }

    fn add_schedule(&mut self, time: String) {
        let new = NewSchedule {
            time,
            is_active: true,
        };
        match self.handle.block_on(self.client.create_schedule(&new)) {
            Ok(_) => {
                self.set_status_message("Schedule added".to_string());
                self.reload_schedules();
                self.reload_next_run();
            }
            // The backend rejects anything that is not HH:MM
            Err(err) => self.set_status_message(format!("Failed to add schedule: {err}")),
        }
    }

    pub fn delete_selected_schedule(&mut self) {
        let Some(schedule) = self.schedules.get(self.selected_schedule) else {
            return;
        };
        let id = schedule.id;
        match self.handle.block_on(self.client.delete_schedule(id)) {
            Ok(()) => {
                self.set_status_message("Schedule removed".to_string());
                self.reload_schedules();
                self.reload_next_run();
            }
            Err(err) => self.set_status_message(format!("Delete failed: {err}")),
        }
    }

    fn apply_setting(&mut self, key: &str, value: String) {
        let update = vec![SettingUpdate {
            key: key.to_string(),
            value,
        }];
        match self.handle.block_on(self.client.save_settings(&update)) {
            Ok(settings) => {
                self.setting_keys = ordered_setting_keys(&settings);
                self.settings = Some(settings);
                self.settings_error = None;
                self.set_status_message(format!("Saved {key}"));
                // A provider or base-URL change may enable/disable the
                // intelligence probe.
                let _guard = self.handle.enter();
                self.monitor.reconcile(self.settings.as_ref());
            }
            Err(err) => self.set_status_message(format!("Save failed: {err}")),
        }
    }

    /// Query the configured local endpoint for its model list.
    pub fn sync_local_models(&mut self) {
        let Some(base) = self
            .settings
            .as_ref()
            .and_then(|s| s.llm_base_url().map(str::to_string))
        else {
            self.set_status_message("No llm_base_url configured".to_string());
            return;
        };
        match self.handle.block_on(self.client.local_models(&base)) {
            Ok(models) => {
                if let Some(err) = models.error {
                    self.set_status_message(format!("Model sync failed: {err}"));
                } else {
                    self.set_status_message(format!("{} models available", models.models.len()));
                    self.local_models = models.models;
                }
            }
            Err(err) => self.set_status_message(format!("Model sync failed: {err}")),
        }
    }

    // --- text entry ---

    /// Open a text prompt.
    pub fn start_input(&mut self, mode: InputMode) {
        // Pre-fill with the current value when editing a setting
        if let InputMode::EditSetting { key } = &mode {
            self.input_buffer = self
                .settings
                .as_ref()
                .and_then(|s| s.get(key))
                .unwrap_or("")
                .to_string();
        } else {
            self.input_buffer.clear();
        }
        self.input_mode = Some(mode);
    }

    /// Cancel the active prompt without applying it.
    pub fn cancel_input(&mut self) {
        self.input_mode = None;
        self.input_buffer.clear();
    }

    /// Apply the active prompt's buffer.
    pub fn submit_input(&mut self) {
        let Some(mode) = self.input_mode.take() else {
            return;
        };
        let value = std::mem::take(&mut self.input_buffer);
        let value = value.trim().to_string();
        match mode {
            InputMode::AddSourceUrl => {
                if value.is_empty() {
                    return;
                }
                // Chain into the optional-name prompt
                self.start_input(InputMode::AddSourceName { url: value });
            }
            InputMode::AddSourceName { url } => {
                let name = if value.is_empty() { None } else { Some(value) };
                self.add_source(url, name);
            }
            InputMode::AddScheduleTime => {
                if !value.is_empty() {
                    self.add_schedule(value);
                }
            }
            InputMode::ShareEmail { report_id } => {
                if !value.is_empty() {
                    self.share_report(report_id, &value);
                }
            }
            InputMode::EditSetting { key } => {
                self.apply_setting(&key, value);
            }
        }
    }

    pub fn input_push(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn input_pop(&mut self) {
        self.input_buffer.pop();
    }

    // --- navigation ---

    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
    }

    /// Number of selectable rows in the current view.
    fn current_list_len(&self) -> usize {
        match self.current_view {
            View::Dashboard | View::Reports => self.reports.len(),
            View::Sources => self.sources.len(),
            View::Schedules => self.schedules.len(),
            View::Settings => self.setting_keys.len(),
        }
    }

    fn current_selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Dashboard | View::Reports => &mut self.selected_report,
            View::Sources => &mut self.selected_source,
            View::Schedules => &mut self.selected_schedule,
            View::Settings => &mut self.selected_setting,
        }
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        if self.show_detail_overlay {
            self.detail_scroll = self.detail_scroll.saturating_add(n as u16);
            return;
        }
        let max = self.current_list_len().saturating_sub(1);
        let sel = self.current_selection_mut();
        *sel = (*sel + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        if self.show_detail_overlay {
            self.detail_scroll = self.detail_scroll.saturating_sub(n as u16);
            return;
        }
        let sel = self.current_selection_mut();
        *sel = sel.saturating_sub(n);
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_first(&mut self) {
        *self.current_selection_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let max = self.current_list_len().saturating_sub(1);
        *self.current_selection_mut() = max;
    }

    fn clamp_selections(&mut self) {
        self.selected_report = self.selected_report.min(self.reports.len().saturating_sub(1));
        self.selected_source = self.selected_source.min(self.sources.len().saturating_sub(1));
        self.selected_schedule = self
            .selected_schedule
            .min(self.schedules.len().saturating_sub(1));
        self.selected_setting = self
            .selected_setting
            .min(self.setting_keys.len().saturating_sub(1));
    }

    /// Open the detail overlay for the selected report.
    pub fn enter_detail(&mut self) {
        if matches!(self.current_view, View::Dashboard | View::Reports)
            && !self.reports.is_empty()
        {
            self.show_detail_overlay = true;
            self.detail_scroll = 0;
        }
    }

    /// Close overlays first, then fall back to the dashboard.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_view != View::Dashboard {
            self.current_view = View::Dashboard;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// The report currently selected, if any.
    pub fn selected_report(&self) -> Option<&Report> {
        self.reports.get(self.selected_report)
    }

    /// Derived metadata for a report, with the bundled fallback applied.
    pub fn report_meta(&self, report: &Report, detail: ModelDetail) -> RunMetadata {
        let meta = parse_run_metadata(&report.logs, detail);
        match &report.content_json {
            Some(bundled) => meta.or_bundled(bundled, detail),
            None => meta,
        }
    }

    /// Signal the application to quit and tear down the pollers.
    pub fn quit(&mut self) {
        self.watcher.stop();
        self.monitor.stop();
        self.running = false;
    }
}

/// Known keys in display order, then any extra keys the backend returned.
fn ordered_setting_keys(settings: &Settings) -> Vec<String> {
    let mut keys: Vec<String> = KNOWN_SETTING_KEYS.iter().map(|k| k.to_string()).collect();
    let mut extra: Vec<String> = settings
        .0
        .keys()
        .filter(|k| !KNOWN_SETTING_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    extra.sort();
    keys.extend(extra);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_cycles_through_all() {
        let mut view = View::Dashboard;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Dashboard);
        assert_eq!(View::Dashboard.prev(), View::Settings);
    }

    #[test]
    fn test_ordered_setting_keys_appends_unknown() {
        let mut map = std::collections::HashMap::new();
        map.insert("llm_provider".to_string(), "local".to_string());
        map.insert("custom_flag".to_string(), "on".to_string());
        let keys = ordered_setting_keys(&Settings(map));
        assert_eq!(keys[0], "llm_provider");
        assert_eq!(keys.last().map(String::as_str), Some("custom_flag"));
        assert_eq!(keys.len(), KNOWN_SETTING_KEYS.len() + 1);
    }

    #[test]
    fn test_input_prompt_labels() {
        assert_eq!(InputMode::AddScheduleTime.prompt(), "Schedule time (HH:MM)");
        let edit = InputMode::EditSetting {
            key: "llm_model".to_string(),
        };
        assert_eq!(edit.prompt(), "New value for llm_model");
    }
}
