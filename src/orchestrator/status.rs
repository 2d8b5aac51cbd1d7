//! User-facing status reporting.
//!
//! The host UI implements [`StatusSink`]. The orchestrator only reports
//! through it and never touches UI state directly.

/// Icon family of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
    Warning,
    Camera,
}

/// A dismissable status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub title: String,
    pub body: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn loading(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(StatusKind::Loading, title, body)
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, title, body)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, title, body)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(StatusKind::Warning, title, body)
    }

    pub fn camera(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(StatusKind::Camera, title, body)
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

/// Host UI hooks.
pub trait StatusSink {
    /// Shows an in-progress message.
    fn show(&mut self, message: &StatusMessage);

    /// Moves the progress bar (0-100).
    fn progress(&mut self, percent: u8);

    /// Hides the loading indicator and resets progress.
    fn finish_loading(&mut self);

    /// Asks whether a challenge capture may start for this attempt.
    fn allow_capture(&mut self, _attempt_number: u32) -> bool {
        true
    }
}

/// Records every update; used by tests and the demo CLI.
#[derive(Debug, Default, Clone)]
pub struct RecordingStatus {
    pub shown: Vec<StatusMessage>,
    pub progress: Vec<u8>,
    pub loading: bool,
    pub finished: usize,
    /// Answer to [`StatusSink::allow_capture`].
    pub deny_capture: bool,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying_capture() -> Self {
        Self {
            deny_capture: true,
            ..Self::default()
        }
    }
}

impl StatusSink for RecordingStatus {
    fn show(&mut self, message: &StatusMessage) {
        self.loading = true;
        self.shown.push(message.clone());
    }

    fn progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }

    fn finish_loading(&mut self) {
        self.loading = false;
        self.finished += 1;
    }

    fn allow_capture(&mut self, _attempt_number: u32) -> bool {
        !self.deny_capture
    }
}

/// A visible loading indicator. Cleared when dropped, so every exit path
/// of a submission ends with the indicator hidden.
pub struct Loading<'a> {
    sink: &'a mut dyn StatusSink,
}

impl<'a> Loading<'a> {
    pub fn start(sink: &'a mut dyn StatusSink, message: StatusMessage) -> Self {
        sink.show(&message);
        Self { sink }
    }

    pub fn show(&mut self, message: StatusMessage) {
        self.sink.show(&message);
    }

    pub fn progress(&mut self, percent: u8) {
        self.sink.progress(percent.min(100));
    }

    pub fn allow_capture(&mut self, attempt_number: u32) -> bool {
        self.sink.allow_capture(attempt_number)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.sink.finish_loading();
    }
}
