//! Renderer-facing output
//!
//! The core never draws anything. Every state change produces a fresh
//! [`DisplayDescriptor`] and the external renderer decides what to do with
//! it.

use detent_protocol::Rgb;

/// Marker in front of the selected entry
pub const SELECTED_PREFIX: &str = "▶ ";

/// Center label when a list has nothing in it
pub const EMPTY_LIST_LABEL: &str = "⚠ Nothing to select";

/// Longest label a carousel slot shows, in characters
pub const MAX_LABEL_CHARS: usize = 22;

/// Glyphs shown next to the three wheel slots
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Icons {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl Icons {
    pub fn new(left: impl Into<String>, center: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            center: center.into(),
            right: right.into(),
        }
    }
}

/// What the overlay should show
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayDescriptor {
    pub title: String,
    pub left_label: String,
    pub center_label: String,
    pub right_label: String,
    pub icons: Option<Icons>,
    /// Always within `[0, 1]`
    pub progress: Option<f32>,
    pub theme_override: Option<Rgb>,
}

impl DisplayDescriptor {
    /// Three fixed labels
    pub fn labels(
        left: impl Into<String>,
        center: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            left_label: left.into(),
            center_label: center.into(),
            right_label: right.into(),
            ..Self::default()
        }
    }

    /// Wheel view of a list: previous, selected and next entry
    ///
    /// A single entry leaves the side slots empty. An empty list shows
    /// [`EMPTY_LIST_LABEL`].
    pub fn carousel<S: AsRef<str>>(entries: &[S], selected: usize) -> Self {
        let total = entries.len();
        match total {
            0 => Self::labels("", EMPTY_LIST_LABEL, ""),
            1 => Self::labels("", selected_label(entries[0].as_ref()), ""),
            _ => {
                let selected = selected % total;
                let prev = (selected + total - 1) % total;
                let next = (selected + 1) % total;
                Self::labels(
                    truncate(entries[prev].as_ref()),
                    selected_label(entries[selected].as_ref()),
                    truncate(entries[next].as_ref()),
                )
            }
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_icons(mut self, icons: Icons) -> Self {
        self.icons = Some(icons);
        self
    }

    /// Set the progress bar, clamped into `[0, 1]`
    ///
    /// NaN hides the bar.
    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = if progress.is_nan() {
            None
        } else {
            Some(progress.clamp(0.0, 1.0))
        };
        self
    }

    pub fn with_theme(mut self, color: Rgb) -> Self {
        self.theme_override = Some(color);
        self
    }
}

fn selected_label(name: &str) -> String {
    format!("{SELECTED_PREFIX}{}", truncate(name))
}

/// Cut a label to [`MAX_LABEL_CHARS`] characters
pub fn truncate(label: &str) -> String {
    label.chars().take(MAX_LABEL_CHARS).collect()
}

/// How a notification should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Short-lived message shown on top of the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub duration_ms: u32,
    pub level: NotificationLevel,
}

impl Notification {
    pub const EXECUTED_MS: u32 = 2000;
    pub const ERROR_MS: u32 = 3000;
    pub const RETURNED_MS: u32 = 1500;

    pub fn executed(command: &str) -> Self {
        Self {
            message: format!("Executed: {command}"),
            duration_ms: Self::EXECUTED_MS,
            level: NotificationLevel::Info,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            message: format!("Error: {message}"),
            duration_ms: Self::ERROR_MS,
            level: NotificationLevel::Error,
        }
    }

    pub fn returned_to_normal() -> Self {
        Self {
            message: "Returned to normal mode".to_string(),
            duration_ms: Self::RETURNED_MS,
            level: NotificationLevel::Info,
        }
    }
}
