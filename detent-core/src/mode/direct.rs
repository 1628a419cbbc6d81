//! Direct-action mode
//!
//! Every detent and every press has an immediate effect, e.g. volume or
//! media transport. There is no local list; the selection stays empty.

use detent_protocol::Rgb;

use crate::direction::Direction;
use crate::display::{DisplayDescriptor, Icons};
use crate::error::ActionError;

use super::{ModeHandler, PressOutcome, Selection};

/// Live reading shown in the center slot, e.g. the current volume
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub label: String,
    /// Fill level in `[0, 1]`
    pub level: f32,
    /// Replaces the mode title while set, e.g. "🔇 Muted"
    pub title: Option<String>,
}

type RotateFn = Box<dyn FnMut(Direction) -> Result<(), ActionError> + Send>;
type PressFn = Box<dyn FnMut() -> Result<(), ActionError> + Send>;
type GaugeFn = Box<dyn Fn() -> Result<Gauge, ActionError> + Send>;

pub struct DirectHandler {
    title: String,
    labels: [String; 3],
    icons: Option<Icons>,
    accent: Option<Rgb>,
    rotate: RotateFn,
    press: Option<PressFn>,
    long_press: Option<PressFn>,
    gauge: Option<GaugeFn>,
}

impl DirectHandler {
    /// `labels` are the left, center and right slots (e.g. "Volume Down",
    /// "Mute", "Volume Up")
    pub fn new<F>(title: impl Into<String>, labels: [&str; 3], rotate: F) -> Self
    where
        F: FnMut(Direction) -> Result<(), ActionError> + Send + 'static,
    {
        Self {
            title: title.into(),
            labels: labels.map(str::to_string),
            icons: None,
            accent: None,
            rotate: Box::new(rotate),
            press: None,
            long_press: None,
            gauge: None,
        }
    }

    pub fn on_press<F>(mut self, press: F) -> Self
    where
        F: FnMut() -> Result<(), ActionError> + Send + 'static,
    {
        self.press = Some(Box::new(press));
        self
    }

    pub fn on_long_press<F>(mut self, press: F) -> Self
    where
        F: FnMut() -> Result<(), ActionError> + Send + 'static,
    {
        self.long_press = Some(Box::new(press));
        self
    }

    pub fn with_gauge<F>(mut self, gauge: F) -> Self
    where
        F: Fn() -> Result<Gauge, ActionError> + Send + 'static,
    {
        self.gauge = Some(Box::new(gauge));
        self
    }

    pub fn with_icons(mut self, icons: Icons) -> Self {
        self.icons = Some(icons);
        self
    }

    pub fn with_accent(mut self, color: Rgb) -> Self {
        self.accent = Some(color);
        self
    }

    fn describe(&self) -> Result<DisplayDescriptor, ActionError> {
        let [left, center, right] = &self.labels;
        let mut display =
            DisplayDescriptor::labels(left.as_str(), center.as_str(), right.as_str())
                .with_title(self.title.as_str());
        if let Some(icons) = &self.icons {
            display = display.with_icons(icons.clone());
        }
        if let Some(gauge) = &self.gauge {
            let reading = gauge()?;
            display.center_label = reading.label;
            if let Some(title) = reading.title {
                display.title = title;
            }
            display = display.with_progress(reading.level);
        }
        Ok(display)
    }
}

impl ModeHandler for DirectHandler {
    fn on_enter(&mut self, selection: &mut Selection) -> Result<DisplayDescriptor, ActionError> {
        selection.set_len(0);
        self.describe()
    }

    fn on_rotation(
        &mut self,
        _selection: &mut Selection,
        direction: Direction,
    ) -> Result<DisplayDescriptor, ActionError> {
        (self.rotate)(direction)?;
        self.describe()
    }

    fn on_press(&mut self, _selection: &mut Selection) -> Result<PressOutcome, ActionError> {
        if let Some(press) = self.press.as_mut() {
            press()?;
        }
        self.describe().map(PressOutcome::Stay)
    }

    fn on_long_press(
        &mut self,
        _selection: &mut Selection,
    ) -> Result<Option<PressOutcome>, ActionError> {
        let Some(press) = self.long_press.as_mut() else {
            return Ok(None);
        };
        press()?;
        self.describe().map(|d| Some(PressOutcome::Stay(d)))
    }

    fn render(&self, _selection: &Selection) -> DisplayDescriptor {
        // A failing gauge still leaves the static labels on screen
        self.describe().unwrap_or_else(|err| {
            log::warn!("{}: gauge unavailable: {err}", self.title);
            let [left, center, right] = &self.labels;
            DisplayDescriptor::labels(left.as_str(), center.as_str(), right.as_str())
                .with_title(self.title.as_str())
        })
    }

    fn accent(&self) -> Option<Rgb> {
        self.accent
    }
}
