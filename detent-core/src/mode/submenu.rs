//! Submenu selector
//!
//! Rotation cycles a fixed local list; a press enters the selected child
//! mode or runs the selected action and leaves.

use detent_protocol::Rgb;

use crate::direction::Direction;
use crate::display::DisplayDescriptor;
use crate::error::ActionError;

use super::{ModeHandler, ModeId, PressOutcome, Selection};

type EntryAction = Box<dyn FnMut() -> Result<(), ActionError> + Send>;

enum Target {
    Mode(ModeId),
    Action(EntryAction),
}

pub struct SubmenuEntry {
    name: String,
    target: Target,
}

impl SubmenuEntry {
    /// Entry that pushes `mode` when pressed
    pub fn mode(name: impl Into<String>, mode: impl Into<ModeId>) -> Self {
        Self {
            name: name.into(),
            target: Target::Mode(mode.into()),
        }
    }

    /// Entry that runs `action` and then exits the submenu
    pub fn action<F>(name: impl Into<String>, action: F) -> Self
    where
        F: FnMut() -> Result<(), ActionError> + Send + 'static,
    {
        Self {
            name: name.into(),
            target: Target::Action(Box::new(action)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct SubmenuHandler {
    title: String,
    entries: Vec<SubmenuEntry>,
    accent: Option<Rgb>,
}

impl SubmenuHandler {
    pub fn new(title: impl Into<String>, entries: Vec<SubmenuEntry>) -> Self {
        Self {
            title: title.into(),
            entries,
            accent: None,
        }
    }

    pub fn with_accent(mut self, color: Rgb) -> Self {
        self.accent = Some(color);
        self
    }

    fn describe(&self, selection: &Selection) -> DisplayDescriptor {
        let names: Vec<&str> = self.entries.iter().map(SubmenuEntry::name).collect();
        DisplayDescriptor::carousel(&names, selection.index()).with_title(self.title.as_str())
    }
}

impl ModeHandler for SubmenuHandler {
    fn on_enter(&mut self, selection: &mut Selection) -> Result<DisplayDescriptor, ActionError> {
        *selection = Selection::new(self.entries.len());
        Ok(self.describe(selection))
    }

    fn on_rotation(
        &mut self,
        selection: &mut Selection,
        direction: Direction,
    ) -> Result<DisplayDescriptor, ActionError> {
        selection.step(direction);
        Ok(self.describe(selection))
    }

    fn on_press(&mut self, selection: &mut Selection) -> Result<PressOutcome, ActionError> {
        if selection.index() >= self.entries.len() {
            return Ok(PressOutcome::Stay(self.describe(selection)));
        }
        match &mut self.entries[selection.index()].target {
            Target::Mode(mode) => Ok(PressOutcome::EnterSubmode(mode.clone())),
            Target::Action(action) => {
                action()?;
                Ok(PressOutcome::Exit)
            }
        }
    }

    fn render(&self, selection: &Selection) -> DisplayDescriptor {
        self.describe(selection)
    }

    fn accent(&self) -> Option<Rgb> {
        self.accent
    }
}
