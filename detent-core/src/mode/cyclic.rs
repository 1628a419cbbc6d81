//! Cyclic-list mode
//!
//! The list is built when the mode is entered (e.g. the open windows) and
//! kept as a snapshot until the frame pops. Snapshots stack, so the same
//! mode can sit on the frame stack more than once. Pressing commits the
//! selected item and exits.

use detent_protocol::Rgb;

use crate::direction::Direction;
use crate::display::DisplayDescriptor;
use crate::error::ActionError;

use super::{ModeHandler, PressOutcome, Selection};

type SourceFn<T> = Box<dyn FnMut() -> Result<Vec<T>, ActionError> + Send>;
type LabelFn<T> = Box<dyn Fn(&T) -> String + Send>;
type CommitFn<T> = Box<dyn FnMut(&T) -> Result<(), ActionError> + Send>;

pub struct CyclicHandler<T> {
    title: String,
    source: SourceFn<T>,
    label: LabelFn<T>,
    commit: CommitFn<T>,
    /// One entry per live frame of this mode, innermost last
    snapshots: Vec<Snapshot<T>>,
    accent: Option<Rgb>,
}

struct Snapshot<T> {
    items: Vec<T>,
    labels: Vec<String>,
}

impl<T: Send> CyclicHandler<T> {
    pub fn new<S, L, C>(title: impl Into<String>, source: S, label: L, commit: C) -> Self
    where
        S: FnMut() -> Result<Vec<T>, ActionError> + Send + 'static,
        L: Fn(&T) -> String + Send + 'static,
        C: FnMut(&T) -> Result<(), ActionError> + Send + 'static,
    {
        Self {
            title: title.into(),
            source: Box::new(source),
            label: Box::new(label),
            commit: Box::new(commit),
            snapshots: Vec::new(),
            accent: None,
        }
    }

    pub fn with_accent(mut self, color: Rgb) -> Self {
        self.accent = Some(color);
        self
    }

    /// Items captured for the innermost live frame
    pub fn snapshot(&self) -> &[T] {
        self.snapshots.last().map_or(&[][..], |s| s.items.as_slice())
    }

    fn describe(&self, selection: &Selection) -> DisplayDescriptor {
        let labels = self.snapshots.last().map_or(&[][..], |s| s.labels.as_slice());
        DisplayDescriptor::carousel(labels, selection.index()).with_title(self.title.as_str())
    }
}

impl<T: Send> ModeHandler for CyclicHandler<T> {
    fn on_enter(&mut self, selection: &mut Selection) -> Result<DisplayDescriptor, ActionError> {
        let items = (self.source)()?;
        let labels = items.iter().map(|item| (self.label)(item)).collect();
        *selection = Selection::new(items.len());
        self.snapshots.push(Snapshot { items, labels });
        Ok(self.describe(selection))
    }

    fn on_exit(&mut self, _selection: &Selection) -> Result<(), ActionError> {
        self.snapshots.pop();
        Ok(())
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
        let item = self
            .snapshots
            .last()
            .and_then(|s| s.items.get(selection.index()));
        match item {
            Some(item) => {
                (self.commit)(item)?;
                Ok(PressOutcome::Exit)
            }
            None => Ok(PressOutcome::Stay(self.describe(selection))),
        }
    }

    fn render(&self, selection: &Selection) -> DisplayDescriptor {
        self.describe(selection)
    }

    fn accent(&self) -> Option<Rgb> {
        self.accent
    }
}
