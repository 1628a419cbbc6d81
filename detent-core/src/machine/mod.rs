//! Menu state machine
//!
//! Owns the command registry, the mode handlers and the frame stack. All
//! input arrives through the `handle_*` methods and [`MenuStateMachine::tick`]
//! on a single thread; everything the outside world needs to see is queued
//! as [`Output`] and collected with [`MenuStateMachine::drain_outputs`].
//!
//! Callbacks into commands and handlers go through one containment point.
//! An `Err` or a panic there becomes an error notification and the call is
//! treated as `Stay`: the frame stack, the frame's selection and the command
//! index are exactly what they were before the call.

pub mod state;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use detent_protocol::Rgb;
use log::{debug, info, trace, warn};

use crate::config::Config;
use crate::direction::{infer_direction, Direction};
use crate::display::{DisplayDescriptor, Notification};
use crate::error::{ActionError, RegistryError};
use crate::mode::{ModeHandler, ModeId, PressOutcome, Selection};
use crate::registry::{CommandOutcome, CommandRegistry};

pub use state::{AppState, Frame};

type Handler = Box<dyn ModeHandler>;

/// Something the renderer or the LED feedback should act on
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Display(DisplayDescriptor),
    Notify(Notification),
    /// The mode on top of the stack changed; `None` is the command list
    ModeChanged {
        mode: Option<ModeId>,
        accent: Option<Rgb>,
    },
}

pub struct MenuStateMachine {
    registry: CommandRegistry,
    handlers: HashMap<ModeId, Handler>,
    state: AppState,
    menu_timeout_ms: u64,
    rotation_slots: usize,
    outputs: Vec<Output>,
}

impl MenuStateMachine {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: CommandRegistry::new(),
            handlers: HashMap::new(),
            state: AppState::default(),
            menu_timeout_ms: config.menu_timeout_ms,
            rotation_slots: config.rotation_slots,
            outputs: Vec::new(),
        }
    }

    /// Append a command to the root list, returning its index
    pub fn register_command<F>(
        &mut self,
        name: impl Into<String>,
        action: F,
    ) -> Result<usize, RegistryError>
    where
        F: FnMut() -> Result<CommandOutcome, ActionError> + Send + 'static,
    {
        self.registry.register(name, action)
    }

    pub fn register_mode_handler<H>(
        &mut self,
        mode: impl Into<ModeId>,
        handler: H,
    ) -> Result<(), RegistryError>
    where
        H: ModeHandler + 'static,
    {
        let mode = mode.into();
        if self.handlers.contains_key(&mode) {
            return Err(RegistryError::DuplicateMode(mode));
        }
        self.handlers.insert(mode, Box::new(handler));
        Ok(())
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Frame count including the root
    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    pub fn current_command_index(&self) -> usize {
        self.state.current_command_index
    }

    /// Mode on top of the stack, `None` at the root
    pub fn active_mode(&self) -> Option<&ModeId> {
        self.state.top().map(|frame| &frame.mode)
    }

    /// Local selection of the top frame, `None` at the root
    pub fn selection(&self) -> Option<Selection> {
        self.state.top().map(|frame| frame.selection)
    }

    /// Take every output queued since the last call, in emission order
    pub fn drain_outputs(&mut self) -> Vec<Output> {
        std::mem::take(&mut self.outputs)
    }

    /// Show the command list; call once after registration
    pub fn start(&mut self, now: u64) {
        self.state.last_activity_ms = now;
        self.show_current();
    }

    /// Absolute rotation index from the device
    ///
    /// The direction is inferred against the previous index. At the root the
    /// selection moves exactly one command in that direction no matter how
    /// far the index jumped; inside a mode the direction goes to the handler.
    pub fn handle_rotation(&mut self, raw_index: usize, now: u64) {
        self.expire(now);

        let modulus = self.rotation_modulus();
        let prev = std::mem::replace(&mut self.state.last_rotation_index, raw_index);
        let Some(inferred) = infer_direction(prev, raw_index, modulus) else {
            debug!("rotation index {raw_index} unchanged, ignored");
            return;
        };
        if inferred.is_skip() {
            debug!(
                "rotation {prev} -> {raw_index} skipped {} slots of {modulus}, resolved {:?}",
                inferred.distance - 1,
                inferred.direction
            );
        } else {
            debug!("rotation {prev} -> {raw_index}: {:?}", inferred.direction);
        }

        self.step(inferred.direction, now);
    }

    /// Rotation with a known direction
    pub fn handle_step(&mut self, direction: Direction, now: u64) {
        self.expire(now);
        self.step(direction, now);
    }

    pub fn handle_press(&mut self, now: u64) {
        self.expire(now);

        if self.state.is_root() {
            self.run_selected_command(now);
            return;
        }

        self.state.last_activity_ms = now;
        if let Some(outcome) = self.call_top("press", |handler, sel| handler.on_press(sel)) {
            self.apply_outcome(outcome, now);
        }
    }

    /// Pop exactly one frame; nothing happens at the root
    pub fn handle_cancel(&mut self, now: u64) {
        self.expire(now);

        if self.state.is_root() {
            debug!("cancel at root ignored");
            return;
        }
        self.state.last_activity_ms = now;
        self.pop_frame();
        self.show_after_pop();
    }

    /// Alternate action of the active mode, if it has one
    pub fn handle_long_press(&mut self, now: u64) {
        self.expire(now);

        if self.state.is_root() {
            debug!("long press at root ignored");
            return;
        }
        self.state.last_activity_ms = now;
        match self.call_top("long press", |handler, sel| handler.on_long_press(sel)) {
            Some(Some(outcome)) => self.apply_outcome(outcome, now),
            Some(None) => debug!("long press not supported by this mode"),
            None => {}
        }
    }

    /// Enforce the inactivity timeout
    pub fn tick(&mut self, now: u64) {
        trace!("tick at {now} ms, depth {}", self.depth());
        self.expire(now);
    }

    fn rotation_modulus(&self) -> usize {
        self.rotation_slots.max(2)
    }

    fn step(&mut self, direction: Direction, now: u64) {
        if self.state.is_root() {
            let count = self.registry.len();
            if count == 0 {
                return;
            }
            self.state.current_command_index =
                direction.step(self.state.current_command_index, count);
            self.emit_root_display();
            return;
        }

        self.state.last_activity_ms = now;
        if let Some(display) =
            self.call_top("rotation", |handler, sel| handler.on_rotation(sel, direction))
        {
            self.outputs.push(Output::Display(display));
        }
    }

    fn run_selected_command(&mut self, now: u64) {
        let index = self.state.current_command_index;
        let Some(command) = self.registry.get_mut(index) else {
            debug!("press with no commands registered");
            return;
        };
        let name = command.name().to_string();

        match contain(|| command.run()) {
            Ok(CommandOutcome::Done) => {
                info!("executed command `{name}`");
                self.outputs.push(Output::Notify(Notification::executed(&name)));
            }
            Ok(CommandOutcome::EnterMode(mode)) => {
                info!("command `{name}` enters mode `{mode}`");
                self.push_frame(mode, now);
            }
            Err(err) => self.report(&format!("command `{name}`"), &err),
        }
    }

    fn apply_outcome(&mut self, outcome: PressOutcome, now: u64) {
        match outcome {
            PressOutcome::Stay(display) => self.outputs.push(Output::Display(display)),
            PressOutcome::EnterSubmode(mode) => self.push_frame(mode, now),
            PressOutcome::Exit => {
                self.pop_frame();
                self.show_after_pop();
            }
        }
    }

    fn push_frame(&mut self, mode: ModeId, now: u64) {
        let Some(handler) = self.handlers.get_mut(&mode) else {
            let err = ActionError::new(format!("no handler for mode `{mode}`"));
            self.report("enter", &err);
            return;
        };

        let mut selection = Selection::default();
        let display = match contain(|| handler.on_enter(&mut selection)) {
            Ok(display) => display,
            Err(err) => {
                self.report(&format!("entering `{mode}`"), &err);
                return;
            }
        };
        selection.clamp();
        let accent = handler.accent();

        info!("entered mode `{mode}` (depth {})", self.depth() + 1);
        self.state.frames.push(Frame {
            mode: mode.clone(),
            selection,
        });
        self.state.last_activity_ms = now;
        self.outputs.push(Output::ModeChanged {
            mode: Some(mode),
            accent,
        });
        self.outputs.push(Output::Display(display));
    }

    /// Pop the top frame and run its `on_exit`
    ///
    /// The frame is gone even if `on_exit` fails.
    fn pop_frame(&mut self) {
        let Some(frame) = self.state.frames.pop() else {
            return;
        };
        info!("left mode `{}`", frame.mode);

        if let Some(handler) = self.handlers.get_mut(&frame.mode) {
            if let Err(err) = contain(|| handler.on_exit(&frame.selection)) {
                self.report(&format!("leaving `{}`", frame.mode), &err);
            }
        }
    }

    /// Announce whatever is on top now, after one or more pops
    fn show_current(&mut self) {
        let Some(frame) = self.state.top() else {
            self.outputs.push(Output::ModeChanged {
                mode: None,
                accent: None,
            });
            self.emit_root_display();
            return;
        };

        let mode = frame.mode.clone();
        let selection = frame.selection;
        let Some(handler) = self.handlers.get(&mode) else {
            return;
        };
        let accent = handler.accent();
        let rendered = contain(|| Ok(handler.render(&selection)));

        self.outputs.push(Output::ModeChanged {
            mode: Some(mode.clone()),
            accent,
        });
        match rendered {
            Ok(display) => self.outputs.push(Output::Display(display)),
            Err(err) => self.report(&format!("rendering `{mode}`"), &err),
        }
    }

    fn show_after_pop(&mut self) {
        self.show_current();
        if self.state.is_root() {
            self.outputs
                .push(Output::Notify(Notification::returned_to_normal()));
        }
    }

    fn emit_root_display(&mut self) {
        let display = DisplayDescriptor::carousel(
            &self.registry.names(),
            self.state.current_command_index,
        );
        self.outputs.push(Output::Display(display));
    }

    /// Pop every frame if the top one has been idle for the timeout
    fn expire(&mut self, now: u64) -> bool {
        if self.state.is_root() {
            return false;
        }
        let idle = now.saturating_sub(self.state.last_activity_ms);
        if idle < self.menu_timeout_ms {
            return false;
        }

        info!("menu idle for {idle} ms, returning to normal mode");
        while !self.state.is_root() {
            self.pop_frame();
        }
        self.show_after_pop();
        true
    }

    /// Run a handler method against a scratch copy of the top frame's
    /// selection, committing it only on success
    fn call_top<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut Handler, &mut Selection) -> Result<T, ActionError>,
    ) -> Option<T> {
        let frame = self.state.top()?;
        let mode = frame.mode.clone();
        let mut scratch = frame.selection;
        let handler = self.handlers.get_mut(&mode)?;

        match contain(|| f(handler, &mut scratch)) {
            Ok(value) => {
                scratch.clamp();
                if let Some(frame) = self.state.frames.last_mut() {
                    frame.selection = scratch;
                }
                Some(value)
            }
            Err(err) => {
                self.report(&format!("{what} in `{mode}`"), &err);
                None
            }
        }
    }

    fn report(&mut self, context: &str, err: &ActionError) {
        warn!("{context} failed: {err}");
        self.outputs.push(Output::Notify(Notification::error(err.message())));
    }
}

/// Run a callback, folding a panic into an `ActionError`
fn contain<T>(f: impl FnOnce() -> Result<T, ActionError>) -> Result<T, ActionError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(ActionError::from_panic(payload)))
}
