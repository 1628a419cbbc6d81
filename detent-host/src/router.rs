//! Event router
//!
//! The single consumer of the event queue. It owns the menu state machine,
//! so all navigation state lives on one thread; device events, link changes
//! and the periodic timeout tick all arrive here over channels.

use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, Receiver};
use log::{debug, info, trace};

use detent_core::{Config, Direction, MenuStateMachine, Output, RotationEncoding};
use detent_protocol::{Event, EventKind};

use crate::led::LedFeedback;
use crate::render::Renderer;
use crate::transport::{CommandSender, LinkStatus};

/// Millisecond time source for timeouts
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

pub struct EventRouter<R, C> {
    machine: MenuStateMachine,
    renderer: R,
    clock: C,
    encoding: RotationEncoding,
    tick_interval: Duration,
    led: Option<(LedFeedback, CommandSender)>,
}

impl<R: Renderer, C: Clock> EventRouter<R, C> {
    pub fn new(machine: MenuStateMachine, renderer: R, clock: C, config: &Config) -> Self {
        Self {
            machine,
            renderer,
            clock,
            encoding: config.rotation_encoding,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            led: None,
        }
    }

    /// Drive the encoder LED through `commands`
    pub fn with_led(mut self, commands: CommandSender) -> Self {
        self.led = Some((LedFeedback::new(), commands));
        self
    }

    pub fn machine(&self) -> &MenuStateMachine {
        &self.machine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Show the initial command list
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        self.machine.start(now);
        self.flush();
    }

    /// Apply one device event
    pub fn dispatch(&mut self, event: Event, now: u64) {
        debug!(
            "{:?} value={} ts={}",
            event.kind, event.value, event.timestamp
        );
        match event.kind {
            EventKind::RotateCw | EventKind::RotateCcw => match self.encoding {
                RotationEncoding::Absolute => {
                    self.machine.handle_rotation(usize::from(event.value), now)
                }
                RotationEncoding::Relative => {
                    if let Some(direction) = Direction::from_kind(event.kind) {
                        self.machine.handle_step(direction, now);
                    }
                }
            },
            EventKind::Press => self.machine.handle_press(now),
            EventKind::DoubleTap => self.machine.handle_cancel(now),
            EventKind::LongPress => self.machine.handle_long_press(now),
            // Press already carries the action
            EventKind::Release => {}
        }
        self.flush();
    }

    pub fn tick(&mut self, now: u64) {
        self.machine.tick(now);
        self.flush();
    }

    /// Navigation state is left alone across a disconnect
    pub fn link_changed(&mut self, status: LinkStatus) {
        info!("encoder link {status:?}");
        self.renderer.link_status(status);
        if status == LinkStatus::Connected {
            // A replugged device has forgotten its LED state
            if let Some((led, commands)) = self.led.as_mut() {
                for command in led.resync() {
                    commands.send(command);
                }
            }
        }
    }

    /// Process events, link changes and ticks until `shutdown` fires or the
    /// event queue closes
    pub fn run(
        &mut self,
        events: &Receiver<Event>,
        link: &Receiver<LinkStatus>,
        shutdown: &Receiver<()>,
    ) {
        let ticker = tick(self.tick_interval);
        let mut link_open = true;

        loop {
            let link_rx = if link_open { link.clone() } else { never() };
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        let now = self.clock.now_ms();
                        self.dispatch(event, now);
                    }
                    Err(_) => {
                        info!("event queue closed");
                        break;
                    }
                },
                recv(link_rx) -> msg => match msg {
                    Ok(status) => self.link_changed(status),
                    // Transport gone; keep serving ticks until told to stop
                    Err(_) => link_open = false,
                },
                recv(ticker) -> _ => {
                    let now = self.clock.now_ms();
                    trace!("tick {now}");
                    self.tick(now);
                }
                recv(shutdown) -> _ => {
                    info!("router shutting down");
                    break;
                }
            }
        }
    }

    fn flush(&mut self) {
        for output in self.machine.drain_outputs() {
            if let Some((led, commands)) = self.led.as_mut() {
                for command in led.observe(&output) {
                    commands.send(command);
                }
            }
            match output {
                Output::Display(descriptor) => self.renderer.display(&descriptor),
                Output::Notify(notification) => self.renderer.notify(&notification),
                Output::ModeChanged { mode, .. } => match mode {
                    Some(mode) => debug!("active mode `{mode}`"),
                    None => debug!("active mode: command list"),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detent_core::mode::DirectHandler;
    use detent_core::{CommandOutcome, DisplayDescriptor, Notification};

    #[derive(Default)]
    struct Recorder {
        displays: Vec<DisplayDescriptor>,
        notes: Vec<Notification>,
        links: Vec<LinkStatus>,
    }

    impl Renderer for Recorder {
        fn display(&mut self, d: &DisplayDescriptor) {
            self.displays.push(d.clone());
        }

        fn notify(&mut self, n: &Notification) {
            self.notes.push(n.clone());
        }

        fn link_status(&mut self, status: LinkStatus) {
            self.links.push(status);
        }
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    fn router(config: &Config) -> EventRouter<Recorder, FixedClock> {
        let mut machine = MenuStateMachine::new(config);
        machine
            .register_command("Volume", || Ok(CommandOutcome::EnterMode("volume".into())))
            .unwrap();
        machine.register_command("Media", || Ok(CommandOutcome::Done)).unwrap();
        machine.register_command("Window", || Ok(CommandOutcome::Done)).unwrap();
        machine
            .register_mode_handler(
                "volume",
                DirectHandler::new("Volume", ["-", "Mute", "+"], |_| Ok(())),
            )
            .unwrap();
        EventRouter::new(machine, Recorder::default(), FixedClock(0), config)
    }

    fn ev(kind: EventKind, value: u8) -> Event {
        Event::new(kind, value, 0)
    }

    #[test]
    fn test_dispatch_table() {
        let mut r = router(&Config::default());
        r.start();

        r.dispatch(ev(EventKind::RotateCw, 1), 0);
        assert_eq!(r.machine().current_command_index(), 1);

        r.dispatch(ev(EventKind::RotateCcw, 0), 10);
        r.dispatch(ev(EventKind::Press, 0), 20);
        assert_eq!(r.machine().depth(), 2);

        // Release is a no-op, long press unsupported by a plain direct mode
        r.dispatch(ev(EventKind::Release, 0), 30);
        r.dispatch(ev(EventKind::LongPress, 0), 40);
        assert_eq!(r.machine().depth(), 2);

        r.dispatch(ev(EventKind::DoubleTap, 0), 50);
        assert_eq!(r.machine().depth(), 1);
        assert_eq!(
            r.renderer().notes.last().map(|n| n.message.as_str()),
            Some("Returned to normal mode")
        );
    }

    #[test]
    fn test_relative_encoding_uses_event_kind() {
        let config = Config {
            rotation_encoding: RotationEncoding::Relative,
            ..Config::default()
        };
        let mut r = router(&config);

        // Values are garbage; only the kind counts
        r.dispatch(ev(EventKind::RotateCcw, 200), 0);
        assert_eq!(r.machine().current_command_index(), 2);
        r.dispatch(ev(EventKind::RotateCcw, 200), 1);
        assert_eq!(r.machine().current_command_index(), 1);
    }

    #[test]
    fn test_tick_times_out() {
        let mut r = router(&Config::default());
        r.dispatch(ev(EventKind::Press, 0), 0);
        assert_eq!(r.machine().depth(), 2);

        r.tick(4999);
        assert_eq!(r.machine().depth(), 2);
        r.tick(5000);
        assert_eq!(r.machine().depth(), 1);
    }

    #[test]
    fn test_link_status_is_forwarded_and_state_kept() {
        let mut r = router(&Config::default());
        r.dispatch(ev(EventKind::Press, 0), 0);

        r.link_changed(LinkStatus::Disconnected);
        r.link_changed(LinkStatus::Connected);

        assert_eq!(
            r.renderer().links,
            [LinkStatus::Disconnected, LinkStatus::Connected]
        );
        assert_eq!(r.machine().depth(), 2);
    }

    #[test]
    fn test_run_until_shutdown() {
        let mut r = router(&Config::default());
        let (_ev_tx, ev_rx) = crossbeam_channel::unbounded::<Event>();
        let (link_tx, link_rx) = crossbeam_channel::unbounded();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);

        // A vanished transport must not end the loop
        drop(link_tx);
        stop_tx.send(()).unwrap();
        r.run(&ev_rx, &link_rx, &stop_rx);

        assert_eq!(r.machine().depth(), 1);
    }

    #[test]
    fn test_run_stops_when_queue_closes() {
        let mut r = router(&Config::default());
        let (ev_tx, ev_rx) = crossbeam_channel::unbounded();
        let (_link_tx, link_rx) = crossbeam_channel::unbounded::<LinkStatus>();
        let (_stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        ev_tx.send(ev(EventKind::RotateCw, 1)).unwrap();
        ev_tx.send(ev(EventKind::RotateCw, 2)).unwrap();
        ev_tx.send(ev(EventKind::Press, 0)).unwrap();
        drop(ev_tx);
        r.run(&ev_rx, &link_rx, &stop_rx);

        // Queued events are still delivered before the close is seen
        assert_eq!(r.machine().current_command_index(), 2);
        assert_eq!(r.machine().registry().len(), 3);
    }
}
