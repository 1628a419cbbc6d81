//! Transport channel
//!
//! One background thread owns the device connection. It reads with a bounded
//! timeout, decodes packets and pushes events into the drop-oldest queue,
//! writes any pending LED commands, and reconnects at a fixed interval when
//! the device goes away. Shutdown is a flag checked at every read timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, info, trace, warn};

use detent_core::Config;
use detent_protocol::{DecodeError, DeviceCommand, Event, Packet};

use crate::error::TransportError;
use crate::queue::QueueSender;

/// Largest report the read loop accepts; longer reports are cut to a packet
pub const READ_BUFFER_SIZE: usize = 64;

/// Pending LED commands before new ones are dropped
const COMMAND_BACKLOG: usize = 16;

/// An open connection to the encoder
pub trait Transport: Send {
    /// Read one report, waiting at most `timeout`
    ///
    /// `Ok(0)` means the timeout elapsed with nothing to read.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;

    fn write(&mut self, packet: &Packet) -> Result<(), TransportError>;
}

/// Opens connections to the encoder
pub trait Connector: Send {
    type Transport: Transport;

    fn connect(&mut self) -> Result<Self::Transport, TransportError>;
}

/// Connection state reported to the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

/// Fire-and-forget handle for host-to-device commands
#[derive(Debug, Clone)]
pub struct CommandSender(Sender<DeviceCommand>);

impl CommandSender {
    /// Queue `command` for the transport thread without blocking
    ///
    /// Failures are logged and the command is dropped; the next state change
    /// sends a fresh one.
    pub fn send(&self, command: DeviceCommand) {
        match self.0.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(cmd)) => warn!("command backlog full, dropped {cmd:?}"),
            Err(TrySendError::Disconnected(cmd)) => warn!("transport stopped, dropped {cmd:?}"),
        }
    }
}

/// Timing knobs of the read loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSettings {
    pub read_timeout: Duration,
    pub reconnect_interval: Duration,
}

impl From<&Config> for ChannelSettings {
    fn from(config: &Config) -> Self {
        Self {
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            reconnect_interval: Duration::from_millis(config.reconnect_interval_ms),
        }
    }
}

pub struct TransportChannel {
    shutdown: Arc<AtomicBool>,
    commands: CommandSender,
    link: Receiver<LinkStatus>,
    handle: Option<JoinHandle<()>>,
}

impl TransportChannel {
    /// Connect once and start the read thread
    ///
    /// A device that cannot be opened at startup is fatal; after that,
    /// disconnects are handled by the reconnect loop.
    pub fn spawn<C>(
        mut connector: C,
        settings: impl Into<ChannelSettings>,
        events: QueueSender<Event>,
    ) -> Result<Self, TransportError>
    where
        C: Connector + 'static,
        C::Transport: 'static,
    {
        let settings = settings.into();
        let transport = connector.connect()?;
        info!("encoder connected");

        let shutdown = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = bounded(COMMAND_BACKLOG);
        let (link_tx, link_rx) = crossbeam_channel::unbounded();
        // The router learns about the initial connection like any other
        let _ = link_tx.send(LinkStatus::Connected);

        let worker = Worker {
            connector,
            settings,
            events,
            commands: cmd_rx,
            link: link_tx,
            shutdown: Arc::clone(&shutdown),
        };
        let handle = thread::Builder::new()
            .name("detent-transport".into())
            .spawn(move || worker.run(transport))
            .map_err(|e| TransportError::Io(e.to_string()))?;

        Ok(Self {
            shutdown,
            commands: CommandSender(cmd_tx),
            link: link_rx,
            handle: Some(handle),
        })
    }

    pub fn sender(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn send(&self, command: DeviceCommand) {
        self.commands.send(command);
    }

    /// Connection changes, starting with the initial `Connected`
    pub fn link_status(&self) -> Receiver<LinkStatus> {
        self.link.clone()
    }

    /// Ask the thread to stop; it exits within one read timeout
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn join(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("transport thread panicked");
            }
        }
    }
}

impl Drop for TransportChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker<C> {
    connector: C,
    settings: ChannelSettings,
    events: QueueSender<Event>,
    commands: Receiver<DeviceCommand>,
    link: Sender<LinkStatus>,
    shutdown: Arc<AtomicBool>,
}

impl<C: Connector> Worker<C> {
    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn run(mut self, first: C::Transport) {
        let mut connection = Some(first);
        let mut buf = [0u8; READ_BUFFER_SIZE];

        while !self.stopping() {
            let Some(transport) = connection.as_mut() else {
                connection = self.reconnect();
                continue;
            };

            self.flush_commands(transport);

            match transport.read(&mut buf, self.settings.read_timeout) {
                Ok(0) => {}
                Ok(n) => self.handle_report(&buf[..n.min(READ_BUFFER_SIZE)]),
                Err(err) => {
                    warn!("read failed: {err}");
                    connection = None;
                    let _ = self.link.send(LinkStatus::Disconnected);
                }
            }
        }
        debug!("transport thread stopped");
    }

    fn flush_commands(&self, transport: &mut C::Transport) {
        for command in self.commands.try_iter() {
            match transport.write(&command.encode()) {
                Ok(()) => trace!("sent {command:?}"),
                Err(err) => warn!("send {command:?} failed: {err}"),
            }
        }
    }

    fn handle_report(&self, report: &[u8]) {
        let packet = match Packet::from_slice(report) {
            Ok(packet) => packet,
            Err(err) => {
                debug!("dropped report: {err}");
                return;
            }
        };

        match Event::decode(&packet) {
            Ok(event) => {
                trace!("received {event:?}");
                self.events.push(event);
            }
            Err(DecodeError::ForeignProtocol(marker)) => {
                trace!("ignored packet with marker {marker:#04x}");
            }
            Err(err) => debug!("dropped packet: {err}"),
        }
    }

    /// One connection attempt, then a shutdown-aware wait on failure
    fn reconnect(&mut self) -> Option<C::Transport> {
        // Commands issued while the device was away are stale
        let stale = self.commands.try_iter().count();
        if stale > 0 {
            debug!("discarded {stale} commands while disconnected");
        }

        match self.connector.connect() {
            Ok(transport) => {
                info!("encoder reconnected");
                let _ = self.link.send(LinkStatus::Connected);
                Some(transport)
            }
            Err(err) => {
                debug!("reconnect failed: {err}");
                self.wait(self.settings.reconnect_interval);
                None
            }
        }
    }

    fn wait(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        let slice = self.settings.read_timeout;
        while !self.stopping() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(slice.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::event_queue;
    use detent_protocol::{EventKind, Rgb, PACKET_SIZE};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    enum Step {
        Report(Vec<u8>),
        Fail,
    }

    #[derive(Clone, Default)]
    struct Script {
        reads: Arc<Mutex<VecDeque<Step>>>,
        written: Arc<Mutex<Vec<Packet>>>,
        /// Connection attempts (1-based) that fail
        refuse: Arc<Mutex<Vec<u32>>>,
        connects: Arc<Mutex<u32>>,
    }

    impl Script {
        fn report(&self, bytes: Vec<u8>) {
            self.reads.lock().unwrap().push_back(Step::Report(bytes));
        }

        fn fail(&self) {
            self.reads.lock().unwrap().push_back(Step::Fail);
        }
    }

    struct MockTransport(Script);

    impl Transport for MockTransport {
        fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
            let step = self.0.reads.lock().unwrap().pop_front();
            match step {
                Some(Step::Report(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Some(Step::Fail) => Err(TransportError::Disconnected),
                None => {
                    thread::sleep(timeout);
                    Ok(0)
                }
            }
        }

        fn write(&mut self, packet: &Packet) -> Result<(), TransportError> {
            self.0.written.lock().unwrap().push(*packet);
            Ok(())
        }
    }

    impl Connector for Script {
        type Transport = MockTransport;

        fn connect(&mut self) -> Result<MockTransport, TransportError> {
            let mut connects = self.connects.lock().unwrap();
            *connects += 1;
            if self.refuse.lock().unwrap().contains(&*connects) {
                return Err(TransportError::DeviceNotFound);
            }
            Ok(MockTransport(self.clone()))
        }
    }

    fn settings() -> ChannelSettings {
        ChannelSettings {
            read_timeout: Duration::from_millis(2),
            reconnect_interval: Duration::from_millis(10),
        }
    }

    fn recv_event(rx: &Receiver<Event>) -> Event {
        rx.recv_timeout(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_missing_device_is_fatal() {
        let script = Script::default();
        script.refuse.lock().unwrap().push(1);
        let (tx, _rx) = event_queue(8);

        let err = TransportChannel::spawn(script, settings(), tx).err();
        assert_eq!(err, Some(TransportError::DeviceNotFound));
    }

    #[test]
    fn test_events_are_decoded_in_order() {
        let script = Script::default();
        script.report(Event::new(EventKind::RotateCw, 1, 10).encode().as_bytes().to_vec());
        script.report(Event::new(EventKind::Press, 1, 20).encode().as_bytes().to_vec());
        let (tx, rx) = event_queue(8);

        let channel = TransportChannel::spawn(script, settings(), tx).unwrap();

        assert_eq!(recv_event(&rx).kind, EventKind::RotateCw);
        assert_eq!(recv_event(&rx).kind, EventKind::Press);
        channel.join();
    }

    #[test]
    fn test_foreign_unknown_and_short_reports_are_dropped() {
        let script = Script::default();
        // Configuration-protocol report
        let mut foreign = vec![0u8; PACKET_SIZE];
        foreign[0] = 0x01;
        script.report(foreign);
        // Our marker, unknown tag
        let mut unknown = Event::new(EventKind::Press, 0, 0).encode().as_bytes().to_vec();
        unknown[1] = 0x7F;
        script.report(unknown);
        // Shorter than the header
        script.report(vec![0xFD, 0x01]);
        script.report(Event::new(EventKind::DoubleTap, 0, 5).encode().as_bytes().to_vec());
        let (tx, rx) = event_queue(8);

        let channel = TransportChannel::spawn(script, settings(), tx).unwrap();

        assert_eq!(recv_event(&rx).kind, EventKind::DoubleTap);
        channel.join();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reconnects_after_read_failure() {
        let script = Script::default();
        script.fail();
        // First reconnect attempt fails, so the retry interval is exercised
        script.refuse.lock().unwrap().push(2);
        let (tx, rx) = event_queue(8);

        let channel = TransportChannel::spawn(script.clone(), settings(), tx).unwrap();
        let link = channel.link_status();
        let timeout = Duration::from_secs(2);

        assert_eq!(link.recv_timeout(timeout), Ok(LinkStatus::Connected));
        assert_eq!(link.recv_timeout(timeout), Ok(LinkStatus::Disconnected));
        assert_eq!(link.recv_timeout(timeout), Ok(LinkStatus::Connected));
        assert_eq!(*script.connects.lock().unwrap(), 3);

        // Data flows again on the new connection
        script.report(Event::new(EventKind::RotateCcw, 0, 1).encode().as_bytes().to_vec());
        assert_eq!(recv_event(&rx).kind, EventKind::RotateCcw);
        channel.join();
    }

    #[test]
    fn test_commands_are_written() {
        let script = Script::default();
        let (tx, _rx) = event_queue(8);
        let channel = TransportChannel::spawn(script.clone(), settings(), tx).unwrap();

        let cmd = DeviceCommand::SetColor(Rgb::new(0, 255, 100));
        channel.sender().send(cmd);

        let deadline = Instant::now() + Duration::from_secs(2);
        while script.written.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        channel.join();

        let written = script.written.lock().unwrap();
        assert_eq!(written.as_slice(), [cmd.encode()]);
    }

    #[test]
    fn test_shutdown_is_prompt() {
        let (tx, _rx) = event_queue(8);
        let channel = TransportChannel::spawn(Script::default(), settings(), tx).unwrap();

        let started = Instant::now();
        channel.join();
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_send_after_stop_does_not_block() {
        let (tx, _rx) = event_queue(8);
        let channel = TransportChannel::spawn(Script::default(), settings(), tx).unwrap();
        let sender = channel.sender();
        channel.join();

        for _ in 0..(COMMAND_BACKLOG * 2) {
            sender.send(DeviceCommand::SetColor(Rgb::new(1, 2, 3)));
        }
    }
}
