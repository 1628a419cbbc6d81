//! Host daemon plumbing for the detent encoder
//!
//! - Drop-oldest event queue between the transport and the router
//! - Transport thread with read timeouts and reconnect
//! - Event router driving the menu state machine
//! - LED feedback and the renderer seam
//! - USB HID transport (feature `hid`)

pub mod error;
#[cfg(feature = "hid")]
pub mod hid;
pub mod led;
pub mod queue;
pub mod render;
pub mod router;
pub mod transport;

pub use error::{AppError, TransportError};
pub use led::LedFeedback;
pub use queue::{event_queue, QueueSender};
pub use render::{LogRenderer, Renderer};
pub use router::{Clock, EventRouter, MonotonicClock};
pub use transport::{
    ChannelSettings, CommandSender, Connector, LinkStatus, Transport, TransportChannel,
};
