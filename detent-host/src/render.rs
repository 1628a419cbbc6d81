//! Renderer seam
//!
//! Drawing the overlay is somebody else's job. The router hands every
//! descriptor, notification and link change to a [`Renderer`].

use log::info;

use detent_core::{DisplayDescriptor, Notification, NotificationLevel};

use crate::transport::LinkStatus;

pub trait Renderer {
    fn display(&mut self, descriptor: &DisplayDescriptor);

    fn notify(&mut self, notification: &Notification);

    /// Connection indicator
    fn link_status(&mut self, _status: LinkStatus) {}
}

/// Writes everything to the log; used when no overlay is attached
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn display(&mut self, d: &DisplayDescriptor) {
        let progress = d
            .progress
            .map(|p| format!(" [{:>3.0}%]", p * 100.0))
            .unwrap_or_default();
        if d.title.is_empty() {
            info!("{} | {} | {}{progress}", d.left_label, d.center_label, d.right_label);
        } else {
            info!(
                "{}: {} | {} | {}{progress}",
                d.title, d.left_label, d.center_label, d.right_label
            );
        }
    }

    fn notify(&mut self, n: &Notification) {
        match n.level {
            NotificationLevel::Info => info!("{}", n.message),
            NotificationLevel::Error => log::warn!("{}", n.message),
        }
    }

    fn link_status(&mut self, status: LinkStatus) {
        info!("link {status:?}");
    }
}
