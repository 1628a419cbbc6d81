//! USB HID transport via hidapi
//!
//! The encoder shares its raw HID interface with the keyboard's
//! configuration protocol, so the interface is picked by usage page and
//! usage as well as VID/PID.

use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use log::debug;

use detent_core::DeviceConfig;
use detent_protocol::{Packet, PACKET_SIZE};

use crate::error::TransportError;
use crate::transport::{Connector, Transport};

fn io(err: hidapi::HidError) -> TransportError {
    TransportError::Io(err.to_string())
}

pub struct HidConnector {
    api: HidApi,
    device: DeviceConfig,
}

impl HidConnector {
    pub fn new(device: DeviceConfig) -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(io)?;
        Ok(Self { api, device })
    }
}

impl Connector for HidConnector {
    type Transport = HidTransport;

    fn connect(&mut self) -> Result<HidTransport, TransportError> {
        self.api.refresh_devices().map_err(io)?;

        let wanted = self.device;
        let info = self
            .api
            .device_list()
            .find(|d| {
                d.vendor_id() == wanted.vendor_id
                    && d.product_id() == wanted.product_id
                    && d.usage_page() == wanted.usage_page
                    && d.usage() == wanted.usage
            })
            .ok_or(TransportError::DeviceNotFound)?;

        debug!(
            "opening {:04x}:{:04x} at {:?}",
            wanted.vendor_id,
            wanted.product_id,
            info.path()
        );
        let device = info.open_device(&self.api).map_err(io)?;
        Ok(HidTransport { device })
    }
}

pub struct HidTransport {
    device: HidDevice,
}

impl Transport for HidTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        self.device.read_timeout(buf, timeout_ms).map_err(io)
    }

    fn write(&mut self, packet: &Packet) -> Result<(), TransportError> {
        // Leading report id 0 for devices without numbered reports
        let mut report = [0u8; PACKET_SIZE + 1];
        report[1..].copy_from_slice(packet.as_bytes());
        self.device.write(&report).map_err(io)?;
        Ok(())
    }
}
