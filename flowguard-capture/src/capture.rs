//! libpcap-backed capture source.

use std::time::{Duration, Instant};

use pcap::{Capture, Device};
use tracing::debug;

use crate::decode::{decode_frame, LinkLayer};
use crate::packet::Packet;
use crate::source::{CaptureError, CaptureSource};

/// Read timeout handed to libpcap so the window deadline is checked at least
/// this often on a quiet link.
const READ_TIMEOUT_MS: i32 = 250;

#[derive(Debug, Clone, Copy)]
pub struct PcapCaptureSource {
    promiscuous: bool,
    snaplen: i32,
}

impl PcapCaptureSource {
    pub fn new(promiscuous: bool, snaplen: u32) -> Self {
        Self {
            promiscuous,
            snaplen: i32::try_from(snaplen).unwrap_or(i32::MAX),
        }
    }
}

impl CaptureSource for PcapCaptureSource {
    fn capture(
        &self,
        interface: &str,
        window: Duration,
        predicate: &dyn Fn(&Packet) -> bool,
    ) -> Result<Vec<Packet>, CaptureError> {
        let open_error = |e: pcap::Error| CaptureError::Open {
            interface: interface.to_string(),
            reason: e.to_string(),
        };

        let device = Device::list()
            .map_err(open_error)?
            .into_iter()
            .find(|d| d.name == interface)
            .ok_or_else(|| CaptureError::InterfaceNotFound(interface.to_string()))?;

        let mut cap = Capture::from_device(device)
            .map_err(open_error)?
            .promisc(self.promiscuous)
            .snaplen(self.snaplen)
            .timeout(READ_TIMEOUT_MS)
            .open()
            .map_err(open_error)?;

        let datalink = cap.get_datalink();
        let link = LinkLayer::from_dlt(datalink.0).ok_or_else(|| CaptureError::UnsupportedLink {
            interface: interface.to_string(),
            linktype: datalink.0,
        })?;

        let deadline = Instant::now() + window;
        let mut seen = 0usize;
        let mut kept = Vec::new();

        while Instant::now() < deadline {
            match cap.next_packet() {
                Ok(raw) => {
                    seen += 1;
                    let ts = raw.header.ts.tv_sec as f64 + raw.header.ts.tv_usec as f64 / 1e6;
                    let wire_len = raw.header.len as usize;
                    let packet = decode_frame(link, ts, wire_len, raw.data);
                    if predicate(&packet) {
                        kept.push(packet);
                    }
                }
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => {
                    return Err(CaptureError::Read {
                        interface: interface.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }

        debug!(interface, ?link, seen, kept = kept.len(), "capture window closed");
        Ok(kept)
    }
}
