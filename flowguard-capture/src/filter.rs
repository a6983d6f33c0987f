//! Per-packet predicate deciding whether a frame belongs to the monitored
//! device's traffic.

use std::net::IpAddr;

use crate::packet::Packet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowFilter {
    device: IpAddr,
}

impl FlowFilter {
    pub fn new(device: IpAddr) -> Self {
        Self { device }
    }

    pub fn device(&self) -> IpAddr {
        self.device
    }

    /// Keeps IP, non-ARP, TCP/UDP packets that the device sent or received.
    #[inline]
    pub fn accepts(&self, packet: &Packet) -> bool {
        let Some(ip) = packet.ip else {
            return false;
        };
        if packet.arp || packet.transport.is_none() {
            return false;
        }
        ip.source == self.device || ip.destination == self.device
    }

    /// The filter as a plain predicate, for capture sources.
    pub fn predicate(self) -> impl Fn(&Packet) -> bool + Send + Sync + 'static {
        move |packet| self.accepts(packet)
    }
}
