//! Link-layer frame decoding into [`Packet`].
//!
//! Slicing is lax: a frame cut short by the snapshot length still yields its
//! IP and transport headers. Frames whose headers cannot be read still
//! produce a `Packet` carrying the timestamp and length; they simply lack the
//! layers the flow filter needs.

use std::net::IpAddr;

use etherparse::{EtherType, LaxNetSlice, LaxSlicedPacket, TransportSlice};

use crate::packet::{IpLayer, Packet, TransportLayer, TransportProtocol};

const ETHERNET_ETHERTYPE_OFFSET: usize = 12;
const SLL_PROTOCOL_OFFSET: usize = 14;
const SLL_HEADER_LEN: usize = 16;
const NULL_HEADER_LEN: usize = 4;
const ETHERTYPE_ARP: [u8; 2] = [0x08, 0x06];

/// Link-layer framings the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    Ethernet,
    /// Linux cooked capture v1, used by the `any` pseudo-interface.
    LinuxSll,
    /// BSD loopback: a 4-byte address family, then the IP packet.
    Null,
    /// Bare IPv4/IPv6 with no link header.
    Raw,
}

impl LinkLayer {
    /// Maps a libpcap data link type; `None` for framings we cannot decode.
    pub fn from_dlt(dlt: i32) -> Option<Self> {
        match dlt {
            1 => Some(LinkLayer::Ethernet),
            113 => Some(LinkLayer::LinuxSll),
            0 | 108 => Some(LinkLayer::Null),
            12 | 14 | 101 => Some(LinkLayer::Raw),
            _ => None,
        }
    }
}

/// Decodes one captured frame.
///
/// `wire_len` is the length of the packet on the wire, which exceeds
/// `frame.len()` when the snapshot length truncated the capture.
pub fn decode_frame(link: LinkLayer, timestamp: f64, wire_len: usize, frame: &[u8]) -> Packet {
    let mut packet = Packet::new(timestamp, wire_len.max(frame.len()));

    let sliced = match link {
        LinkLayer::Ethernet => {
            packet.arp = carries_arp(frame, ETHERNET_ETHERTYPE_OFFSET);
            LaxSlicedPacket::from_ethernet(frame).ok()
        }
        LinkLayer::LinuxSll => {
            packet.arp = carries_arp(frame, SLL_PROTOCOL_OFFSET);
            sll_protocol(frame).zip(frame.get(SLL_HEADER_LEN..)).map(
                |(protocol, payload)| LaxSlicedPacket::from_ether_type(protocol, payload),
            )
        }
        LinkLayer::Null => frame
            .get(NULL_HEADER_LEN..)
            .and_then(|ip| LaxSlicedPacket::from_ip(ip).ok()),
        LinkLayer::Raw => LaxSlicedPacket::from_ip(frame).ok(),
    };

    if let Some(sliced) = sliced {
        fill_layers(&mut packet, &sliced);
    }
    packet
}

/// Decodes one untruncated Ethernet II frame captured at `timestamp` (seconds).
pub fn decode_ethernet(timestamp: f64, frame: &[u8]) -> Packet {
    decode_frame(LinkLayer::Ethernet, timestamp, frame.len(), frame)
}

fn fill_layers(packet: &mut Packet, sliced: &LaxSlicedPacket<'_>) {
    packet.ip = match &sliced.net {
        Some(LaxNetSlice::Ipv4(ipv4)) => {
            let header = ipv4.header();
            Some(IpLayer {
                source: IpAddr::V4(header.source_addr()),
                destination: IpAddr::V4(header.destination_addr()),
            })
        }
        Some(LaxNetSlice::Ipv6(ipv6)) => {
            let header = ipv6.header();
            Some(IpLayer {
                source: IpAddr::V6(header.source_addr()),
                destination: IpAddr::V6(header.destination_addr()),
            })
        }
        _ => None,
    };

    packet.transport = match &sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => Some(TransportLayer {
            protocol: TransportProtocol::Tcp,
            source_port: tcp.source_port(),
            destination_port: tcp.destination_port(),
        }),
        Some(TransportSlice::Udp(udp)) => Some(TransportLayer {
            protocol: TransportProtocol::Udp,
            source_port: udp.source_port(),
            destination_port: udp.destination_port(),
        }),
        _ => None,
    };
}

fn carries_arp(frame: &[u8], offset: usize) -> bool {
    frame.get(offset..offset + 2) == Some(&ETHERTYPE_ARP[..])
}

/// Protocol field of a cooked header, an EtherType for Ethernet-like devices.
fn sll_protocol(frame: &[u8]) -> Option<EtherType> {
    let bytes = frame.get(SLL_PROTOCOL_OFFSET..SLL_HEADER_LEN)?;
    Some(EtherType(u16::from_be_bytes([bytes[0], bytes[1]])))
}
