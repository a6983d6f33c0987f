//! A decoded packet: only the attributes the classifier pipeline consumes.
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpLayer {
    pub source: IpAddr,
    pub destination: IpAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportLayer {
    pub protocol: TransportProtocol,
    pub source_port: u16,
    pub destination_port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// Capture timestamp in seconds since the Unix epoch.
    pub timestamp: f64,
    /// Captured frame length in bytes.
    pub length: usize,
    pub ip: Option<IpLayer>,
    pub arp: bool,
    pub transport: Option<TransportLayer>,
}

impl Packet {
    /// Creates a packet with no decoded layers.
    pub fn new(timestamp: f64, length: usize) -> Self {
        Packet {
            timestamp,
            length,
            ip: None,
            arp: false,
            transport: None,
        }
    }

    pub fn with_ip(mut self, source: IpAddr, destination: IpAddr) -> Self {
        self.ip = Some(IpLayer {
            source,
            destination,
        });
        self
    }

    pub fn with_tcp(self, source_port: u16, destination_port: u16) -> Self {
        self.with_transport(TransportProtocol::Tcp, source_port, destination_port)
    }

    pub fn with_udp(self, source_port: u16, destination_port: u16) -> Self {
        self.with_transport(TransportProtocol::Udp, source_port, destination_port)
    }

    pub fn with_arp(mut self) -> Self {
        self.arp = true;
        self
    }

    fn with_transport(
        mut self,
        protocol: TransportProtocol,
        source_port: u16,
        destination_port: u16,
    ) -> Self {
        self.transport = Some(TransportLayer {
            protocol,
            source_port,
            destination_port,
        });
        self
    }

    pub fn has_ip(&self) -> bool {
        self.ip.is_some()
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }
}
