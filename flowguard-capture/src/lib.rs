//! flowguard-capture
//!
//! Bounded-window packet capture, frame decoding and the per-device flow
//! filter. Live capture through libpcap is behind the `live` feature.

#[cfg(feature = "live")]
pub mod capture;
pub mod decode;
pub mod filter;
pub mod packet;
pub mod source;

#[cfg(feature = "live")]
pub use capture::PcapCaptureSource;
pub use decode::{decode_ethernet, decode_frame, LinkLayer};
pub use filter::FlowFilter;
pub use packet::{IpLayer, Packet, TransportLayer, TransportProtocol};
pub use source::{CaptureError, CaptureSource, UnavailableCaptureSource};
