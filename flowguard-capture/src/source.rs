//! The capture interface consumed by the cycle orchestrator.

use std::time::Duration;

use thiserror::Error;

use crate::packet::Packet;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("failed to open '{interface}' for capture: {reason}")]
    Open { interface: String, reason: String },

    #[error("'{interface}' uses unsupported link type {linktype}")]
    UnsupportedLink { interface: String, linktype: i32 },

    #[error("capture read failed on '{interface}': {reason}")]
    Read { interface: String, reason: String },

    #[error("packet capture unavailable: {0}")]
    Unavailable(String),
}

/// Produces one bounded window of packets.
///
/// Implementations block for roughly `window` and return every packet the
/// predicate accepted during it. An empty window is a valid result, not an
/// error.
pub trait CaptureSource: Send + Sync {
    fn capture(
        &self,
        interface: &str,
        window: Duration,
        predicate: &dyn Fn(&Packet) -> bool,
    ) -> Result<Vec<Packet>, CaptureError>;
}

/// Stand-in used when the binary is built without the `live` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCaptureSource;

impl CaptureSource for UnavailableCaptureSource {
    fn capture(
        &self,
        _interface: &str,
        _window: Duration,
        _predicate: &dyn Fn(&Packet) -> bool,
    ) -> Result<Vec<Packet>, CaptureError> {
        Err(CaptureError::Unavailable(
            "built without the `live` feature".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_source_always_fails() {
        let source = UnavailableCaptureSource;
        let result = source.capture("eth0", Duration::from_millis(1), &|_| true);
        assert!(matches!(result, Err(CaptureError::Unavailable(_))));
    }
}
