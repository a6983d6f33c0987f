//! Schema-shaped feature vectors.

use std::fmt;
use std::net::IpAddr;

/// Placeholder reported when no non-device peer was seen in a window.
pub const UNKNOWN_PEER: &str = "Unknown";

/// Feature names as trained into the flow classifier.
pub mod keys {
    pub const FLOW_DURATION: &str = "Flow.Duration";
    pub const TOTAL_FWD_PACKETS: &str = "Total.Fwd.Packets";
    pub const TOTAL_LENGTH_FWD_PACKETS: &str = "Total.Length.of.Fwd.Packets";
    pub const FWD_PACKET_LENGTH_MAX: &str = "Fwd.Packet.Length.Max";
    pub const FWD_PACKET_LENGTH_MIN: &str = "Fwd.Packet.Length.Min";
    pub const FWD_PACKET_LENGTH_MEAN: &str = "Fwd.Packet.Length.Mean";
    pub const FWD_PACKET_LENGTH_STD: &str = "Fwd.Packet.Length.Std";
    pub const FLOW_BYTES_PER_SEC: &str = "Flow.Bytes.s";
    pub const FLOW_PACKETS_PER_SEC: &str = "Flow.Packets.s";
    pub const FLOW_IAT_MEAN: &str = "Flow.IAT.Mean";
    pub const FLOW_IAT_STD: &str = "Flow.IAT.Std";
    pub const FLOW_IAT_MAX: &str = "Flow.IAT.Max";
    pub const FLOW_IAT_MIN: &str = "Flow.IAT.Min";
    pub const MIN_PACKET_LENGTH: &str = "Min.Packet.Length";
    pub const MAX_PACKET_LENGTH: &str = "Max.Packet.Length";
    pub const PACKET_LENGTH_MEAN: &str = "Packet.Length.Mean";
    pub const PACKET_LENGTH_STD: &str = "Packet.Length.Std";
    pub const PACKET_LENGTH_VARIANCE: &str = "Packet.Length.Variance";
    pub const AVERAGE_PACKET_SIZE: &str = "Average.Packet.Size";
    pub const UNIQUE_DST_IPS: &str = "num_unique_dst_ips";
    pub const UNIQUE_DST_PORTS: &str = "num_unique_dst_ports";
}

/// Ordered mapping from feature key to value.
///
/// The key set is always exactly the classifier schema the vector was
/// projected onto, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// Builds a vector with one entry per schema key. Keys that `lookup`
    /// does not know are set to 0.0; anything `lookup` knows outside the
    /// schema is never asked for.
    pub fn project<F>(schema: &[String], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<f64>,
    {
        let entries = schema
            .iter()
            .map(|key| (key.clone(), lookup(key).unwrap_or(0.0)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| *value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First non-device source and destination addresses seen in one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedPeers {
    pub source: Option<IpAddr>,
    pub destination: Option<IpAddr>,
}

impl ObservedPeers {
    pub fn source_label(&self) -> String {
        peer_label(self.source)
    }

    pub fn destination_label(&self) -> String {
        peer_label(self.destination)
    }
}

impl fmt::Display for ObservedPeers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_label(), self.destination_label())
    }
}

fn peer_label(addr: Option<IpAddr>) -> String {
    addr.map_or_else(|| UNKNOWN_PEER.to_string(), |ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn projection_follows_schema_order_and_defaults_missing_keys() {
        let schema = schema(&["b", "a", "missing"]);
        let vector = FeatureVector::project(&schema, |key| match key {
            "a" => Some(1.0),
            "b" => Some(2.0),
            "extra" => Some(3.0),
            _ => None,
        });

        assert_eq!(vector.keys().collect::<Vec<_>>(), vec!["b", "a", "missing"]);
        assert_eq!(vector.values().collect::<Vec<_>>(), vec![2.0, 1.0, 0.0]);
        assert_eq!(vector.get("extra"), None);
    }

    #[test]
    fn empty_schema_gives_empty_vector() {
        let vector = FeatureVector::project(&[], |_| Some(1.0));
        assert!(vector.is_empty());
    }

    #[test]
    fn unknown_peers_render_placeholder() {
        let peers = ObservedPeers {
            source: Some("10.1.1.1".parse().unwrap()),
            destination: None,
        };
        assert_eq!(peers.source_label(), "10.1.1.1");
        assert_eq!(peers.destination_label(), UNKNOWN_PEER);
        assert_eq!(peers.to_string(), "10.1.1.1 -> Unknown");
    }
}
