use std::collections::HashSet;
use std::net::IpAddr;

use flowguard_capture::Packet;
use flowguard_core::{FeatureVector, ObservedPeers};
use tracing::trace;

use crate::stats::{FlowStats, Summary};

/// Guards the rate divisions against zero-length windows.
const RATE_EPSILON: f64 = 1e-6;

/// Result of extracting one non-empty window.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFeatures {
    pub vector: FeatureVector,
    pub peers: ObservedPeers,
    pub stats: FlowStats,
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    device: IpAddr,
}

impl FeatureExtractor {
    pub fn new(device: IpAddr) -> Self {
        Self { device }
    }

    /// Computes the flow features of `window` and projects them onto `schema`.
    ///
    /// Returns `None` for an empty window. Pure: the same window and schema
    /// always produce the same result.
    pub fn extract(&self, window: &[Packet], schema: &[String]) -> Option<FlowFeatures> {
        if window.is_empty() {
            return None;
        }

        let stats = self.compute(window);
        let peers = self.peers(window);
        let vector = FeatureVector::project(schema, |key| stats.value(key));
        trace!(packets = stats.packet_count, %peers, "window extracted");

        Some(FlowFeatures {
            vector,
            peers,
            stats,
        })
    }

    fn compute(&self, window: &[Packet]) -> FlowStats {
        let lengths: Vec<f64> = window.iter().map(|p| p.length as f64).collect();

        let inter_arrival: Vec<f64> = if window.len() < 2 {
            vec![0.0]
        } else {
            window
                .windows(2)
                .map(|pair| pair[1].timestamp - pair[0].timestamp)
                .collect()
        };

        let duration = match (window.first(), window.last()) {
            (Some(first), Some(last)) if window.len() > 1 => last.timestamp - first.timestamp,
            _ => 0.0,
        };

        let total_bytes: f64 = lengths.iter().sum();
        let packet_count = window.len();

        let unique_dst_ips = window
            .iter()
            .filter_map(|p| p.ip.map(|ip| ip.destination))
            .filter(|dst| *dst != self.device)
            .collect::<HashSet<_>>()
            .len();
        let unique_dst_ports = window
            .iter()
            .filter_map(|p| p.transport.map(|t| t.destination_port))
            .collect::<HashSet<_>>()
            .len();

        FlowStats {
            duration,
            packet_count,
            total_bytes,
            lengths: Summary::of(&lengths),
            inter_arrival: Summary::of(&inter_arrival),
            bytes_per_sec: total_bytes / (duration + RATE_EPSILON),
            packets_per_sec: packet_count as f64 / (duration + RATE_EPSILON),
            unique_dst_ips,
            unique_dst_ports,
        }
    }

    fn peers(&self, window: &[Packet]) -> ObservedPeers {
        let ips = || window.iter().filter_map(|p| p.ip);
        ObservedPeers {
            source: ips().map(|ip| ip.source).find(|src| *src != self.device),
            destination: ips()
                .map(|ip| ip.destination)
                .find(|dst| *dst != self.device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowguard_core::features::keys;
    use flowguard_core::UNKNOWN_PEER;
    use proptest::prelude::*;

    const DEVICE: &str = "10.0.0.7";
    const PEER: &str = "93.184.216.34";

    fn ip(addr: &str) -> IpAddr {
        addr.parse().unwrap()
    }

    fn full_schema() -> Vec<String> {
        [
            keys::FLOW_DURATION,
            keys::TOTAL_FWD_PACKETS,
            keys::TOTAL_LENGTH_FWD_PACKETS,
            keys::FWD_PACKET_LENGTH_MAX,
            keys::FWD_PACKET_LENGTH_MIN,
            keys::FWD_PACKET_LENGTH_MEAN,
            keys::FWD_PACKET_LENGTH_STD,
            keys::FLOW_BYTES_PER_SEC,
            keys::FLOW_PACKETS_PER_SEC,
            keys::FLOW_IAT_MEAN,
            keys::FLOW_IAT_STD,
            keys::FLOW_IAT_MAX,
            keys::FLOW_IAT_MIN,
            keys::MIN_PACKET_LENGTH,
            keys::MAX_PACKET_LENGTH,
            keys::PACKET_LENGTH_MEAN,
            keys::PACKET_LENGTH_STD,
            keys::PACKET_LENGTH_VARIANCE,
            keys::AVERAGE_PACKET_SIZE,
            keys::UNIQUE_DST_IPS,
            keys::UNIQUE_DST_PORTS,
        ]
        .iter()
        .map(|k| k.to_string())
        .collect()
    }

    fn tcp(ts: f64, len: usize, src: &str, dst: &str, dport: u16) -> Packet {
        Packet::new(ts, len)
            .with_ip(ip(src), ip(dst))
            .with_tcp(40000, dport)
    }

    #[test]
    fn two_packet_exchange() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        let window = vec![
            tcp(0.0, 100, PEER, DEVICE, 51000),
            tcp(0.5, 200, DEVICE, PEER, 443),
        ];

        let features = extractor.extract(&window, &full_schema()).unwrap();
        let v = &features.vector;
        assert_eq!(v.get(keys::FLOW_DURATION), Some(0.5));
        assert_eq!(v.get(keys::TOTAL_FWD_PACKETS), Some(2.0));
        assert_eq!(v.get(keys::TOTAL_LENGTH_FWD_PACKETS), Some(300.0));
        assert_eq!(v.get(keys::UNIQUE_DST_IPS), Some(1.0));
        assert_eq!(v.get(keys::UNIQUE_DST_PORTS), Some(2.0));
        assert_eq!(v.get(keys::AVERAGE_PACKET_SIZE), Some(150.0));
        assert_eq!(v.get(keys::FLOW_IAT_MEAN), Some(0.5));
        assert_eq!(v.get(keys::PACKET_LENGTH_VARIANCE), Some(2500.0));

        assert_eq!(features.peers.source, Some(ip(PEER)));
        assert_eq!(features.peers.destination, Some(ip(PEER)));
    }

    #[test]
    fn empty_window_yields_nothing() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        assert!(extractor.extract(&[], &full_schema()).is_none());
    }

    #[test]
    fn single_packet_has_zero_duration_and_finite_rates() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        let window = vec![tcp(12.0, 60, DEVICE, PEER, 443)];

        let features = extractor.extract(&window, &full_schema()).unwrap();
        let v = &features.vector;
        assert_eq!(v.get(keys::FLOW_DURATION), Some(0.0));
        assert_eq!(v.get(keys::FLOW_IAT_MEAN), Some(0.0));
        assert_eq!(v.get(keys::FLOW_IAT_MAX), Some(0.0));
        assert!(v.values().all(f64::is_finite));
        assert!(v.get(keys::FLOW_PACKETS_PER_SEC).unwrap() > 0.0);
    }

    #[test]
    fn peers_unknown_when_only_device_traffic_seen() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        let window = vec![tcp(0.0, 60, DEVICE, DEVICE, 80)];

        let features = extractor.extract(&window, &full_schema()).unwrap();
        assert_eq!(features.peers.source_label(), UNKNOWN_PEER);
        assert_eq!(features.peers.destination_label(), UNKNOWN_PEER);
        assert_eq!(features.vector.get(keys::UNIQUE_DST_IPS), Some(0.0));
    }

    #[test]
    fn zero_variance_window_keeps_schema() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        let window: Vec<Packet> = (0..4)
            .map(|i| tcp(i as f64 * 0.25, 64, DEVICE, PEER, 443))
            .collect();
        let schema = full_schema();

        let features = extractor.extract(&window, &schema).unwrap();
        assert_eq!(
            features.vector.keys().collect::<Vec<_>>(),
            schema.iter().map(String::as_str).collect::<Vec<_>>()
        );
        assert_eq!(features.vector.get(keys::PACKET_LENGTH_STD), Some(0.0));
        assert_eq!(features.vector.get(keys::FLOW_IAT_STD), Some(0.0));
    }

    #[test]
    fn schema_keys_without_a_computation_are_zero() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        let schema = vec!["Bwd.IAT.Total".to_string(), keys::FLOW_DURATION.to_string()];
        let window = vec![tcp(0.0, 60, DEVICE, PEER, 443), tcp(2.0, 60, PEER, DEVICE, 1)];

        let features = extractor.extract(&window, &schema).unwrap();
        assert_eq!(features.vector.len(), 2);
        assert_eq!(features.vector.get("Bwd.IAT.Total"), Some(0.0));
        assert_eq!(features.vector.get(keys::FLOW_DURATION), Some(2.0));
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = FeatureExtractor::new(ip(DEVICE));
        let window = vec![
            tcp(0.0, 100, PEER, DEVICE, 51000),
            tcp(0.3, 1500, DEVICE, PEER, 443),
            tcp(0.9, 40, DEVICE, "1.1.1.1", 53),
        ];
        let schema = full_schema();
        assert_eq!(
            extractor.extract(&window, &schema),
            extractor.extract(&window, &schema)
        );
    }

    proptest! {
        #[test]
        fn vector_always_matches_schema(
            samples in proptest::collection::vec((0.0f64..1.0, 40usize..1500, any::<bool>()), 1..64),
        ) {
            let extractor = FeatureExtractor::new(ip(DEVICE));
            let mut ts = 0.0;
            let window: Vec<Packet> = samples
                .into_iter()
                .map(|(gap, len, outbound)| {
                    ts += gap;
                    if outbound {
                        tcp(ts, len, DEVICE, PEER, 443)
                    } else {
                        tcp(ts, len, PEER, DEVICE, 51000)
                    }
                })
                .collect();
            let schema = full_schema();

            let features = extractor.extract(&window, &schema).unwrap();
            prop_assert_eq!(features.vector.len(), schema.len());
            prop_assert!(features.vector.keys().eq(schema.iter().map(String::as_str)));
            prop_assert!(features.vector.values().all(f64::is_finite));
            prop_assert!(features.vector.get(keys::FLOW_DURATION).unwrap() >= 0.0);
        }
    }
}
