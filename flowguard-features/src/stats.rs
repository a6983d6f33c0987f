//! Population statistics over a window's samples.

use flowguard_core::features::keys;

/// Min/max/mean/std/variance of one sample set. Every field is 0.0 for an
/// empty set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub variance: f64,
}

impl Summary {
    pub fn of(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        Self {
            min,
            max,
            mean,
            // Rounding can leave a tiny negative sum of squares; clamp it.
            std: variance.max(0.0).sqrt(),
            variance: variance.max(0.0),
        }
    }
}

/// Every named value computed for one window, before schema projection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowStats {
    pub duration: f64,
    pub packet_count: usize,
    pub total_bytes: f64,
    pub lengths: Summary,
    pub inter_arrival: Summary,
    pub bytes_per_sec: f64,
    pub packets_per_sec: f64,
    pub unique_dst_ips: usize,
    pub unique_dst_ports: usize,
}

impl FlowStats {
    /// Looks up a computed value by its feature key.
    pub fn value(&self, key: &str) -> Option<f64> {
        let value = match key {
            keys::FLOW_DURATION => self.duration,
            keys::TOTAL_FWD_PACKETS => self.packet_count as f64,
            keys::TOTAL_LENGTH_FWD_PACKETS => self.total_bytes,
            keys::FWD_PACKET_LENGTH_MAX | keys::MAX_PACKET_LENGTH => self.lengths.max,
            keys::FWD_PACKET_LENGTH_MIN | keys::MIN_PACKET_LENGTH => self.lengths.min,
            keys::FWD_PACKET_LENGTH_MEAN | keys::PACKET_LENGTH_MEAN | keys::AVERAGE_PACKET_SIZE => {
                self.lengths.mean
            }
            keys::FWD_PACKET_LENGTH_STD | keys::PACKET_LENGTH_STD => self.lengths.std,
            keys::PACKET_LENGTH_VARIANCE => self.lengths.variance,
            keys::FLOW_BYTES_PER_SEC => self.bytes_per_sec,
            keys::FLOW_PACKETS_PER_SEC => self.packets_per_sec,
            keys::FLOW_IAT_MEAN => self.inter_arrival.mean,
            keys::FLOW_IAT_STD => self.inter_arrival.std,
            keys::FLOW_IAT_MAX => self.inter_arrival.max,
            keys::FLOW_IAT_MIN => self.inter_arrival.min,
            keys::UNIQUE_DST_IPS => self.unique_dst_ips as f64,
            keys::UNIQUE_DST_PORTS => self.unique_dst_ports as f64,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_are_all_zero() {
        assert_eq!(Summary::of(&[]), Summary::default());
    }

    #[test]
    fn population_statistics() {
        let summary = Summary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.variance, 4.0);
        assert_eq!(summary.std, 2.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn constant_samples_have_zero_spread() {
        let summary = Summary::of(&[60.0; 5]);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.variance, 0.0);
        assert!(!summary.std.is_nan());
    }

    #[test]
    fn unknown_key_has_no_value() {
        assert_eq!(FlowStats::default().value("Bwd.Packets.s"), None);
        assert_eq!(FlowStats::default().value(keys::FLOW_IAT_MIN), Some(0.0));
    }
}
