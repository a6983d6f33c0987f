//! Classification results and the payload posted to the collector.

use serde::{Deserialize, Serialize};

use crate::error::MetricError;
use crate::features::{keys, FeatureVector, ObservedPeers};

/// One entry of the ranked class list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClass {
    pub label: String,
    pub probability: f64,
}

/// Ranked top classes of one window, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    ranked: Vec<RankedClass>,
    confidence: f64,
}

impl ClassificationResult {
    /// Wraps an already ranked list. Returns `None` for an empty list, since
    /// a result without a top class has no confidence.
    pub fn from_ranked(ranked: Vec<RankedClass>) -> Option<Self> {
        let confidence = ranked.first()?.probability;
        Some(Self { ranked, confidence })
    }

    pub fn ranked(&self) -> &[RankedClass] {
        &self.ranked
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn top_label(&self) -> &str {
        // `from_ranked` rejects empty lists
        &self.ranked[0].label
    }

    pub fn into_ranked(self) -> Vec<RankedClass> {
        self.ranked
    }
}

/// Summary numbers reported alongside a classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetrics {
    pub flow_duration: f64,
    pub total_packets: u64,
    pub total_bytes: u64,
    pub average_packet_size: f64,
    pub packet_rate: f64,
    pub byte_rate: f64,
}

impl FlowMetrics {
    /// Reads the six summary metrics back out of a schema-projected vector.
    ///
    /// Fails when the model schema does not carry one of the keys, or when a
    /// value cannot be represented (non-finite, negative count).
    pub fn from_features(features: &FeatureVector) -> Result<Self, MetricError> {
        Ok(Self {
            flow_duration: real(features, keys::FLOW_DURATION)?,
            total_packets: count(features, keys::TOTAL_FWD_PACKETS)?,
            total_bytes: count(features, keys::TOTAL_LENGTH_FWD_PACKETS)?,
            average_packet_size: real(features, keys::AVERAGE_PACKET_SIZE)?,
            packet_rate: real(features, keys::FLOW_PACKETS_PER_SEC)?,
            byte_rate: real(features, keys::FLOW_BYTES_PER_SEC)?,
        })
    }

    pub fn zeroed() -> Self {
        Self::default()
    }
}

fn real(features: &FeatureVector, key: &'static str) -> Result<f64, MetricError> {
    let value = features.get(key).ok_or(MetricError::MissingFeature(key))?;
    if !value.is_finite() {
        return Err(MetricError::NonFinite { key, value });
    }
    Ok(value)
}

fn count(features: &FeatureVector, key: &'static str) -> Result<u64, MetricError> {
    let value = real(features, key)?;
    if value < 0.0 {
        return Err(MetricError::NegativeCount { key, value });
    }
    Ok(value.trunc() as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedClass {
    pub classes: Vec<RankedClass>,
}

/// JSON body of a classification POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    #[serde(rename = "destinationIP")]
    pub destination_ip: String,
    pub source_port: u16,
    pub destination_port: u16,
    pub predicted_class: PredictedClass,
    pub confidence: f64,
    pub metrics: FlowMetrics,
}

impl ReportPayload {
    /// Ports are not tracked per flow and are always sent as 0.
    pub fn new(result: ClassificationResult, metrics: FlowMetrics, peers: ObservedPeers) -> Self {
        let confidence = result.confidence();
        Self {
            source_ip: peers.source_label(),
            destination_ip: peers.destination_label(),
            source_port: 0,
            destination_port: 0,
            predicted_class: PredictedClass {
                classes: result.into_ranked(),
            },
            confidence,
            metrics,
        }
    }

    pub fn top_label(&self) -> Option<&str> {
        self.predicted_class
            .classes
            .first()
            .map(|class| class.label.as_str())
    }
}
