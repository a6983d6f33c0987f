//! Packet capture configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Interface name as libpcap lists it.
    #[validate(custom(function = validation::validate_interface))]
    pub interface: String,

    /// Length of one capture window, in seconds.
    #[validate(range(min = 1, max = 3600))]
    pub window_secs: u64,

    pub promiscuous: bool,

    /// Bytes kept per frame. Accepts plain numbers or sizes like "64KiB".
    #[validate(range(min = 64, max = 262144))]
    #[serde(deserialize_with = "deserialize_size")]
    pub snaplen: u32,
}

impl CaptureConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: "eth0".into(),
            window_secs: 10,
            promiscuous: true,
            snaplen: 65535,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Num(u32),
    Str(String),
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeValue::deserialize(deserializer)? {
        SizeValue::Num(n) => Ok(n),
        SizeValue::Str(s) => {
            let s = s.trim();
            let split = s
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(s.len());
            let (digits, unit) = s.split_at(split);
            let number: u32 = digits.parse().map_err(serde::de::Error::custom)?;
            let multiplier = match unit.trim().to_lowercase().as_str() {
                "" | "b" => 1,
                "kb" | "kib" => 1024,
                _ => return Err(serde::de::Error::custom(format!("unknown size unit '{unit}'"))),
            };
            number
                .checked_mul(multiplier)
                .ok_or_else(|| serde::de::Error::custom("size overflows u32"))
        }
    }
}
