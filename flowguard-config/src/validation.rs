//! Custom validation functions for configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

static HTTP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/?#]+(:\d+)?(/\S*)?$").expect("static regex")
});

static LEVEL_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(trace|debug|info|warn|error|off)$").expect("static regex")
});

/// Interface names as libpcap reports them. Covers Linux names (`eth0`,
/// `wlp3s0`, `br-1a2b`) and Npcap device paths (`\Device\NPF_{GUID}`).
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= 256
        && !name.chars().any(|c| c.is_whitespace() || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}

pub fn validate_endpoint(url: &str) -> Result<(), ValidationError> {
    if HTTP_URL.is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_http_endpoint"))
    }
}

/// Accepts a bare level (`info`) or an `EnvFilter` directive list whose
/// first entry is a bare level (`info,flowguard_engine=debug`).
pub fn validate_level(level: &str) -> Result<(), ValidationError> {
    let default = level.split(',').next().unwrap_or_default().trim();
    if LEVEL_DIRECTIVE.is_match(default) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interfaces() {
        assert!(validate_interface("eth0").is_ok());
        assert!(validate_interface("br-1a2b3c").is_ok());
        assert!(validate_interface(r"\Device\NPF_{4B1F6A0E-0000-4E57-9D3C-0123456789AB}").is_ok());
        assert!(validate_interface("").is_err());
        assert!(validate_interface("eth 0").is_err());
    }

    #[test]
    fn endpoints() {
        assert!(validate_endpoint("http://collector.local:8080/api/predict").is_ok());
        assert!(validate_endpoint("https://10.0.0.1/predict").is_ok());
        assert!(validate_endpoint("ftp://collector/predict").is_err());
        assert!(validate_endpoint("collector/predict").is_err());
    }

    #[test]
    fn levels() {
        assert!(validate_level("info").is_ok());
        assert!(validate_level("DEBUG,hyper=warn").is_ok());
        assert!(validate_level("verbose").is_err());
    }
}
