use reqwest::Url;

use crate::error::ReportError;

/// Derives the log endpoint from the classification endpoint.
///
/// `/predict` is swapped for `/logs`; without it, the last path segment is
/// replaced by `logs`. Query strings are dropped in the second case.
pub fn log_endpoint(endpoint: &str) -> Result<String, ReportError> {
    let invalid = |reason: String| ReportError::Endpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if endpoint.contains("/predict") {
        return Ok(endpoint.replace("/predict", "/logs"));
    }

    url.set_query(None);
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot carry a path".into()))?
        .pop_if_empty()
        .pop()
        .push("logs");
    Ok(url.to_string())
}
