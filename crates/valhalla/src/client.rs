use std::time::Duration;

use async_trait::async_trait;
use batches::{MatrixClient, MatrixError};
use log::{debug, warn};
use model::{MatrixRequest, MatrixResult, Measurement};
use serde::Deserialize;

use crate::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SourcesToTargets {
    sources_to_targets: Option<Vec<Vec<Measurement>>>,
}

/// Client for the matrix endpoint of a Valhalla server.
#[derive(Clone)]
pub struct ValhallaClient {
    base_url: String,
    client: reqwest::Client,
}

impl ValhallaClient {
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: server.trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Posts `request` to `/sources_to_targets` and returns the first row of
    /// the matrix.
    pub async fn sources_to_targets(&self, request: &MatrixRequest) -> Result<MatrixResult, ApiError> {
        let url = format!("{}/sources_to_targets", self.base_url);
        debug!(
            "Requesting {} targets from '{url}'.",
            request.target_count()
        );
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        // Valhalla reports routing failures as 4xx with a JSON error body.
        if !status.is_success() && serde_json::from_str::<serde_json::Value>(&body).is_err() {
            return Err(ApiError::InvalidResponse {
                status_code: status,
                url,
                response: Some(body),
            });
        }

        parse_matrix(&body, request.target_count())
    }
}

/// Extracts the first row of `sources_to_targets`, keeping the raw body in
/// the error when it is missing or not exactly `targets` long.
fn parse_matrix(body: &str, targets: usize) -> Result<MatrixResult, ApiError> {
    let parsed: SourcesToTargets = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(why) => {
            warn!("could not parse matrix response: {why}");
            return Err(ApiError::MalformedResponse(body.to_owned()));
        }
    };

    match parsed
        .sources_to_targets
        .and_then(|rows| rows.into_iter().next())
    {
        Some(row) if row.len() == targets => Ok(row),
        _ => Err(ApiError::MalformedResponse(body.to_owned())),
    }
}

#[async_trait]
impl MatrixClient for ValhallaClient {
    async fn sources_to_targets(&self, request: &MatrixRequest) -> Result<MatrixResult, MatrixError> {
        ValhallaClient::sources_to_targets(self, request)
            .await
            .map_err(MatrixError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_row() {
        let body = r#"{"sources_to_targets":[[
            {"distance":4.949,"time":1191,"to_index":0,"from_index":0},
            {"distance":null,"time":null,"to_index":1,"from_index":0}
        ]],"units":"kilometers"}"#;
        let row = parse_matrix(body, 2).unwrap();
        assert_eq!(row[0].distance, Some(4.949));
        assert_eq!(row[0].time, Some(1191));
        assert_eq!(row[1].distance, None);
        assert_eq!(row[1].to_index, Some(1));
    }

    #[test]
    fn missing_matrix_is_malformed() {
        let body = r#"{"error_code":171,"error":"No suitable edges near location"}"#;
        match parse_matrix(body, 1) {
            Err(ApiError::MalformedResponse(raw)) => assert_eq!(raw, body),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_length_is_malformed() {
        let body = r#"{"sources_to_targets":[[{"distance":1.0,"time":60}]]}"#;
        assert!(matches!(
            parse_matrix(body, 2),
            Err(ApiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_matrix(r#"{"sources_to_targets":[]}"#, 1),
            Err(ApiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_matrix("not json", 1),
            Err(ApiError::MalformedResponse(_))
        ));
    }
}
