//! Crowd estimation from camera frames.
//!
//! Image decoding and inference live outside this crate. The
//! [`CrowdEstimator`] trait is the seam: implementations turn raw frame
//! bytes into a [`CrowdEstimate`].

use std::time::Duration;

use crowd_planner_ingest_models::CrowdEstimate;
use crowd_planner_zone_models::DensityLevel;
use serde::Deserialize;

/// Default per-request timeout for [`HttpCrowdEstimator`].
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from crowd estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// No crowd model is configured or reachable.
    #[error("Crowd model unavailable")]
    Unavailable,

    /// The frame could not be decoded as an image.
    #[error("Could not decode image: {message}")]
    Decode {
        /// Why decoding failed.
        message: String,
    },

    /// HTTP request to the model service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model service returned something other than an estimate.
    #[error("Invalid model response: {message}")]
    InvalidResponse {
        /// Description of what was wrong with the response.
        message: String,
    },
}

/// Turns a raw image frame into a crowd estimate.
#[async_trait::async_trait]
pub trait CrowdEstimator: Send + Sync {
    /// Estimates the crowd in `frame` (encoded image bytes).
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError`] if the frame cannot be decoded or the
    /// model cannot produce an estimate.
    async fn estimate(&self, frame: &[u8]) -> Result<CrowdEstimate, EstimateError>;
}

/// Estimator used when no crowd model is configured.
pub struct UnavailableEstimator;

#[async_trait::async_trait]
impl CrowdEstimator for UnavailableEstimator {
    async fn estimate(&self, _frame: &[u8]) -> Result<CrowdEstimate, EstimateError> {
        Err(EstimateError::Unavailable)
    }
}

/// Estimator backed by an external inference service.
///
/// The frame is POSTed as `application/octet-stream`. The service answers
/// with `{"estimated_people": <number>}` and may also include a
/// `density_level`. A missing or unrecognized level is derived from the
/// count.
pub struct HttpCrowdEstimator {
    url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ModelResponse {
    estimated_people: f64,
    #[serde(default)]
    density_level: Option<String>,
}

impl HttpCrowdEstimator {
    /// Creates an estimator posting frames to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Http`] if the HTTP client cannot be built.
    pub fn new(url: &str) -> Result<Self, EstimateError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_MODEL_TIMEOUT)
            .build()?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl CrowdEstimator for HttpCrowdEstimator {
    async fn estimate(&self, frame: &[u8]) -> Result<CrowdEstimate, EstimateError> {
        if frame.is_empty() {
            return Err(EstimateError::Decode {
                message: "empty frame".to_string(),
            });
        }

        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/octet-stream")
            .body(frame.to_vec())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(EstimateError::Decode { message: body });
        }
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(EstimateError::Unavailable);
        }
        if !status.is_success() {
            return Err(EstimateError::InvalidResponse {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: ModelResponse =
            serde_json::from_str(&body).map_err(|e| EstimateError::InvalidResponse {
                message: e.to_string(),
            })?;

        estimate_from_response(&parsed)
    }
}

fn estimate_from_response(resp: &ModelResponse) -> Result<CrowdEstimate, EstimateError> {
    let people = people_from_prediction(resp.estimated_people)?;
    let derived = CrowdEstimate::from_count(people);

    let Some(label) = resp.density_level.as_deref() else {
        return Ok(derived);
    };

    match label.parse::<DensityLevel>() {
        Ok(density_level) => Ok(CrowdEstimate {
            estimated_people: people,
            density_level,
        }),
        Err(_) => {
            log::debug!("Ignoring unknown density level {label:?} from crowd model");
            Ok(derived)
        }
    }
}

/// Truncates a raw model prediction to a people count, clamping negative
/// and oversized values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn people_from_prediction(prediction: f64) -> Result<u32, EstimateError> {
    if !prediction.is_finite() {
        return Err(EstimateError::InvalidResponse {
            message: format!("non-finite people estimate {prediction}"),
        });
    }
    Ok(prediction.clamp(0.0, f64::from(u32::MAX)) as u32)
}
