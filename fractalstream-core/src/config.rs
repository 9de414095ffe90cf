//! Client configuration.
//!
//! Every field has a default, so a JSON override only needs to name what it
//! changes.

use crate::colorizers::DEFAULT_SCHEME;
use crate::error::{ConfigError, RequestError};
use crate::request::CalculationRequest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "ws://localhost:8080/mandelbrot";
pub const DEFAULT_WIDTH: u32 = 600;

/// Starting parameters of the first calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub center_re: f64,
    pub center_im: f64,
    pub extent: f64,
    pub max_iterations: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            center_re: -2.2,
            center_im: -1.4,
            extent: 2.8,
            max_iterations: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend_url: String,
    /// Requested picture width in pixels. The server may round it.
    pub desired_width: u32,
    pub defaults: RequestDefaults,
    /// Initially selected colour scheme.
    pub color_scheme: String,
    /// Verbose session logging.
    pub logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            desired_width: DEFAULT_WIDTH,
            defaults: RequestDefaults::default(),
            color_scheme: DEFAULT_SCHEME.to_string(),
            logging: false,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by whatever `json` specifies.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The request for the initial view.
    pub fn default_request(&self) -> Result<CalculationRequest, RequestError> {
        CalculationRequest::new(
            self.desired_width,
            self.defaults.center_re,
            self.defaults.center_im,
            self.defaults.extent,
            self.defaults.max_iterations,
        )
    }
}
