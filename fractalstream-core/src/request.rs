use crate::error::RequestError;

/// Parameters of one calculation, sent to the backend as query parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalculationRequest {
    width: u32,
    center_re: f64,
    center_im: f64,
    extent: f64,
    max_iterations: u32,
}

impl CalculationRequest {
    pub fn new(
        width: u32,
        center_re: f64,
        center_im: f64,
        extent: f64,
        max_iterations: u32,
    ) -> Result<Self, RequestError> {
        if width == 0 {
            return Err(RequestError::ZeroWidth);
        }
        if max_iterations == 0 {
            return Err(RequestError::ZeroIterations);
        }
        if !(extent.is_finite() && extent > 0.0) {
            return Err(RequestError::InvalidExtent(extent));
        }
        if !(center_re.is_finite() && center_im.is_finite()) {
            return Err(RequestError::InvalidCenter(center_re, center_im));
        }
        Ok(Self {
            width,
            center_re,
            center_im,
            extent,
            max_iterations,
        })
    }

    /// Same request around a different point of the complex plane.
    pub fn with_center(&self, center_re: f64, center_im: f64) -> Result<Self, RequestError> {
        Self::new(
            self.width,
            center_re,
            center_im,
            self.extent,
            self.max_iterations,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn center(&self) -> (f64, f64) {
        (self.center_re, self.center_im)
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Parameters in the order `width, pR, pI, extent, iterations`.
    pub fn query_params(&self) -> [(&'static str, String); 5] {
        [
            ("width", self.width.to_string()),
            ("pR", self.center_re.to_string()),
            ("pI", self.center_im.to_string()),
            ("extent", self.extent.to_string()),
            ("iterations", self.max_iterations.to_string()),
        ]
    }

    /// `key=value` pairs joined by `&`, values percent-encoded.
    pub fn query_string(&self) -> String {
        self.query_params()
            .iter()
            .map(|(key, value)| format!("{}={}", key, encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full connection URL for `backend_url`.
    pub fn url(&self, backend_url: &str) -> String {
        format!("{}?{}", backend_url, self.query_string())
    }
}

/// Percent-encode everything outside the URI-component unreserved set.
fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
