//! Response data read by response variables.

use super::collection::KeyValueCollection;

/// Response data container.
#[derive(Debug, Clone, Default)]
pub struct ResponseData {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: KeyValueCollection,
    /// Response body.
    pub body: Vec<u8>,
}

impl ResponseData {
    /// Create new response data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Add a response header.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    /// Append to response body.
    pub fn append_body(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }

    /// Get body as string.
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
