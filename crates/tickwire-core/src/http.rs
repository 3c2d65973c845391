use std::time::Duration;

use crate::DaoError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw response surfaced by a transport: status code plus body bytes.
///
/// An empty body is represented by an empty byte vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport collaborator executing HTTP calls against fully formed URIs.
///
/// Implementations own connection management, TLS, and timeouts; this layer
/// only sees the status code and the raw body. Failures to complete a call
/// surface as [`DaoError::Transport`].
pub trait HttpTransport: Send + Sync {
    fn get(&self, uri: &str) -> Result<HttpResponse, DaoError>;
    fn post(&self, uri: &str) -> Result<HttpResponse, DaoError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn get(&self, uri: &str) -> Result<HttpResponse, DaoError> {
        (**self).get(uri)
    }

    fn post(&self, uri: &str) -> Result<HttpResponse, DaoError> {
        (**self).post(uri)
    }
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, DaoError> {
        let user_agent = format!("tickwire/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(|error| DaoError::transport(format!("failed to build client: {error}")))?;

        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse, DaoError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|error| DaoError::transport(format!("failed to read body: {error}")))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, uri: &str) -> Result<HttpResponse, DaoError> {
        let response = self
            .client
            .get(uri)
            .send()
            .map_err(|error| DaoError::transport(format!("GET {uri} failed: {error}")))?;
        Self::read(response)
    }

    fn post(&self, uri: &str) -> Result<HttpResponse, DaoError> {
        let response = self
            .client
            .post(uri)
            .send()
            .map_err(|error| DaoError::transport(format!("POST {uri} failed: {error}")))?;
        Self::read(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_vec() {
        let response = HttpResponse::new(200, Vec::new());
        assert!(response.body.is_empty());
    }
}
