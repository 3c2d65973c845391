use serde::de::DeserializeOwned;
use tracing::error;
use urlencoding::encode;

use crate::http::{HttpResponse, HttpTransport};
use crate::{DaoError, StatusPost};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
const UPDATE_PATH: &str = "/1.1/statuses/update.json";
const SHOW_PATH: &str = "/1.1/statuses/show.json";
const DESTROY_PATH: &str = "/1.1/statuses/destroy/";

const HTTP_OK: u16 = 200;

/// REST DAO for status posts.
///
/// Translates entity operations into calls against the fixed status
/// endpoints, validates responses, and materializes the backend's JSON into
/// [`StatusPost`] values. Stateless apart from the injected transport.
pub struct StatusDao<T: HttpTransport> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> StatusDao<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    /// Point the DAO at a non-default endpoint (test doubles, staging).
    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Create a status post and return it with the backend-assigned id.
    pub fn create(&self, post: &StatusPost) -> Result<StatusPost, DaoError> {
        post.validate()?;

        let uri = create_uri(&self.base_url, post);
        let response = self.transport.post(&uri)?;
        parse_response(response, HTTP_OK)
    }

    /// Look up a status post by its backend-assigned id.
    pub fn find_by_id(&self, id: &str) -> Result<StatusPost, DaoError> {
        let uri = show_uri(&self.base_url, id);
        let response = self.transport.get(&uri)?;
        parse_response(response, HTTP_OK)
    }

    /// Delete a status post, returning its state immediately before
    /// deletion as reported by the backend.
    ///
    /// The backend models deletion as a POST to a dedicated path.
    pub fn delete_by_id(&self, id: &str) -> Result<StatusPost, DaoError> {
        let uri = destroy_uri(&self.base_url, id);
        let response = self.transport.post(&uri)?;
        parse_response(response, HTTP_OK)
    }
}

/// Build the creation request target.
///
/// The query carries `status`, then `long`, then `lat`; the coordinate
/// parameters are omitted entirely when the post has no coordinates. The
/// caller validates the post first, so a present pair holds both values.
pub fn create_uri(base_url: &str, post: &StatusPost) -> String {
    let mut uri = format!("{base_url}{UPDATE_PATH}?status={}", encode(&post.text));

    if let Some(point) = &post.coordinates {
        if let (Some(longitude), Some(latitude)) = (point.longitude(), point.latitude()) {
            uri.push_str(&format!("&long={longitude}&lat={latitude}"));
        }
    }

    uri
}

/// Build the lookup request target.
pub fn show_uri(base_url: &str, id: &str) -> String {
    format!("{base_url}{SHOW_PATH}?id={id}")
}

/// Build the deletion request target.
pub fn destroy_uri(base_url: &str, id: &str) -> String {
    format!("{base_url}{DESTROY_PATH}{id}.json")
}

/// Validate a raw response and decode its body into an entity.
///
/// Failure modes stay distinguishable: an unexpected status or an empty
/// body is [`DaoError::BackendRequest`], an unreadable body is
/// [`DaoError::Transport`], an undecodable body is [`DaoError::Codec`].
/// The raw error body is logged here, once, and never on rethrow.
pub fn parse_response<E: DeserializeOwned>(
    response: HttpResponse,
    expected_status: u16,
) -> Result<E, DaoError> {
    if response.status != expected_status {
        if !response.body.is_empty() {
            error!(
                "backend returned status {}: {}",
                response.status,
                String::from_utf8_lossy(&response.body)
            );
        }
        return Err(DaoError::backend_request(format!(
            "unexpected HTTP status {}",
            response.status
        )));
    }

    if response.body.is_empty() {
        return Err(DaoError::backend_request("empty response body"));
    }

    let text = String::from_utf8(response.body)
        .map_err(|error| DaoError::transport(format!("response body is not text: {error}")))?;

    serde_json::from_str(&text).map_err(|error| DaoError::codec(error.to_string()))
}
