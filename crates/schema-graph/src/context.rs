use std::sync::{Mutex, PoisonError};

/// Everything the transport knows about the request being executed.
///
/// One context is created per request and is never shared between requests. The graph only
/// reads the transport data, derived state (the authenticated user for example) is stored as
/// typed extensions.
#[derive(Default)]
pub struct RequestContext {
    /// Headers of the HTTP request.
    pub headers: http::HeaderMap,
    /// Parameters sent when a persistent connection was initialized, typically the payload of
    /// a websocket `connection_init` message.
    pub connection_params: serde_json::Map<String, serde_json::Value>,
    /// Headers as exposed by an alternate transport wrapping the request.
    pub transport_headers: http::HeaderMap,
    extensions: Mutex<http::Extensions>,
}

impl RequestContext {
    pub fn new(headers: http::HeaderMap) -> Self {
        RequestContext {
            headers,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connection_params(mut self, params: serde_json::Map<String, serde_json::Value>) -> Self {
        self.connection_params = params;
        self
    }

    #[must_use]
    pub fn with_transport_headers(mut self, headers: http::HeaderMap) -> Self {
        self.transport_headers = headers;
        self
    }

    /// Stores a value, replacing any previous value of the same type.
    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&self, value: T) -> Option<T> {
        self.extensions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(value)
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.extensions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get::<T>()
            .cloned()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Headers may carry credentials, only their names are shown.
        f.debug_struct("RequestContext")
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("connection_params", &self.connection_params.keys().collect::<Vec<_>>())
            .field("transport_headers", &self.transport_headers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
