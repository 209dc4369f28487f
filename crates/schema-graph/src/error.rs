use std::borrow::Cow;

use serde::ser::SerializeMap;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    BadRequest,
    InternalServerError,
    // Auth
    Unauthenticated,
    Unauthorized,
    // Resolvers
    ResolverError,
}

impl From<ErrorCode> for http::StatusCode {
    fn from(code: ErrorCode) -> http::StatusCode {
        match code {
            ErrorCode::BadRequest => http::StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => http::StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized => http::StatusCode::FORBIDDEN,
            // A resolver failure is a partial result, the response itself is fine.
            ErrorCode::ResolverError => http::StatusCode::OK,
            ErrorCode::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type GraphqlResult<T> = Result<T, GraphqlError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct GraphqlError {
    pub message: Cow<'static, str>,
    pub code: ErrorCode,
    pub path: Option<ErrorPath>,
    // Serialized as a map, but kept as a Vec for efficiency.
    pub extensions: Vec<(Cow<'static, str>, serde_json::Value)>,
}

impl GraphqlError {
    pub fn new(message: impl Into<Cow<'static, str>>, code: ErrorCode) -> Self {
        GraphqlError {
            message: message.into(),
            code,
            path: None,
            extensions: Vec::new(),
        }
    }

    pub fn internal_server_error() -> Self {
        GraphqlError::new("Internal server error", ErrorCode::InternalServerError)
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<ErrorPath>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions.push((key.into(), value.into()));
        self
    }

    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions
            .iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }
}

impl serde::Serialize for GraphqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(path) = &self.path {
            map.serialize_entry("path", path)?;
        }
        map.serialize_entry("extensions", &SerializableExtensions(self))?;
        map.end()
    }
}

struct SerializableExtensions<'a>(&'a GraphqlError);

impl serde::Serialize for SerializableExtensions<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.extensions.len() + 1))?;
        map.serialize_entry("code", &self.0.code)?;
        for (key, value) in &self.0.extensions {
            // The code always comes from the error itself.
            if key != "code" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct ErrorPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl ErrorPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[must_use]
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        ErrorPath(segments)
    }
}

impl From<Vec<PathSegment>> for ErrorPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        ErrorPath(segments)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for ErrorPath {
    fn from(name: &str) -> Self {
        ErrorPath(vec![name.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_code_first_in_extensions() {
        let error = GraphqlError::new("Insufficient roles", ErrorCode::Unauthorized)
            .with_path(ErrorPath::from("posts").child(0usize).child("author"))
            .with_extension("code", "IGNORED")
            .with_extension("missing", serde_json::json!(["ADMIN"]));

        insta::assert_json_snapshot!(error, @r#"
        {
          "message": "Insufficient roles",
          "path": [
            "posts",
            0,
            "author"
          ],
          "extensions": {
            "code": "UNAUTHORIZED",
            "missing": [
              "ADMIN"
            ]
          }
        }
        "#);
    }

    #[test]
    fn codes_map_to_http_statuses() {
        assert_eq!(
            http::StatusCode::from(ErrorCode::Unauthenticated),
            http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(http::StatusCode::from(ErrorCode::Unauthorized), http::StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::InternalServerError.as_ref(), "INTERNAL_SERVER_ERROR");
    }
}
