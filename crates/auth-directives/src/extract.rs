use http::{header::AUTHORIZATION, HeaderMap};
use schema_graph::RequestContext;
use serde_json::{Map, Value};

use crate::AuthError;

const BEARER_SCHEME: &str = "Bearer";
const CONNECTION_PARAM_KEYS: [&str; 2] = ["Authorization", "authorization"];

/// Finds the bearer token of a request.
///
/// Locations are tried in order: the request `authorization` header, the `Authorization`
/// connection parameter, then the `authorization` header of the wrapping transport. The first
/// non-empty value wins and its `Bearer` scheme is removed. A raw token without scheme is
/// accepted as is, a scheme without token counts as empty.
pub fn extract_bearer_token(ctx: &RequestContext) -> Result<&str, AuthError> {
    header_token(&ctx.headers)
        .or_else(|| connection_param_token(&ctx.connection_params))
        .or_else(|| header_token(&ctx.transport_headers))
        .ok_or(AuthError::MissingCredential)
}

fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(strip_bearer)
}

fn connection_param_token(params: &Map<String, Value>) -> Option<&str> {
    CONNECTION_PARAM_KEYS
        .iter()
        .filter_map(|key| params.get(*key).and_then(Value::as_str))
        .find_map(strip_bearer)
}

fn strip_bearer(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = value
        .strip_prefix(BEARER_SCHEME)
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(params) => params,
            _ => unreachable!(),
        }
    }

    #[rstest]
    #[case::prefixed("Bearer abc.def.ghi", "abc.def.ghi")]
    #[case::raw("abc.def.ghi", "abc.def.ghi")]
    #[case::padded("  Bearer abc  ", "abc")]
    #[case::scheme_glued_to_token("Bearerabc", "Bearerabc")]
    fn from_request_headers(#[case] header: &'static str, #[case] expected: &str) {
        let ctx = RequestContext::new(headers(header));
        assert_eq!(extract_bearer_token(&ctx), Ok(expected));
    }

    #[test]
    fn precedence() {
        let ctx = RequestContext::new(headers("Bearer from-headers"))
            .with_connection_params(params(json!({"Authorization": "Bearer from-connection"})))
            .with_transport_headers(headers("Bearer from-transport"));
        assert_eq!(extract_bearer_token(&ctx), Ok("from-headers"));

        let ctx = RequestContext::default()
            .with_connection_params(params(json!({"Authorization": "Bearer from-connection"})))
            .with_transport_headers(headers("Bearer from-transport"));
        assert_eq!(extract_bearer_token(&ctx), Ok("from-connection"));

        let ctx = RequestContext::default().with_transport_headers(headers("Bearer from-transport"));
        assert_eq!(extract_bearer_token(&ctx), Ok("from-transport"));
    }

    #[test]
    fn connection_params_accept_lowercase_key() {
        let ctx = RequestContext::default().with_connection_params(params(json!({"authorization": "Bearer lower"})));
        assert_eq!(extract_bearer_token(&ctx), Ok("lower"));
    }

    #[test]
    fn empty_values_fall_through() {
        let ctx = RequestContext::new(headers("Bearer "))
            .with_connection_params(params(json!({"Authorization": 42})))
            .with_transport_headers(headers("Bearer fallback"));
        assert_eq!(extract_bearer_token(&ctx), Ok("fallback"));
    }

    #[rstest]
    #[case::bare("Bearer")]
    #[case::trailing_space("Bearer ")]
    #[case::padded("  Bearer   ")]
    fn scheme_without_token_falls_through(#[case] header: &'static str) {
        let ctx = RequestContext::new(headers(header))
            .with_connection_params(params(json!({"Authorization": "Bearer from-connection"})));
        assert_eq!(extract_bearer_token(&ctx), Ok("from-connection"));

        assert_eq!(
            extract_bearer_token(&RequestContext::new(headers(header))),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn missing() {
        assert_eq!(
            extract_bearer_token(&RequestContext::default()),
            Err(AuthError::MissingCredential)
        );
        assert_eq!(
            extract_bearer_token(&RequestContext::new(headers(""))),
            Err(AuthError::MissingCredential)
        );
    }
}
