#![allow(dead_code)]

use auth_config::AuthConfig;
use auth_directives::{AuthDirectives, Response, RootField, WrappedGraph};
use jsonwebtoken::{encode, EncodingKey, Header};
use schema_graph::{OperationGraph, OperationType, RequestContext};
use serde_json::Value;

pub const SECRET: &str = "integration-tests";

pub fn config() -> AuthConfig {
    AuthConfig::default().with_secret(SECRET)
}

pub fn wrap(graph: OperationGraph) -> WrappedGraph {
    AuthDirectives::new(&config()).wrap(graph).unwrap()
}

pub fn token(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn authorization(value: &str) -> http::HeaderMap {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::AUTHORIZATION, value.parse().unwrap());
    headers
}

/// A request carrying a valid token with the given claims.
pub fn user(claims: Value) -> RequestContext {
    RequestContext::new(authorization(&format!("Bearer {}", token(claims))))
}

pub fn anonymous() -> RequestContext {
    RequestContext::default()
}

pub async fn query(graph: &WrappedGraph, field: RootField, ctx: &RequestContext) -> Response {
    graph.execute(OperationType::Query, &[field], ctx).await
}

pub async fn mutation(graph: &WrappedGraph, field: RootField, ctx: &RequestContext) -> Response {
    graph.execute(OperationType::Mutation, &[field], ctx).await
}
