mod common;

use auth_config::AuthConfig;
use auth_directives::{declare_auth_directives, AuthDirectives, AuthError, Claims, FieldError, RootField};
use common::{anonymous, authorization, mutation, query, token, user, wrap};
use schema_graph::{resolver::constant, DirectiveRecord, OperationGraph, RequestContext};
use serde_json::{json, Value};

fn is_authenticated() -> DirectiveRecord {
    DirectiveRecord::new("isAuthenticated")
}

fn schema() -> OperationGraph {
    declare_auth_directives(OperationGraph::builder())
        .input_object("TestInput", |input| {
            input.field("input", "String!");
            input.field("protectedInput", "String").directive(is_authenticated());
        })
        .object("TestResponse", |response| {
            response.field("field", "String!");
            response
                .field("protectedFieldWithoutResolver", "String")
                .directive(is_authenticated());
            response
                .field("protectedFieldWithResolver", "String")
                .directive(is_authenticated())
                .resolver(constant("Protected Field With Resolver"));
        })
        .object("Query", |query| {
            query
                .field("protectedQuery", "String!")
                .argument("data", "TestInput!")
                .resolver(constant("Protected Query"));
            query.field("unprotectedQuery", "TestResponse!").resolver(constant(json!({
                "field": "Field",
                "protectedFieldWithoutResolver": "Protected Field Without Resolver"
            })));
            query
                .field("me", "String")
                .directive(is_authenticated())
                .resolve_with(|input| {
                    let claims = Claims::current(input.context).unwrap_or_default();
                    Ok(claims.subject.map(Value::String).unwrap_or(Value::Null))
                });
        })
        .object("Mutation", |mutation| {
            mutation
                .field("protectedMutation", "String!")
                .argument("data", "TestInput!")
                .directive(is_authenticated())
                .resolver(constant("Protected Mutation"));
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn query_input_not_set() {
    let graph = wrap(schema());

    let response = query(
        &graph,
        RootField::new("protectedQuery").argument("data", json!({"input": "foo"})),
        &anonymous(),
    )
    .await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "protectedQuery": "Protected Query"
      }
    }
    "#);
}

#[tokio::test]
async fn query_input_set_anonymously() {
    let graph = wrap(schema());

    let response = query(
        &graph,
        RootField::new("protectedQuery").argument("data", json!({"input": "foo", "protectedInput": "bar"})),
        &anonymous(),
    )
    .await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "protectedQuery": null
      },
      "errors": [
        {
          "message": "Authorization header missing",
          "path": [
            "protectedQuery"
          ],
          "extensions": {
            "code": "UNAUTHENTICATED",
            "reason": "MISSING_CREDENTIAL"
          }
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn any_claims_are_enough() {
    let graph = wrap(schema());
    let ctx = user(json!({}));

    let response = mutation(
        &graph,
        RootField::new("protectedMutation").argument("data", json!({"input": "foo", "protectedInput": "bar"})),
        &ctx,
    )
    .await;

    assert!(response.errors.is_empty());
    assert_eq!(response.data.unwrap()["protectedMutation"], json!("Protected Mutation"));
}

#[tokio::test]
async fn tampered_token() {
    let graph = wrap(schema());
    // Claims of one token with the signature of another.
    let signed = token(json!({"sub": "user-1"}));
    let forged = token(json!({"sub": "admin"}));
    let [header, _, signature] = signed.split('.').collect::<Vec<_>>()[..] else {
        unreachable!()
    };
    let payload = forged.split('.').nth(1).unwrap();
    let token = format!("{header}.{payload}.{signature}");
    let ctx = RequestContext::new(authorization(&format!("Bearer {token}")));

    let response = mutation(
        &graph,
        RootField::new("protectedMutation").argument("data", json!({"input": "foo"})),
        &ctx,
    )
    .await;

    insta::assert_json_snapshot!(response.errors, @r#"
    [
      {
        "message": "Invalid authorization token",
        "path": [
          "protectedMutation"
        ],
        "extensions": {
          "code": "UNAUTHENTICATED",
          "reason": "INVALID_CREDENTIAL"
        }
      }
    ]
    "#);
}

#[tokio::test]
async fn object_fields() {
    let graph = wrap(schema());
    let parent = json!({
        "field": "Field",
        "protectedFieldWithoutResolver": "Protected Field Without Resolver"
    });
    let arguments = serde_json::Map::new();

    for field in ["protectedFieldWithoutResolver", "protectedFieldWithResolver"] {
        assert_eq!(
            graph
                .resolve("TestResponse", field, &parent, &arguments, &anonymous())
                .await,
            Err(FieldError::Auth(AuthError::MissingCredential)),
        );
    }

    let ctx = user(json!({}));
    let mut resolved = Vec::new();
    for field in ["field", "protectedFieldWithoutResolver", "protectedFieldWithResolver"] {
        resolved.push(graph.resolve("TestResponse", field, &parent, &arguments, &ctx).await.unwrap());
    }
    insta::assert_json_snapshot!(resolved, @r#"
    [
      "Field",
      "Protected Field Without Resolver",
      "Protected Field With Resolver"
    ]
    "#);
}

#[tokio::test]
async fn current_user_is_available_to_resolvers() {
    let graph = wrap(schema());
    let ctx = user(json!({"sub": "user-1"}));

    let response = query(&graph, RootField::new("me"), &ctx).await;

    assert_eq!(response.data.unwrap()["me"], json!("user-1"));
    assert_eq!(Claims::current(&ctx).unwrap().subject.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn token_from_connection_params() {
    let graph = wrap(schema());
    let params = json!({"Authorization": format!("Bearer {}", token(json!({"sub": "ws-user"})))});
    let ctx = RequestContext::default().with_connection_params(params.as_object().cloned().unwrap_or_default());

    let response = query(&graph, RootField::new("me"), &ctx).await;

    assert_eq!(response.data.unwrap()["me"], json!("ws-user"));
}

#[tokio::test]
async fn token_from_transport_headers() {
    let graph = wrap(schema());
    let ctx = RequestContext::default()
        .with_transport_headers(authorization(&format!("Bearer {}", token(json!({"sub": "lambda-user"})))));

    let response = query(&graph, RootField::new("me"), &ctx).await;

    assert_eq!(response.data.unwrap()["me"], json!("lambda-user"));
}

#[tokio::test]
async fn missing_secret() {
    let graph = AuthDirectives::new(&AuthConfig::default()).wrap(schema()).unwrap();
    let ctx = user(json!({"sub": "user-1"}));

    let response = mutation(
        &graph,
        RootField::new("protectedMutation").argument("data", json!({"input": "foo"})),
        &ctx,
    )
    .await;

    insta::assert_json_snapshot!(response.errors, @r#"
    [
      {
        "message": "Missing signing secret",
        "path": [
          "protectedMutation"
        ],
        "extensions": {
          "code": "INTERNAL_SERVER_ERROR",
          "reason": "MISSING_SECRET"
        }
      }
    ]
    "#);
}
