mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use auth_directives::{declare_auth_directives, AuthDirectives, AuthError, DirectiveKind, FieldError, RootField};
use common::{anonymous, config, mutation, query, user, wrap};
use schema_graph::{resolver::constant, DirectiveRecord, OperationGraph, RequestContext};
use serde_json::json;

fn has_role(roles: &[&str]) -> DirectiveRecord {
    DirectiveRecord::new("hasRole").argument("roles", json!(roles))
}

fn schema() -> OperationGraph {
    declare_auth_directives(OperationGraph::builder())
        .input_object("TestInput", |input| {
            input.field("input", "String!");
            input.field("protectedInput", "String").directive(has_role(&["ADMIN"]));
            input
                .field("visibility", "String")
                .default_value("PRIVATE")
                .directive(has_role(&["PUBLISHER"]));
        })
        .object("Query", |query| {
            query
                .field("protectedQuery", "String!")
                .directive(has_role(&["USER"]))
                .resolver(constant("Protected Query"));
            query
                .field("anyStaff", "String!")
                .directive(has_role(&["ADMIN", "EDITOR"]))
                .resolver(constant("Staff"));
            query
                .field("noRoleRequired", "String!")
                .directive(has_role(&[]))
                .resolver(constant("Open"));
            query
                .field("adminOnly", "String!")
                .directive(DirectiveRecord::new("isAuthenticated"))
                .directive(has_role(&["ADMIN"]))
                .resolver(constant("Admin"));
        })
        .object("Mutation", |mutation| {
            mutation
                .field("protectedMutation", "String!")
                .argument("data", "TestInput!")
                .resolver(constant("Protected Mutation"));
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn query_with_role() {
    let graph = wrap(schema());

    let response = query(&graph, RootField::new("protectedQuery"), &user(json!({"roles": ["USER"]}))).await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "protectedQuery": "Protected Query"
      }
    }
    "#);
}

#[tokio::test]
async fn query_without_role() {
    let graph = wrap(schema());

    let response = query(&graph, RootField::new("protectedQuery"), &user(json!({"roles": ["GUEST"]}))).await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "protectedQuery": null
      },
      "errors": [
        {
          "message": "Insufficient roles. Missing one of these: USER",
          "path": [
            "protectedQuery"
          ],
          "extensions": {
            "code": "UNAUTHORIZED",
            "missing": [
              "USER"
            ],
            "reason": "INSUFFICIENT_ROLE"
          }
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn any_of_the_roles() {
    let graph = wrap(schema());
    let field = graph.field_id("Query", "anyStaff").unwrap();
    let arguments = serde_json::Map::new();
    let null = serde_json::Value::Null;

    for roles in [json!(["EDITOR"]), json!("ADMIN"), json!(["GUEST", "ADMIN"])] {
        let ctx = user(json!({ "roles": roles }));
        assert_eq!(
            graph.resolve_field(field, &null, &arguments, &ctx).await,
            Ok(json!("Staff"))
        );
    }

    let ctx = user(json!({"roles": {"ADMIN": true}}));
    assert_eq!(
        graph.resolve_field(field, &null, &arguments, &ctx).await,
        Err(FieldError::Auth(AuthError::InsufficientRole {
            missing: vec!["ADMIN".to_string(), "EDITOR".to_string()]
        }))
    );
}

#[tokio::test]
async fn empty_role_list_still_requires_a_token() {
    let graph = wrap(schema());

    let response = query(&graph, RootField::new("noRoleRequired"), &user(json!({}))).await;
    assert!(response.errors.is_empty());

    let response = query(&graph, RootField::new("noRoleRequired"), &anonymous()).await;
    assert_eq!(response.errors[0].extension("reason"), Some(&json!("MISSING_CREDENTIAL")));
}

#[tokio::test]
async fn stacked_directives_run_in_order() {
    let graph = wrap(schema());
    let field = graph.field_id("Query", "adminOnly").unwrap();
    let arguments = serde_json::Map::new();
    let null = serde_json::Value::Null;

    assert_eq!(
        graph.resolve_field(field, &null, &arguments, &anonymous()).await,
        Err(FieldError::Auth(AuthError::MissingCredential))
    );
    assert_eq!(
        graph
            .resolve_field(field, &null, &arguments, &user(json!({"roles": ["USER"]})))
            .await,
        Err(FieldError::Auth(AuthError::InsufficientRole {
            missing: vec!["ADMIN".to_string()]
        }))
    );
    assert_eq!(
        graph
            .resolve_field(field, &null, &arguments, &user(json!({"roles": ["ADMIN"]})))
            .await,
        Ok(json!("Admin"))
    );
}

#[tokio::test]
async fn input_equal_to_default_is_not_gated() {
    let graph = wrap(schema());
    let ctx = user(json!({"roles": []}));

    let response = mutation(
        &graph,
        RootField::new("protectedMutation").argument("data", json!({"input": "foo", "visibility": "PRIVATE"})),
        &ctx,
    )
    .await;
    assert!(response.errors.is_empty());

    let response = mutation(
        &graph,
        RootField::new("protectedMutation").argument("data", json!({"input": "foo", "visibility": "PUBLIC"})),
        &ctx,
    )
    .await;
    insta::assert_json_snapshot!(response.errors, @r#"
    [
      {
        "message": "Insufficient roles. Missing one of these: PUBLISHER",
        "path": [
          "protectedMutation"
        ],
        "extensions": {
          "code": "UNAUTHORIZED",
          "missing": [
            "PUBLISHER"
          ],
          "reason": "INSUFFICIENT_ROLE"
        }
      }
    ]
    "#);
}

#[tokio::test]
async fn every_set_input_field_is_checked() {
    let graph = wrap(schema());
    let ctx = user(json!({"roles": ["ADMIN"]}));

    let response = mutation(
        &graph,
        RootField::new("protectedMutation").argument(
            "data",
            json!({"input": "foo", "protectedInput": "bar", "visibility": "PUBLIC"}),
        ),
        &ctx,
    )
    .await;

    assert_eq!(
        response.errors[0].message,
        "Insufficient roles. Missing one of these: PUBLISHER"
    );
}

#[tokio::test]
async fn overridden_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let directives = AuthDirectives::builder(&config())
        .handler_fn(DirectiveKind::HasRole, {
            let calls = calls.clone();
            move |ctx: &RequestContext, roles: &[String]| -> Result<(), AuthError> {
                calls.fetch_add(1, Ordering::Relaxed);
                match ctx.headers.get("x-role").and_then(|value| value.to_str().ok()) {
                    Some(role) if roles.iter().any(|required| required == role) => Ok(()),
                    _ => Err(AuthError::denied(format!("Custom handler refused, expected one of {roles:?}"))),
                }
            }
        })
        .build();
    let graph = directives.wrap(schema()).unwrap();

    let response = query(&graph, RootField::new("protectedQuery"), &user(json!({"roles": ["USER"]}))).await;
    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "protectedQuery": null
      },
      "errors": [
        {
          "message": "Custom handler refused, expected one of [\"USER\"]",
          "path": [
            "protectedQuery"
          ],
          "extensions": {
            "code": "UNAUTHORIZED",
            "reason": "DENIED"
          }
        }
      ]
    }
    "#);

    let mut headers = http::HeaderMap::new();
    headers.insert("x-role", http::HeaderValue::from_static("USER"));
    let response = query(&graph, RootField::new("protectedQuery"), &RequestContext::new(headers)).await;
    assert!(response.errors.is_empty());

    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn overrides_only_replace_their_kind() {
    let directives = AuthDirectives::builder(&config())
        .handler_fn(DirectiveKind::HasPermission, |_, _| Err(AuthError::denied("never")))
        .build();
    let graph = directives.wrap(schema()).unwrap();

    let response = query(&graph, RootField::new("protectedQuery"), &user(json!({"roles": ["USER"]}))).await;

    assert!(response.errors.is_empty());
}
