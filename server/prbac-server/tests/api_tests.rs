//! Router tests for the RBAC v1 surface, backed by the in-memory
//! relationship client.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use prbac_server::{create_app, PrbacServer, ServerConfig};
use prbac_zanzibar::{
    InMemoryRelationshipClient, ObjectReference, PermissionCatalog, Relationship, SubjectReference, SystemRoleTable,
};

const CATALOG: &str = r#"{
    "playbook-dispatcher": {
        "run:read": {
            "permission": "dispatcher_view_runs",
            "filter": {"name": "service", "operator": "equals", "resourceType": "dispatcher/service", "verb": "view"}
        }
    }
}"#;

/// Test configuration wrapping the app and its backing store
struct TestConfig {
    client: Arc<InMemoryRelationshipClient>,
    app: Router,
}

impl TestConfig {
    fn new() -> Self {
        let client = Arc::new(InMemoryRelationshipClient::new());
        let server = PrbacServer::with_client(
            client.clone(),
            PermissionCatalog::from_json_str(CATALOG).unwrap(),
            SystemRoleTable::default(),
            ServerConfig::default(),
        );

        Self {
            client,
            app: create_app(server),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let config = TestConfig::new();

    let (status, body) = config.send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalog_permissions"], 1);
}

#[tokio::test]
async fn test_access_with_root_grant() {
    let config = TestConfig::new();
    config.client.touch(Relationship::new(
        ObjectReference::new("workspace", "aspian_root"),
        "dispatcher_view_runs",
        SubjectReference::user("jdoe"),
    ));

    let (status, body) = config
        .send(get("/api/rbac/v1/access/?application=playbook-dispatcher&username=jdoe"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([{"permission": "playbook-dispatcher:run:read"}]));
    assert_eq!(body["metadata"]["total_count"], 1);
}

#[tokio::test]
async fn test_access_uses_org_header() {
    let config = TestConfig::new();
    config.client.touch(Relationship::new(
        ObjectReference::new("dispatcher/service", "svcA"),
        "view",
        SubjectReference::user("jdoe"),
    ));
    config.client.touch(Relationship::new(
        ObjectReference::new("workspace", "aspian_root"),
        "dispatcher_view_runs",
        SubjectReference::user("jdoe"),
    ));

    let request = Request::builder()
        .uri("/api/rbac/v1/access/?application=playbook-dispatcher&username=jdoe")
        .header("x-prbac-org", "acme")
        .body(Body::empty())
        .unwrap();
    let (status, body) = config.send(request).await;

    // The root grant lives in another org, so only the scoped grant counts
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"][0]["resourceDefinitions"],
        json!([{"attributeFilter": {"key": "service", "operation": "equals", "value": "svcA"}}])
    );
}

#[tokio::test]
async fn test_access_requires_username() {
    let config = TestConfig::new();

    let (status, body) = config
        .send(get("/api/rbac/v1/access/?application=playbook-dispatcher"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["error_code"], "VALIDATION_1002");
}

#[tokio::test]
async fn test_access_requires_application() {
    let config = TestConfig::new();

    let (status, _) = config.send(get("/api/rbac/v1/access/?username=jdoe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = config.send(get("/api/rbac/v1/access/?application=%20&username=jdoe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1002");
}

#[tokio::test]
async fn test_create_role_then_read_access() {
    let config = TestConfig::new();

    let (status, body) = config
        .send(post_json(
            "/api/rbac/v1/roles/",
            json!({"name": "viewers", "access": [{"permission": "dispatcher_view_runs"}]}),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let uuid = body["data"]["uuid"].as_str().unwrap().to_string();
    assert!(Uuid::parse_str(&uuid).is_ok());
    assert_eq!(config.client.len(), 5);

    let (status, body) = config
        .send(get(&format!("/api/rbac/v1/roles/{}/access/", uuid)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{"permission": "playbook-dispatcher:run:read"}]));
}

#[tokio::test]
async fn test_create_role_rejects_blank_name() {
    let config = TestConfig::new();

    let (status, body) = config
        .send(post_json("/api/rbac/v1/roles/", json!({"name": " ", "access": []})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1002");
    assert!(config.client.is_empty());
}

#[tokio::test]
async fn test_create_role_rejects_malformed_body() {
    let config = TestConfig::new();

    let (status, body) = config
        .send(post_json("/api/rbac/v1/roles/", json!({"access": []})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_role_access_rejects_bad_uuid() {
    let config = TestConfig::new();

    let (status, body) = config.send(get("/api/rbac/v1/roles/not-a-uuid/access/")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1003");
}

#[tokio::test]
async fn test_group_principals_add_and_remove() {
    let config = TestConfig::new();
    let group = Uuid::new_v4();

    let (status, body) = config
        .send(post_json(
            &format!("/api/rbac/v1/groups/{}/principals/", group),
            json!({"principals": [{"username": "alice"}, {"username": "bob"}]}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["principals"], json!(["alice", "bob"]));
    assert_eq!(config.client.len(), 2);

    let request = Request::builder()
        .uri(format!("/api/rbac/v1/groups/{}/principals/?usernames=alice,", group))
        .method("DELETE")
        .body(Body::empty())
        .unwrap();
    let (status, _) = config.send(request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(config.client.contains(&Relationship::new(
        ObjectReference::new("group", &group.to_string()),
        "member",
        SubjectReference::user("bob"),
    )));
    assert_eq!(config.client.len(), 1);
}

#[tokio::test]
async fn test_remove_principals_requires_usernames() {
    let config = TestConfig::new();

    let request = Request::builder()
        .uri(format!("/api/rbac/v1/groups/{}/principals/?usernames=,", Uuid::new_v4()))
        .method("DELETE")
        .body(Body::empty())
        .unwrap();
    let (status, body) = config.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1002");
}

#[tokio::test]
async fn test_add_roles_to_group() {
    let config = TestConfig::new();
    let group = Uuid::new_v4();

    let (_, body) = config
        .send(post_json("/api/rbac/v1/roles/", json!({"name": "r", "access": []})))
        .await;
    let role = body["data"]["uuid"].as_str().unwrap().to_string();

    let (status, body) = config
        .send(post_json(
            &format!("/api/rbac/v1/groups/{}/roles/", group),
            json!({"roles": [role.clone()]}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!([role.clone()]));
    assert!(config.client.contains(&Relationship::new(
        ObjectReference::new("role_binding", &role),
        "subject",
        SubjectReference::userset("group", &group.to_string(), "member"),
    )));
}

#[tokio::test]
async fn test_add_roles_rejects_bad_role_id() {
    let config = TestConfig::new();

    let (status, body) = config
        .send(post_json(
            &format!("/api/rbac/v1/groups/{}/roles/", Uuid::new_v4()),
            json!({"roles": ["nope"]}),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_1003");
    assert!(config.client.is_empty());
}

#[tokio::test]
async fn test_placeholders_answer_not_implemented() {
    let config = TestConfig::new();
    let id = Uuid::new_v4();

    let requests = vec![
        ("GET", "/api/rbac/v1/policies/".to_string(), "list_policies"),
        ("GET", "/api/rbac/v1/roles/".to_string(), "list_roles"),
        ("DELETE", format!("/api/rbac/v1/roles/{}/", id), "delete_role"),
        ("GET", format!("/api/rbac/v1/groups/{}/roles/", id), "list_roles_for_group"),
        ("GET", "/api/rbac/v1/status/".to_string(), "get_status"),
        ("POST", "/api/rbac/v1/cross-account-requests/".to_string(), "create_cross_account_request"),
    ];

    for (method, uri, operation) in requests {
        let request = Request::builder().uri(&uri).method(method).body(Body::empty()).unwrap();
        let (status, body) = config.send(request).await;

        assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{} {}", method, uri);
        assert_eq!(body["error_code"], "SERVER_5001");
        assert!(body["message"].as_str().unwrap().contains(operation));
    }
}
