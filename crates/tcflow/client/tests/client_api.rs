//! REST resource client against a mock Trimble Connect server

mod common;

use chrono::{DateTime, Duration, Utc};
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tcflow_client::{
    ClientConfig, ClientError, TrimbleConnectClient, WorkspaceBridge, WorkspaceConnection,
};
use tcflow_types::*;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse_ts(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().expect("timestamp string"))
        .expect("rfc3339 timestamp")
        .with_timezone(&Utc)
}

#[tokio::test]
async fn test_get_folders_returns_parsed_body_with_auth_headers() {
    let server = MockServer::start().await;
    let body = json!([
        { "id": "f1", "name": "Docs", "parentId": null },
        { "id": "f2", "name": "Drawings", "parentId": "f1", "versionId": "v3" }
    ]);

    Mock::given(method("GET"))
        .and(path(project_path("/folders")))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let folders = client_for(&server).get_folders().await.unwrap();

    assert_eq!(folders.len(), 2);
    assert_eq!(folders[1].parent(), Some(&FolderId::new("f1")));
    assert!(folders[0].is_top_level());
    assert_eq!(serde_json::to_value(&folders).unwrap(), body);
}

#[tokio::test]
async fn test_every_operation_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let folder = FolderId::new("f1");
    let topic = TopicId::new("t1");

    let results: Vec<(&str, ClientError)> = vec![
        ("get_folders", client.get_folders().await.unwrap_err()),
        ("get_folder", client.get_folder(&folder).await.unwrap_err()),
        ("get_folder_files", client.get_folder_files(&folder).await.unwrap_err()),
        ("create_folder", client.create_folder(None, "X").await.unwrap_err()),
        ("move_folder", client.move_folder(&folder, &FolderId::new("f2")).await.unwrap_err()),
        (
            "create_bcf_topic",
            client.create_bcf_topic(TopicDraft::new("T", "u1")).await.unwrap_err(),
        ),
        (
            "update_bcf_topic",
            client.update_bcf_topic(&topic, &TopicUpdate::default()).await.unwrap_err(),
        ),
        ("add_bcf_comment", client.add_bcf_comment(&topic, "hi").await.unwrap_err()),
        ("update_bcf_topic", client.resolve_bcf_topic(&topic).await.unwrap_err()),
        ("get_project_users", client.get_project_users().await.unwrap_err()),
        ("get_project_metadata", client.get_project_metadata().await.unwrap_err()),
        ("get_organizers", client.get_organizers(&folder).await.unwrap_err()),
    ];

    for (operation, err) in results {
        assert_eq!(err.status(), Some(403), "{operation}");
        assert_eq!(err.operation(), Some(operation));
        match err {
            ClientError::Status { body, .. } => assert_eq!(body, "forbidden"),
            other => panic!("{operation}: unexpected error {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_get_folder_and_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(project_path("/folders/f1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "f1", "name": "Docs" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(project_path("/folders/f1/files")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 11, "name": "A-101.pdf", "size": 2048 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let folder = client.get_folder(&FolderId::new("f1")).await.unwrap();
    assert_eq!(folder.name(), "Docs");
    assert!(folder.is_top_level());

    let files = client.get_folder_files(&folder.id).await.unwrap();
    assert_eq!(files[0].id, FileId::new("11"));
    assert_eq!(files[0].extra.get("size"), Some(&json!(2048)));
}

#[tokio::test]
async fn test_create_and_move_folder_payloads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(project_path("/folders")))
        .and(body_json(json!({ "name": "Archive", "parentId": null })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "f9", "name": "Archive" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(project_path("/folders")))
        .and(body_json(json!({ "name": "Sub", "parentId": "f9" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "f10", "name": "Sub", "parentId": "f9" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(project_path("/folders/f1")))
        .and(body_json(json!({ "parentId": "f9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "f1", "name": "Docs", "parentId": "f9" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let archive = client.create_folder(None, "Archive").await.unwrap();
    let sub = client.create_folder(Some(&archive.id), "Sub").await.unwrap();
    assert_eq!(sub.parent(), Some(&archive.id));

    let moved = client.move_folder(&FolderId::new("f1"), &archive.id).await.unwrap();
    assert_eq!(moved.parent(), Some(&FolderId::new("f9")));
}

#[tokio::test]
async fn test_create_topic_with_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(project_path("/topics")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "t1",
            "title": "T",
            "assignedTo": "user42",
            "status": "New",
            "priority": "high",
            "type": "Issue"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let topic = client_for(&server)
        .create_bcf_topic(TopicDraft::new("T", "user42"))
        .await
        .unwrap();
    let after = Utc::now();

    assert_eq!(topic.id, TopicId::new("t1"));
    assert_eq!(topic.status, Some(TopicStatus::New));

    let requests = recorded(&server).await;
    let body = &requests[0].2;
    assert_eq!(body["title"], "T");
    assert_eq!(body["assignedTo"], "user42");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["status"], "New");
    assert_eq!(body["type"], "Issue");
    assert_eq!(body["description"], "");

    let due = parse_ts(&body["dueDate"]);
    let tolerance = Duration::seconds(1);
    assert!(due >= before + Duration::days(7) - tolerance);
    assert!(due <= after + Duration::days(7) + tolerance);
}

#[tokio::test]
async fn test_create_topic_with_priority_and_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(project_path("/topics")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "t2" })))
        .mount(&server)
        .await;

    client_for(&server)
        .create_bcf_topic(
            TopicDraft::new("Review", "u7")
                .with_priority(TopicPriority::Low)
                .with_description("Please review"),
        )
        .await
        .unwrap();

    let body = &recorded(&server).await[0].2;
    assert_eq!(body["priority"], "low");
    assert_eq!(body["description"], "Please review");
}

#[tokio::test]
async fn test_resolve_topic_sends_status_and_timestamp_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(project_path("/topics/t1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "status": "Closed",
            "resolvedAt": "2026-10-17T08:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let topic = client_for(&server)
        .resolve_bcf_topic_as(&TopicId::new("t1"), "Closed")
        .await
        .unwrap();
    assert!(topic.is_resolved());

    let requests = recorded(&server).await;
    let (verb, _, body) = &requests[0];
    assert_eq!(verb, "PATCH");

    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["status"], "Closed");
    let resolved_at = parse_ts(&fields["resolvedAt"]);
    assert!(resolved_at >= before - Duration::seconds(1));
    assert!(resolved_at <= Utc::now() + Duration::seconds(1));
}

#[tokio::test]
async fn test_resolve_topic_defaults_to_resolved() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(project_path("/topics/t1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "t1", "status": "Resolved" })))
        .mount(&server)
        .await;

    client_for(&server)
        .resolve_bcf_topic(&TopicId::new("t1"))
        .await
        .unwrap();

    assert_eq!(recorded(&server).await[0].2["status"], "Resolved");
}

#[tokio::test]
async fn test_update_topic_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(project_path("/topics/t1")))
        .and(body_json(json!({ "assignedTo": "u9", "priority": "critical" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "t1", "assignedTo": "u9" })))
        .expect(1)
        .mount(&server)
        .await;

    let update = TopicUpdate {
        assigned_to: Some(UserId::new("u9")),
        priority: Some(TopicPriority::Critical),
        ..TopicUpdate::default()
    };
    let topic = client_for(&server)
        .update_bcf_topic(&TopicId::new("t1"), &update)
        .await
        .unwrap();
    assert_eq!(topic.assigned_to, Some(UserId::new("u9")));
}

#[tokio::test]
async fn test_add_comment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(project_path("/topics/t1/comments")))
        .and(body_json(json!({ "text": "Schváleno bez připomínek" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "c1",
            "text": "Schváleno bez připomínek",
            "createdBy": "u1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let comment = client_for(&server)
        .add_bcf_comment(&TopicId::new("t1"), "Schváleno bez připomínek")
        .await
        .unwrap();
    assert_eq!(comment.id, Some(CommentId::new("c1")));
    assert_eq!(comment.extra.get("createdBy"), Some(&json!("u1")));
}

#[tokio::test]
async fn test_project_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(project_path("/members")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u1", "firstName": "Jana", "lastName": "Nováková", "role": "ADMIN" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(project_path("")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p1", "name": "Most přes Vltavu", "rootId": "root" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(project_path("/organizers")))
        .and(query_param("folderId", "f1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "name": "Podlaží 1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let members = client.get_project_users().await.unwrap();
    assert_eq!(members[0].display_name(), "Jana Nováková");
    assert_eq!(members[0].role.as_deref(), Some("ADMIN"));

    let project = client.get_project_metadata().await.unwrap();
    assert_eq!(project.id, ProjectId::new("p1"));
    assert_eq!(project.root_id, Some(FolderId::new("root")));

    let organizers = client.get_organizers(&FolderId::new("f1")).await.unwrap();
    assert_eq!(organizers[0].id, OrganizerId::new("5"));
}

fn as_value<T: serde::Serialize>(result: Result<T, ClientError>) -> Result<Value, ClientError> {
    result.map(|v| serde_json::to_value(v).expect("serializable response"))
}

/// Run one resource operation by name and return its result as JSON
async fn call(client: &TrimbleConnectClient, operation: &str) -> Result<Value, ClientError> {
    let folder = FolderId::from(1u64);
    let topic = TopicId::from(7u64);
    match operation {
        "get_folders" => as_value(client.get_folders().await),
        "get_folder" => as_value(client.get_folder(&folder).await),
        "get_folder_files" => as_value(client.get_folder_files(&folder).await),
        "create_folder" => as_value(client.create_folder(None, "Schválené").await),
        "move_folder" => as_value(client.move_folder(&folder, &FolderId::from(9u64)).await),
        "create_bcf_topic" => as_value(client.create_bcf_topic(TopicDraft::new("T", "u1")).await),
        "update_bcf_topic" => {
            as_value(client.update_bcf_topic(&topic, &TopicUpdate::default()).await)
        }
        "resolve_bcf_topic" => as_value(client.resolve_bcf_topic(&topic).await),
        "add_bcf_comment" => as_value(client.add_bcf_comment(&topic, "ok").await),
        "get_project_users" => as_value(client.get_project_users().await),
        "get_project_metadata" => as_value(client.get_project_metadata().await),
        "get_organizers" => as_value(client.get_organizers(&folder).await),
        other => panic!("unknown operation {other}"),
    }
}

#[tokio::test]
async fn test_success_bodies_pass_through_unchanged() {
    let topic_body = json!({
        "id": 7,
        "priority": "High",
        "status": "New",
        "assignedTo": 42,
        "dueDate": "2026-10-24",
        "labels": ["bcf"]
    });
    let cases = vec![
        (
            "get_folders",
            "GET",
            "/folders",
            json!([{ "id": "root" }, { "id": 2, "name": "Schválené", "parentId": null }]),
        ),
        ("get_folder", "GET", "/folders/1", json!({ "id": 1, "parentId": 2 })),
        (
            "get_folder_files",
            "GET",
            "/folders/1/files",
            json!([{ "id": 11 }, { "id": "a-2", "name": "A-102.pdf", "size": 10 }]),
        ),
        ("create_folder", "POST", "/folders", json!({ "id": 9, "parentId": null })),
        ("move_folder", "PATCH", "/folders/1", json!({ "id": 1, "parentId": 9 })),
        ("create_bcf_topic", "POST", "/topics", topic_body.clone()),
        ("update_bcf_topic", "PATCH", "/topics/7", topic_body.clone()),
        (
            "resolve_bcf_topic",
            "PATCH",
            "/topics/7",
            json!({ "id": 7, "status": "Resolved", "resolvedAt": "2026-10-17" }),
        ),
        (
            "add_bcf_comment",
            "POST",
            "/topics/7/comments",
            json!({ "id": 70, "createdAt": "2026-10-17" }),
        ),
        (
            "get_project_users",
            "GET",
            "/members",
            json!([{ "id": 42 }, { "id": "u2", "email": "x@example.com" }]),
        ),
        ("get_project_metadata", "GET", "", json!({ "id": "p1", "rootId": 40 })),
        ("get_organizers", "GET", "/organizers", json!([{ "id": 5 }])),
    ];

    for (operation, verb, suffix, body) in cases {
        let server = MockServer::start().await;
        Mock::given(method(verb))
            .and(path(project_path(suffix)))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value = call(&client, operation)
            .await
            .unwrap_or_else(|e| panic!("{operation}: {e}"));
        assert_eq!(value, body, "{operation}");
    }
}

#[tokio::test]
async fn test_resolve_accepts_date_only_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(project_path("/topics/t1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "status": "Resolved",
            "resolvedAt": "2026-10-17",
            "dueDate": "2026-10-24"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let topic = client_for(&server)
        .resolve_bcf_topic(&TopicId::new("t1"))
        .await
        .unwrap();
    assert!(topic.is_resolved());
    assert_eq!(topic.resolved_at.as_deref(), Some("2026-10-17"));
    assert!(topic.due().is_some());
}

#[tokio::test]
async fn test_ids_are_encoded_as_single_path_segments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(project_path("/folders/a%2Fb%3Fc%23d")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "a/b?c#d" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(project_path("/topics/..%2Fmembers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "../members" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let folder = client.get_folder(&FolderId::new("a/b?c#d")).await.unwrap();
    assert_eq!(folder.id.as_str(), "a/b?c#d");

    client
        .update_bcf_topic(&TopicId::new("../members"), &TopicUpdate::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(project_path("/folders")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_folders().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { operation: "get_folders", .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    init_tracing();
    let client =
        TrimbleConnectClient::from_session(ClientConfig::with_base_url("http://127.0.0.1:9/tc/api/3.0"), TOKEN, PROJECT)
            .unwrap();

    let err = client.get_folders().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { operation: "get_folders", .. }));
}

struct NeverConnected;

#[async_trait::async_trait]
impl WorkspaceBridge for NeverConnected {
    async fn connect(
        &self,
        _events: tcflow_client::EventSender,
        _timeout: std::time::Duration,
    ) -> tcflow_client::ClientResult<Box<dyn WorkspaceConnection>> {
        Err(ClientError::Bridge("not embedded in a workspace".into()))
    }
}

#[tokio::test]
async fn test_calls_before_initialize_issue_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    init_tracing();
    let mut client =
        TrimbleConnectClient::new(ClientConfig::with_base_url(base_url(&server)), Arc::new(NeverConnected))
            .unwrap();

    assert!(matches!(client.get_folders().await, Err(ClientError::NotInitialized)));

    assert!(matches!(client.initialize().await, Err(ClientError::Bridge(_))));
    assert!(!client.is_initialized().await);
    assert!(matches!(
        client.create_folder(None, "X").await,
        Err(ClientError::NotInitialized)
    ));
}
