use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, AnonymizationRequest, Data, Endpoint, Queue, Tag, User};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, TOKEN)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, TOKEN)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_token_returns_401_with_message() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/v1/users").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn bearer_prefixed_token_is_rejected() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .uri("/v1/tags")
                .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- users ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app(TOKEN).oneshot(get("/v1/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Data<Vec<User>> = body_json(resp).await;
    assert!(users.data.is_empty());
}

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/v1/users",
            r#"{"name":"Ada","email":"ada@example.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Data<User> = body_json(resp).await;
    assert_eq!(user.data.display_name, "Ada");
    assert_eq!(user.data.email.as_deref(), Some("ada@example.com"));
    assert!(user.data.phone_number.is_none());
}

#[tokio::test]
async fn create_user_without_name_returns_400_json() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/v1/users", r#"{"email":"a@b.c"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn requested_conversations_limit_out_of_range_returns_400() {
    let resp = app(TOKEN)
        .oneshot(get("/v1/users/u1/requested_conversations?limit=500"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- anonymization ---

#[tokio::test]
async fn schedule_anonymization_requires_force() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/v1/anonymization_request",
            r#"{"entity_id":"e1","entity_type":"User"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "force_anonymization must be true");
}

#[tokio::test]
async fn schedule_anonymization_returns_202() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/v1/anonymization_request",
            r#"{"entity_id":"e1","entity_type":"Conversation","force_anonymization":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let request: Data<AnonymizationRequest> = body_json(resp).await;
    assert_eq!(request.data.entity_id, "e1");
    assert_eq!(request.data.state, "Scheduled");
}

#[tokio::test]
async fn get_anonymization_unknown_returns_404() {
    let resp = app(TOKEN)
        .oneshot(get("/v1/anonymization_request/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- catalog ---

#[tokio::test]
async fn list_tags_and_queues_are_seeded() {
    let resp = app(TOKEN).oneshot(get("/v1/tags")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let tags: Data<Vec<Tag>> = body_json(resp).await;
    assert_eq!(tags.data.len(), 2);

    let resp = app(TOKEN).oneshot(get("/v1/queues")).await.unwrap();
    let queues: Data<Vec<Queue>> = body_json(resp).await;
    assert!(queues.data.iter().any(|q| q.is_default));
}

#[tokio::test]
async fn get_queue_not_found() {
    let resp = app(TOKEN).oneshot(get("/v1/queues/missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Queue missing not found");
}

#[tokio::test]
async fn list_endpoints_filters_by_type() {
    let resp = app(TOKEN)
        .oneshot(get("/v1/endpoints?type=ChatWidget"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let endpoints: Data<Vec<Endpoint>> = body_json(resp).await;
    assert_eq!(endpoints.data.len(), 1);
    assert_eq!(endpoints.data[0].id, "widget-1");
}

#[tokio::test]
async fn list_endpoints_without_type_returns_all() {
    let resp = app(TOKEN).oneshot(get("/v1/endpoints")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let endpoints: Data<Vec<Endpoint>> = body_json(resp).await;
    assert_eq!(endpoints.data.len(), 3);
}

#[tokio::test]
async fn get_endpoint_with_encoded_id() {
    let resp = app(TOKEN)
        .oneshot(get("/v1/endpoints/support%40acme.dixa.io"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let endpoint: Data<Endpoint> = body_json(resp).await;
    assert_eq!(endpoint.data.kind, "EmailEndpoint");
}

// --- conversations ---

#[tokio::test]
async fn create_conversation_requires_requester() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/v1/conversations", r#"{"subject":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_conversation_malformed_json_returns_400() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/v1/conversations", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn get_conversation_bad_csid_returns_400() {
    let resp = app(TOKEN)
        .oneshot(get("/v1/conversations/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn historical_message_for_unknown_conversation_returns_404() {
    let resp = app(TOKEN)
        .oneshot(json_request(
            "POST",
            "/v1/conversations/42/messages/historical",
            r#"{"content":"hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversation_lifecycle() {
    let app = app(TOKEN);

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/conversations",
            r#"{"requesterId":"u1","subject":"Order","message":{"content":"first"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Data<Value> = body_json(resp).await;
    let csid = created.data["id"].as_u64().unwrap();

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/conversations/{csid}/messages/historical"),
            r#"{"content":"second"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(get(&format!("/v1/conversations/{csid}/messages")))
        .await
        .unwrap();
    let messages: Data<Vec<Value>> = body_json(resp).await;
    assert_eq!(messages.data.len(), 2);
    assert_eq!(messages.data[0]["content"], "first");
    assert_eq!(messages.data[1]["content"], "second");

    let resp = app
        .oneshot(get("/v1/users/u1/requested_conversations?limit=10"))
        .await
        .unwrap();
    let conversations: Data<Vec<Value>> = body_json(resp).await;
    assert_eq!(conversations.data.len(), 1);
    assert_eq!(conversations.data[0]["subject"], "Order");
}
