use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "test-token";
pub const MAX_LIMIT: usize = 200;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub state: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
pub struct ScheduleAnonymization {
    pub entity_id: String,
    pub entity_type: String,
    #[serde(default)]
    pub force_anonymization: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizationRequest {
    pub id: Uuid,
    pub entity_id: String,
    pub entity_type: String,
    pub force_anonymization: bool,
    pub state: String,
}

/// Every successful response is wrapped like the real API does it.
#[derive(Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Default)]
pub struct Db {
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
    pub queues: Vec<Queue>,
    pub endpoints: Vec<Endpoint>,
    pub anonymizations: HashMap<Uuid, AnonymizationRequest>,
    pub conversations: HashMap<u64, Value>,
    pub messages: HashMap<u64, Vec<Value>>,
    pub next_csid: u64,
}

impl Db {
    /// A small fixed catalog of tags, queues and endpoints; users and
    /// conversations start empty.
    pub fn seeded() -> Self {
        Self {
            tags: vec![
                tag("t-vip", "vip"),
                tag("t-billing", "billing"),
            ],
            queues: vec![
                Queue {
                    id: "q-support".to_string(),
                    name: "Support".to_string(),
                    is_default: true,
                },
                Queue {
                    id: "q-sales".to_string(),
                    name: "Sales".to_string(),
                    is_default: false,
                },
            ],
            endpoints: vec![
                endpoint("support@acme.dixa.io", "Support mail", "EmailEndpoint"),
                endpoint("widget-1", "Website chat", "ChatWidget"),
                endpoint("+4570000000", "Hotline", "TelephonyEndpoint"),
            ],
            next_csid: 1000,
            ..Self::default()
        }
    }
}

fn tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
        state: "Active".to_string(),
    }
}

fn endpoint(id: &str, name: &str, kind: &str) -> Endpoint {
    Endpoint {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
    }
}

pub struct AppState {
    pub token: String,
    pub db: RwLock<Db>,
}

type Shared = Arc<AppState>;
type ApiResult<T> = Result<Json<Data<T>>, (StatusCode, Json<Value>)>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Data { data }))
}

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message.into() })))
}

fn bad_json(rejection: JsonRejection) -> (StatusCode, Json<Value>) {
    error(StatusCode::BAD_REQUEST, rejection.body_text())
}

pub fn app(token: impl Into<String>) -> Router {
    let state: Shared = Arc::new(AppState {
        token: token.into(),
        db: RwLock::new(Db::seeded()),
    });
    Router::new()
        .route("/v1/users", get(list_users).post(create_user))
        .route(
            "/v1/users/{id}/requested_conversations",
            get(user_conversations),
        )
        .route("/v1/anonymization_request", post(schedule_anonymization))
        .route("/v1/anonymization_request/{id}", get(get_anonymization))
        .route("/v1/tags", get(list_tags))
        .route("/v1/queues", get(list_queues))
        .route("/v1/queues/{id}", get(get_queue))
        .route("/v1/endpoints", get(list_endpoints))
        .route("/v1/endpoints/{id}", get(get_endpoint))
        .route("/v1/conversations", post(create_conversation))
        .route("/v1/conversations/{csid}", get(get_conversation))
        .route("/v1/conversations/{csid}/messages", get(list_messages))
        .route(
            "/v1/conversations/{csid}/messages/historical",
            post(add_historical_message),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: impl Into<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

/// The integrations API takes the raw token in `Authorization`, no scheme.
async fn require_token(State(state): State<Shared>, request: Request, next: Next) -> Response {
    tracing::debug!(method = %request.method(), uri = %request.uri(), "request");
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.token);
    if !authorized {
        tracing::warn!(uri = %request.uri(), "rejected request with bad token");
        return error(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

// --- users ---

async fn list_users(State(state): State<Shared>) -> ApiResult<Vec<User>> {
    ok(state.db.read().await.users.clone())
}

async fn create_user(
    State(state): State<Shared>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<User>>), (StatusCode, Json<Value>)> {
    let Json(input) = payload.map_err(bad_json)?;
    if input.name.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "name must not be empty"));
    }
    let user = User {
        id: Uuid::new_v4(),
        display_name: input.name,
        email: input.email,
        phone_number: input.phone_number,
    };
    state.db.write().await.users.push(user.clone());
    Ok((StatusCode::CREATED, Json(Data { data: user })))
}

#[derive(Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

async fn user_conversations(
    State(state): State<Shared>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<Value>> {
    let limit = params.limit.unwrap_or(MAX_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("limit must be between 1 and {MAX_LIMIT}"),
        ));
    }
    let db = state.db.read().await;
    let mut found: Vec<&Value> = db
        .conversations
        .values()
        .filter(|c| c["requesterId"] == user_id.as_str())
        .collect();
    found.sort_by_key(|c| c["id"].as_u64());
    ok(found.into_iter().take(limit).cloned().collect())
}

// --- anonymization ---

async fn schedule_anonymization(
    State(state): State<Shared>,
    payload: Result<Json<ScheduleAnonymization>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<AnonymizationRequest>>), (StatusCode, Json<Value>)> {
    let Json(input) = payload.map_err(bad_json)?;
    if !input.force_anonymization {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "force_anonymization must be true",
        ));
    }
    if !matches!(input.entity_type.as_str(), "User" | "Conversation") {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("unknown entity_type {}", input.entity_type),
        ));
    }
    let request = AnonymizationRequest {
        id: Uuid::new_v4(),
        entity_id: input.entity_id,
        entity_type: input.entity_type,
        force_anonymization: true,
        state: "Scheduled".to_string(),
    };
    state
        .db
        .write()
        .await
        .anonymizations
        .insert(request.id, request.clone());
    Ok((StatusCode::ACCEPTED, Json(Data { data: request })))
}

async fn get_anonymization(
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> ApiResult<AnonymizationRequest> {
    let db = state.db.read().await;
    id.parse::<Uuid>()
        .ok()
        .and_then(|id| db.anonymizations.get(&id).cloned())
        .map(|request| Json(Data { data: request }))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Anonymization request {id} not found")))
}

// --- tags, queues, endpoints ---

async fn list_tags(State(state): State<Shared>) -> ApiResult<Vec<Tag>> {
    ok(state.db.read().await.tags.clone())
}

async fn list_queues(State(state): State<Shared>) -> ApiResult<Vec<Queue>> {
    ok(state.db.read().await.queues.clone())
}

async fn get_queue(State(state): State<Shared>, Path(id): Path<String>) -> ApiResult<Queue> {
    let db = state.db.read().await;
    db.queues
        .iter()
        .find(|q| q.id == id)
        .cloned()
        .map(|queue| Json(Data { data: queue }))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Queue {id} not found")))
}

#[derive(Deserialize)]
struct EndpointParams {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn list_endpoints(
    State(state): State<Shared>,
    Query(params): Query<EndpointParams>,
) -> ApiResult<Vec<Endpoint>> {
    let db = state.db.read().await;
    let endpoints: Vec<Endpoint> = db
        .endpoints
        .iter()
        .filter(|e| params.kind.as_deref().is_none_or(|kind| e.kind == kind))
        .cloned()
        .collect();
    ok(endpoints)
}

async fn get_endpoint(State(state): State<Shared>, Path(id): Path<String>) -> ApiResult<Endpoint> {
    let db = state.db.read().await;
    db.endpoints
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .map(|endpoint| Json(Data { data: endpoint }))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Endpoint {id} not found")))
}

// --- conversations ---

async fn create_conversation(
    State(state): State<Shared>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Value>>), (StatusCode, Json<Value>)> {
    let Json(input) = payload.map_err(bad_json)?;
    let Value::Object(mut conversation) = input else {
        return Err(error(StatusCode::BAD_REQUEST, "conversation must be an object"));
    };
    if !conversation.get("requesterId").is_some_and(Value::is_string) {
        return Err(error(StatusCode::BAD_REQUEST, "requesterId is required"));
    }

    let mut db = state.db.write().await;
    let csid = db.next_csid;
    db.next_csid += 1;
    let first_message = conversation.remove("message");
    conversation.insert("id".to_string(), json!(csid));

    db.conversations.insert(csid, Value::Object(conversation));
    db.messages
        .insert(csid, first_message.into_iter().collect());
    Ok((StatusCode::CREATED, Json(Data { data: json!({ "id": csid }) })))
}

async fn get_conversation(State(state): State<Shared>, Path(csid): Path<u64>) -> ApiResult<Value> {
    let db = state.db.read().await;
    db.conversations
        .get(&csid)
        .cloned()
        .map(|conversation| Json(Data { data: conversation }))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Conversation {csid} not found")))
}

async fn list_messages(State(state): State<Shared>, Path(csid): Path<u64>) -> ApiResult<Vec<Value>> {
    let db = state.db.read().await;
    db.messages
        .get(&csid)
        .cloned()
        .map(|messages| Json(Data { data: messages }))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Conversation {csid} not found")))
}

async fn add_historical_message(
    State(state): State<Shared>,
    Path(csid): Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Value>>), (StatusCode, Json<Value>)> {
    let Json(message) = payload.map_err(bad_json)?;
    let mut db = state.db.write().await;
    let messages = db
        .messages
        .get_mut(&csid)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Conversation {csid} not found")))?;
    let id = Uuid::new_v4();
    let mut stored = message;
    if let Value::Object(fields) = &mut stored {
        fields.insert("id".to_string(), json!(id));
    }
    messages.push(stored);
    Ok((StatusCode::CREATED, Json(Data { data: json!({ "id": id }) })))
}
