//! Request builders, response handling and the executing client for the
//! Dixa integrations API.
//!
//! # Design
//! Every operation is split in two. A `build_*` method turns the arguments
//! into an `HttpRequest` without touching the network, and the operation
//! method of the same name sends that request through the configured
//! `Transport` and passes the response to `parse_response`. Successful
//! bodies come back as `serde_json::Value` exactly as the server sent them;
//! failures go through `error::classify`.

use serde::Serialize;
use serde_json::Value;
use urlencoding::encode;

use crate::config::ClientConfig;
use crate::error::{classify, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::transport::UreqTransport;
use crate::types::{AnonymizationBody, CreateUser, ScheduleAnonymization};

/// Blocking client for the Dixa integrations API.
///
/// Holds only immutable configuration and a transport, so a single client
/// can be shared across threads and called concurrently.
#[derive(Debug, Clone)]
pub struct DixaClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl DixaClient<UreqTransport> {
    /// Client for the public integrations endpoint using `token` verbatim
    /// as the `Authorization` header.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(token))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self { config, transport }
    }
}

impl<T> DixaClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url()),
            headers: vec![
                ("Authorization".to_string(), self.config.token().to_string()),
                ("Content-Type".to_string(), self.config.content_type().to_string()),
            ],
            body,
        }
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, path, Some(body)))
    }

    // --- users ---

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/v1/users", None)
    }

    pub fn build_create_user(&self, input: &CreateUser) -> Result<HttpRequest, ApiError> {
        self.post_json("/v1/users", input)
    }

    /// `limit` caps the page size; the server enforces an upper bound of 200.
    pub fn build_get_user_conversations(&self, user_id: &str, limit: u32) -> HttpRequest {
        let path = format!("/v1/users/{}/requested_conversations?limit={limit}", encode(user_id));
        self.request(HttpMethod::Get, &path, None)
    }

    // --- anonymization ---

    pub fn build_schedule_anonymization(
        &self,
        input: &ScheduleAnonymization,
    ) -> Result<HttpRequest, ApiError> {
        self.post_json("/v1/anonymization_request", &AnonymizationBody::from(input))
    }

    pub fn build_get_anonymization_request(&self, request_id: &str) -> HttpRequest {
        let path = format!("/v1/anonymization_request/{}", encode(request_id));
        self.request(HttpMethod::Get, &path, None)
    }

    // --- tags, queues, endpoints ---

    pub fn build_list_tags(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/v1/tags", None)
    }

    pub fn build_list_queues(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/v1/queues", None)
    }

    pub fn build_get_queue(&self, id: &str) -> HttpRequest {
        let path = format!("/v1/queues/{}", encode(id));
        self.request(HttpMethod::Get, &path, None)
    }

    pub fn build_list_endpoints_by_type(&self, endpoint_type: &str) -> HttpRequest {
        let path = format!("/v1/endpoints?type={}", encode(endpoint_type));
        self.request(HttpMethod::Get, &path, None)
    }

    pub fn build_get_endpoint(&self, id: &str) -> HttpRequest {
        let path = format!("/v1/endpoints/{}", encode(id));
        self.request(HttpMethod::Get, &path, None)
    }

    // --- conversations ---

    /// The conversation object is forwarded verbatim as the request body.
    pub fn build_create_conversation<B: Serialize + ?Sized>(
        &self,
        conversation: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.post_json("/v1/conversations", conversation)
    }

    pub fn build_get_conversation(&self, csid: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/v1/conversations/{csid}"), None)
    }

    pub fn build_list_conversation_messages(&self, csid: u64) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/v1/conversations/{csid}/messages"),
            None,
        )
    }

    /// The message object is forwarded verbatim as the request body.
    pub fn build_add_historical_message<B: Serialize + ?Sized>(
        &self,
        csid: u64,
        message: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.post_json(&format!("/v1/conversations/{csid}/messages/historical"), message)
    }

    /// Return the decoded body of a 2xx response, or the classified error
    /// for anything else. An empty 2xx body decodes to `Value::Null`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(classify(&response));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

impl<T: Transport> DixaClient<T> {
    /// Send one request and interpret the response. The single dispatch
    /// point every operation goes through.
    pub fn execute(&self, request: HttpRequest) -> Result<Value, ApiError> {
        let response = self.transport.send(request)?;
        self.parse_response(response)
    }

    pub fn list_users(&self) -> Result<Value, ApiError> {
        self.execute(self.build_list_users())
    }

    pub fn create_user(&self, input: &CreateUser) -> Result<Value, ApiError> {
        self.execute(self.build_create_user(input)?)
    }

    pub fn get_user_conversations(&self, user_id: &str, limit: u32) -> Result<Value, ApiError> {
        self.execute(self.build_get_user_conversations(user_id, limit))
    }

    pub fn schedule_anonymization(&self, input: &ScheduleAnonymization) -> Result<Value, ApiError> {
        self.execute(self.build_schedule_anonymization(input)?)
    }

    pub fn get_anonymization_request(&self, request_id: &str) -> Result<Value, ApiError> {
        self.execute(self.build_get_anonymization_request(request_id))
    }

    pub fn list_tags(&self) -> Result<Value, ApiError> {
        self.execute(self.build_list_tags())
    }

    pub fn list_queues(&self) -> Result<Value, ApiError> {
        self.execute(self.build_list_queues())
    }

    pub fn get_queue(&self, id: &str) -> Result<Value, ApiError> {
        self.execute(self.build_get_queue(id))
    }

    pub fn list_endpoints_by_type(&self, endpoint_type: &str) -> Result<Value, ApiError> {
        self.execute(self.build_list_endpoints_by_type(endpoint_type))
    }

    pub fn get_endpoint(&self, id: &str) -> Result<Value, ApiError> {
        self.execute(self.build_get_endpoint(id))
    }

    pub fn create_conversation<B: Serialize + ?Sized>(&self, conversation: &B) -> Result<Value, ApiError> {
        self.execute(self.build_create_conversation(conversation)?)
    }

    pub fn get_conversation(&self, csid: u64) -> Result<Value, ApiError> {
        self.execute(self.build_get_conversation(csid))
    }

    pub fn list_conversation_messages(&self, csid: u64) -> Result<Value, ApiError> {
        self.execute(self.build_list_conversation_messages(csid))
    }

    pub fn add_historical_message<B: Serialize + ?Sized>(
        &self,
        csid: u64,
        message: &B,
    ) -> Result<Value, ApiError> {
        self.execute(self.build_add_historical_message(csid, message)?)
    }
}
