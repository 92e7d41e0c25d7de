//! Request payloads with a fixed shape.
//!
//! Conversations and historical messages are forwarded exactly as the caller
//! supplies them, so they have no type here; any `Serialize` value works.

use serde::{Deserialize, Serialize};

/// Payload for creating a user. Only these three fields are sent; absent
/// optional fields are omitted from the JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Entity to anonymize. The request always forces anonymization, so there is
/// no flag to set here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleAnonymization {
    pub entity_id: String,
    pub entity_type: String,
}

/// Wire body for `POST /v1/anonymization_request`.
#[derive(Debug, Serialize)]
pub(crate) struct AnonymizationBody<'a> {
    pub entity_id: &'a str,
    pub entity_type: &'a str,
    pub force_anonymization: bool,
}

impl<'a> From<&'a ScheduleAnonymization> for AnonymizationBody<'a> {
    fn from(input: &'a ScheduleAnonymization) -> Self {
        Self {
            entity_id: &input.entity_id,
            entity_type: &input.entity_type,
            force_anonymization: true,
        }
    }
}
