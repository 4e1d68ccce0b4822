//! Path parameter extractors
//!
//! Type-safe extraction of Snowflake IDs from path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use huddle_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

/// Path parameters with conversation_id
#[derive(Debug, Clone, Copy)]
pub struct ConversationIdPath(pub Snowflake);

/// Path parameters with message_id
#[derive(Debug, Clone, Copy)]
pub struct MessageIdPath(pub Snowflake);

#[derive(Deserialize)]
struct ConversationParams {
    conversation_id: String,
}

#[derive(Deserialize)]
struct MessageParams {
    message_id: String,
}

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

#[async_trait]
impl<S> FromRequestParts<S> for ConversationIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<ConversationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        parse_id(&params.conversation_id, "conversation_id").map(Self)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MessageIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<MessageParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        parse_id(&params.message_id, "message_id").map(Self)
    }
}
