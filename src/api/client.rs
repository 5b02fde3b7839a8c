//! Study endpoints of the backend.
//!
//! Replies use a `{ "success": bool, "data": ..., "error": "..." }` envelope.

use super::transport::{Body, Method, Response, Transport, TransportError};
use crate::models::{Card, CardId, Quality};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const CURRENT_USER: &str = "/api/user";
pub const DUE_CARDS: &str = "/api/study/due";
pub const LOGIN_PAGE: &str = "/login";

pub fn review_endpoint(card_id: CardId) -> String {
    format!("/api/study/review/{}", card_id.0)
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not signed in")]
    Unauthorized,
    #[error("{}", message.as_deref().unwrap_or("Request rejected"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("Unexpected response: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: Option<String>,
}

pub struct StudyApi<T> {
    transport: Arc<T>,
}

impl<T> Clone for StudyApi<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> StudyApi<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Authentication probe. Any error means the learner has to sign in first.
    pub fn current_user(&self) -> Result<User, ApiError> {
        let response = self.transport.call(CURRENT_USER, Method::Get, None)?;
        check_auth(&response)?;
        if !response.ok {
            return Err(rejected(&response));
        }

        let user = response.payload.get("data").unwrap_or(&response.payload);
        Ok(User {
            username: user
                .get("username")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn due_cards(&self) -> Result<Vec<Card>, ApiError> {
        let response = self.transport.call(DUE_CARDS, Method::Get, None)?;
        let data = unwrap_envelope(response)?;
        let cards: Vec<Card> = serde_json::from_value(data).map_err(ApiError::Malformed)?;
        info!(count = cards.len(), "fetched due cards");
        Ok(cards)
    }

    /// On success the server has durably rescheduled the card.
    pub fn submit_review(&self, card_id: CardId, quality: Quality) -> Result<(), ApiError> {
        let body = json!({ "quality": quality });
        let endpoint = review_endpoint(card_id);
        let response = self
            .transport
            .call(&endpoint, Method::Post, Some(Body::Json(body)))?;
        unwrap_envelope(response)?;
        Ok(())
    }
}

fn check_auth(response: &Response) -> Result<(), ApiError> {
    match response.status {
        401 | 403 => Err(ApiError::Unauthorized),
        _ => Ok(()),
    }
}

fn rejected(response: &Response) -> ApiError {
    let message = response
        .payload
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);
    warn!(status = response.status, message = ?message, "request rejected");
    ApiError::Rejected {
        status: response.status,
        message,
    }
}

fn unwrap_envelope(mut response: Response) -> Result<Value, ApiError> {
    check_auth(&response)?;

    let success = response
        .payload
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !response.ok || !success {
        return Err(rejected(&response));
    }

    Ok(response
        .payload
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null))
}
