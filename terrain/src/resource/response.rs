//! Successful pipeline responses

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::pager::ContentRange;

/// Status, optional JSON body and optional `Content-Range`
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub content_range: Option<ContentRange>,
}

impl ResourceResponse {
    /// 200 with a body
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
            content_range: None,
        }
    }

    /// 201 with a body
    pub fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Some(body),
            content_range: None,
        }
    }

    /// 204, empty
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
            content_range: None,
        }
    }

    #[must_use]
    pub fn with_content_range(mut self, range: ContentRange) -> Self {
        self.content_range = Some(range);
        self
    }
}

impl IntoResponse for ResourceResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        if let Some(range) = self.content_range {
            // Digits, '-', '/' and '*' only
            if let Ok(value) = HeaderValue::from_str(&range.to_string()) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
