use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::domain::Page;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    #[serde(skip)]
    status: StatusCode,
}

/// Listing metadata
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResponseMetadata {
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            metadata: None,
            status: StatusCode::OK,
        }
    }

    /// A success answered with `201 Created`.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.metadata = Some(ResponseMetadata {
            total_count: count,
            ..Default::default()
        });
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// A full listing with its length as metadata.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self::success(items).with_count(count)
    }

    pub fn page(page: Page<T>) -> Self {
        let metadata = ResponseMetadata {
            total_count: page.total,
            page: Some(page.page),
            page_size: Some(page.size),
        };
        Self {
            metadata: Some(metadata),
            ..Self::success(page.items)
        }
    }
}

/// A batch report next to its plain-text rendering.
#[derive(Debug, Serialize)]
pub struct Summarized<R: Serialize> {
    #[serde(flatten)]
    pub report: R,
    pub summary: String,
}

impl<R: Serialize + fmt::Display> From<R> for Summarized<R> {
    fn from(report: R) -> Self {
        Self {
            summary: report.to_string(),
            report,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
