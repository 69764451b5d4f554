//! Activities: the jobs Landscape queues and runs on managed computers.
//!
//! Responses are returned as raw JSON.

use crate::client::{ApiRequest, Client};
use crate::error::Error;
use serde_json::Value;

const ACTION: &str = "GetActivities";

/// Filters for listing activities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Landscape search query, e.g. `status:failed`.
    pub query: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Authenticated access to `/activities`.
pub struct ActivitiesService<'a> {
    client: &'a Client,
}

impl<'a> ActivitiesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List activities matching `filter`.
    pub async fn list(&self, filter: &ActivityQuery) -> Result<Value, Error> {
        let mut req = ApiRequest::get("/activities", ACTION);
        if let Some(q) = &filter.query {
            req = req.query("query", q);
        }
        if let Some(limit) = filter.limit {
            req = req.query("limit", limit);
        }
        if let Some(offset) = filter.offset {
            req = req.query("offset", offset);
        }
        self.client.send(req).await
    }

    /// Fetch one activity by ID.
    pub async fn get(&self, id: u64) -> Result<Value, Error> {
        self.client
            .send(ApiRequest::get(format!("/activities/{}", id), ACTION))
            .await
    }
}
