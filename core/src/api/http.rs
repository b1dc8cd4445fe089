//! reqwest-backed implementation of [`TodoApi`]

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::TodoApi;
use crate::error::Error;
use crate::model::page::{ListQuery, PageInfo, TaskPage};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::Result;

/// Single payload, either wrapped as `{success, data}` or sent bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } | Envelope::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Option<OneOrMany<Task>>,
    #[serde(default)]
    pagination: Option<PageInfo>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(base_url = %base_url, "API base URL");
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todo_url(&self, id: &TaskId) -> Result<String> {
        if id.is_empty() {
            return Err(Error::Validation("Invalid todo ID format".to_string()));
        }
        Ok(format!(
            "{}/todos/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        ))
    }

    async fn send(&self, method: &str, url: &str, request: RequestBuilder) -> Result<String> {
        info!(method, url, "API request");

        let resp = request.send().await.map_err(|e| {
            error!(method, url, error = %e, "API request failed");
            Error::transport(e.to_string())
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport {
                status: Some(status.as_u16()),
                message: format!("Failed to read response body: {}", e),
                detail: None,
            })?;

        if status.is_success() {
            info!(status = status.as_u16(), url, "API response");
            Ok(body)
        } else {
            let err = classify_failure(status.as_u16(), &body);
            error!(url, status = status.as_u16(), error = %err, data = %body, "API error");
            Err(err)
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let body = self.send(method, url, request).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| Error::transport(format!("Invalid response body: {}", e)))
}

/// Maps a non-2xx answer onto the error taxonomy.
pub fn classify_failure(status: u16, body: &str) -> Error {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let detail = parsed.error.or(parsed.message);
    match status {
        404 => Error::NotFound(detail.unwrap_or_else(|| "Todo not found".to_string())),
        400 => Error::BadRequest(detail),
        _ => Error::Transport {
            status: Some(status),
            message: format!("HTTP {}", status),
            detail,
        },
    }
}

/// Decodes a `GET /todos` body, tolerating a single-object or missing `data`.
pub fn decode_list(body: &str) -> Result<TaskPage> {
    let envelope: ListEnvelope = decode(body)?;
    let items = match envelope.data {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    };
    Ok(TaskPage {
        items,
        pagination: envelope.pagination.unwrap_or_default(),
    })
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list_tasks(&self, query: &ListQuery) -> Result<TaskPage> {
        let url = format!("{}/todos", self.base_url);
        let params = query.to_params();
        debug!(?params, "list query");
        let body = self
            .send("GET", &url, self.client.get(&url).query(&params))
            .await?;
        let page = decode_list(&body)?;
        debug!(items = page.items.len(), pagination = ?page.pagination, "list response");
        Ok(page)
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task> {
        let url = self.todo_url(id)?;
        let envelope: Envelope<Task> = self.send_json("GET", &url, self.client.get(&url)).await?;
        Ok(envelope.into_inner())
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let url = format!("{}/todos", self.base_url);
        let envelope: Envelope<Task> = self
            .send_json("POST", &url, self.client.post(&url).json(draft))
            .await?;
        Ok(envelope.into_inner())
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task> {
        let url = self.todo_url(id)?;
        let envelope: Envelope<Task> = self
            .send_json("PUT", &url, self.client.put(&url).json(draft))
            .await?;
        Ok(envelope.into_inner())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let url = self.todo_url(id)?;
        info!(id = %id, "deleting todo");
        self.send("DELETE", &url, self.client.delete(&url)).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let url = format!("{}/todos/stats", self.base_url);
        let envelope: Envelope<serde_json::Value> =
            self.send_json("GET", &url, self.client.get(&url)).await?;
        Ok(envelope.into_inner())
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/", self.base_url);
        self.send("GET", &url, self.client.get(&url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK_JSON: &str = r#"{
        "_id": "abc123",
        "title": "Ship release",
        "description": "Tag and publish",
        "deadline": "2025-04-01T17:00:00.000Z",
        "status": "pending",
        "createdAt": "2025-03-01T08:00:00.000Z",
        "updatedAt": "2025-03-01T08:00:00.000Z"
    }"#;

    #[test]
    fn test_decode_list_envelope() {
        let body = format!(
            r#"{{"success": true, "data": [{}], "pagination": {{"page": 1, "total": 1, "totalPages": 1}}}}"#,
            TASK_JSON
        );
        let page = decode_list(&body).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Ship release");
        assert_eq!(page.pagination.total, Some(1));
        assert_eq!(page.pagination.total_pages, Some(1));
    }

    #[test]
    fn test_decode_list_wraps_single_object() {
        let body = format!(r#"{{"success": true, "data": {}}}"#, TASK_JSON);
        let page = decode_list(&body).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination, PageInfo::default());
    }

    #[test]
    fn test_decode_list_with_id_and_mongo_id() {
        let both = TASK_JSON.replace(r#""_id": "abc123","#, r#""_id": "abc123", "id": "abc123","#);
        assert_ne!(both, TASK_JSON);
        let body = format!(r#"{{"success": true, "data": [{}, {}]}}"#, both, TASK_JSON);
        let page = decode_list(&body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|t| t.id.as_str() == "abc123"));
    }

    #[test]
    fn test_decode_list_without_data() {
        let page = decode_list(r#"{"success": true}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_envelope_accepts_bare_and_wrapped() {
        let bare: Envelope<Task> = decode(TASK_JSON).unwrap();
        assert_eq!(bare.into_inner().id.as_str(), "abc123");

        let wrapped = format!(r#"{{"success": true, "data": {}}}"#, TASK_JSON);
        let wrapped: Envelope<Task> = decode(&wrapped).unwrap();
        assert_eq!(wrapped.into_inner().id.as_str(), "abc123");
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(404, r#"{"success": false, "error": "Todo not found"}"#),
            Error::NotFound(msg) if msg == "Todo not found"
        ));
        assert_eq!(classify_failure(400, ""), Error::BadRequest(None));
        assert_eq!(classify_failure(400, "").submit_message(), "Operation failed");
        assert_eq!(
            classify_failure(400, r#"{"success": false, "error": "Invalid deadline"}"#),
            Error::BadRequest(Some("Invalid deadline".to_string()))
        );
        match classify_failure(503, r#"{"message": "maintenance"}"#) {
            Error::Transport { status, detail, .. } => {
                assert_eq!(status, Some(503));
                assert_eq!(detail.as_deref(), Some("maintenance"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_id_rejected_before_request() {
        let api = HttpTodoApi::with_client(Client::new(), "http://localhost:3000/api/");
        assert_eq!(api.base_url(), "http://localhost:3000/api");
        assert!(matches!(api.todo_url(&TaskId::new("  ")), Err(Error::Validation(_))));
        assert_eq!(
            api.todo_url(&TaskId::new("a/b")).unwrap(),
            "http://localhost:3000/api/todos/a%2Fb"
        );
    }
}
