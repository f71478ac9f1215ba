//! reqwest implementation of [`TaskBackend`].

use std::fmt;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::wire::{instant_from_date, CreateTodo, TaskChanges, TodoRecord};
use crate::api::{ListParams, TaskBackend};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{Task, TaskId};
use crate::util::{compact_text, normalize_text_option};

/// HTTP client for the `/health` and `/todo` endpoints.
#[derive(Clone)]
pub struct HttpTaskBackend {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl fmt::Debug for HttpTaskBackend {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpTaskBackend")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpTaskBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
            token: None,
        })
    }

    /// Attach a bearer token; blank tokens are treated as absent.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = normalize_text_option(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn todo_url(&self, id: &TaskId) -> String {
        format!("{}/todo/{}", self.base_url, urlencoding::encode(id.as_str()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        failure: &str,
    ) -> Result<T> {
        let response = self.authorized(request).send().await?;
        let response = check_status(response, failure).await?;
        Ok(response.json::<T>().await?)
    }
}

impl TaskBackend for HttpTaskBackend {
    async fn probe(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Api(format!(
                "Server not ready (HTTP {})",
                response.status().as_u16()
            )))
        }
    }

    async fn list_tasks(&self, params: &ListParams) -> Result<Vec<Task>> {
        let request = self
            .client
            .get(format!("{}/todo", self.base_url))
            .query(&params.to_pairs());
        let records: Vec<TodoRecord> = self.send_json(request, "Failed to fetch tasks").await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    async fn create_task(&self, title: &str, due_date: Option<&str>) -> Result<Task> {
        let to_be_completed_by = due_date.and_then(instant_from_date).unwrap_or_else(|| {
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        });
        let payload = CreateTodo {
            title,
            to_be_completed_by,
        };
        let request = self
            .client
            .post(format!("{}/todo", self.base_url))
            .json(&payload);
        let record: TodoRecord = self.send_json(request, "Failed to create task").await?;
        Ok(record.into())
    }

    async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<Task> {
        let request = self.client.patch(self.todo_url(id)).json(changes);
        let record: TodoRecord = self.send_json(request, "Failed to update task").await?;
        Ok(record.into())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<Task> {
        let request = self.client.delete(self.todo_url(id));
        let record: TodoRecord = self.send_json(request, "Failed to delete task").await?;
        Ok(record.into())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Map non-2xx responses to `Unauthorized` or an `Api` error carrying `failure`.
pub(crate) async fn check_status(response: Response, failure: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api(parse_api_error(failure, status, &body)))
}

pub(crate) fn parse_api_error(failure: &str, status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|payload| payload.message.or(payload.error))
        .map(|message| compact_text(&message))
        .filter(|message| !message.is_empty());

    match detail {
        Some(detail) => format!("{failure}: {detail} ({})", status.as_u16()),
        None => format!("{failure} (HTTP {})", status.as_u16()),
    }
}
