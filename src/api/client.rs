//! HTTP implementation of the [`Api`] trait.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::config::Config;
use crate::error::ApiError;

use super::types::{NewTaskPayload, Project, SearchResults, Task, TaskStatus};
use super::Api;

/// Client for the project-management REST API.
#[derive(Clone)]
pub struct HttpApi {
  http: reqwest::Client,
  base_url: Url,
}

impl HttpApi {
  pub fn new(config: &Config) -> Result<Self> {
    let mut base_url = Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    // A trailing slash makes Url::join treat the last segment as a directory.
    if !base_url.path().ends_with('/') {
      base_url.set_path(&format!("{}/", base_url.path()));
    }

    Ok(Self {
      http: reqwest::Client::new(),
      base_url,
    })
  }

  /// The host portion of the base URL, for header display.
  pub fn host(&self) -> String {
    self.base_url.host_str().unwrap_or("api").to_string()
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    self
      .base_url
      .join(path)
      .map_err(|e| ApiError::Validation(format!("bad endpoint path {}: {}", path, e)))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
    let response = self.http.get(url).send().await?;
    decode(response).await
  }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
  let status = response.status();
  if !status.is_success() {
    return Err(ApiError::Server {
      status: status.as_u16(),
    });
  }
  response
    .json::<T>()
    .await
    .map_err(|e| ApiError::Validation(e.to_string()))
}

#[async_trait]
impl Api for HttpApi {
  async fn projects(&self) -> Result<Vec<Project>, ApiError> {
    let url = self.endpoint("projects")?;
    self.get_json(url).await
  }

  async fn tasks(&self, project_id: u64) -> Result<Vec<Task>, ApiError> {
    let mut url = self.endpoint("tasks")?;
    url
      .query_pairs_mut()
      .append_pair("projectId", &project_id.to_string());
    self.get_json(url).await
  }

  async fn search(&self, query: &str) -> Result<SearchResults, ApiError> {
    let query = query.trim();
    if query.is_empty() {
      return Err(ApiError::Validation("empty search query".to_string()));
    }

    let mut url = self.endpoint("search")?;
    url.query_pairs_mut().append_pair("query", query);
    self.get_json(url).await
  }

  async fn update_task_status(&self, task_id: u64, status: TaskStatus) -> Result<Task, ApiError> {
    let url = self.endpoint(&format!("tasks/{}/status", task_id))?;
    let response = self
      .http
      .patch(url)
      .json(&json!({ "status": status }))
      .send()
      .await?;
    decode(response).await
  }

  async fn create_task(&self, payload: &NewTaskPayload) -> Result<Task, ApiError> {
    let url = self.endpoint("tasks")?;
    let response = self.http.post(url).json(payload).send().await?;
    decode(response).await
  }
}
