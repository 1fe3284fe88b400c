//! REST API contract and HTTP client.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;
use types::{NewTaskPayload, Project, SearchResults, Task, TaskStatus};

/// The server contract consumed by the store.
///
/// The store only talks to this trait, so tests can drive the cache and
/// mutation paths with an in-memory fake instead of a live server.
#[async_trait]
pub trait Api: Send + Sync {
  /// `GET /projects`
  async fn projects(&self) -> Result<Vec<Project>, ApiError>;

  /// `GET /tasks?projectId={id}`
  async fn tasks(&self, project_id: u64) -> Result<Vec<Task>, ApiError>;

  /// `GET /search?query={q}`
  async fn search(&self, query: &str) -> Result<SearchResults, ApiError>;

  /// `PATCH /tasks/{id}/status`
  async fn update_task_status(&self, task_id: u64, status: TaskStatus) -> Result<Task, ApiError>;

  /// `POST /tasks`
  async fn create_task(&self, payload: &NewTaskPayload) -> Result<Task, ApiError>;
}
