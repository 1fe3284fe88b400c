//! Domain types for the project-management API.
//!
//! The wire format is camelCase JSON; all resources deserialize directly
//! into these types. Fields the server may omit are `Option` and render as
//! absent UI elements rather than errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of board columns. Every task carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
  #[serde(rename = "To Do")]
  ToDo,
  #[serde(rename = "Work In Progress")]
  WorkInProgress,
  #[serde(rename = "Under Review")]
  UnderReview,
  #[serde(rename = "Completed")]
  Completed,
}

impl TaskStatus {
  /// All statuses in board-column order.
  pub const ALL: [TaskStatus; 4] = [
    TaskStatus::ToDo,
    TaskStatus::WorkInProgress,
    TaskStatus::UnderReview,
    TaskStatus::Completed,
  ];

  /// The wire/display name for this status.
  pub fn label(&self) -> &'static str {
    match self {
      TaskStatus::ToDo => "To Do",
      TaskStatus::WorkInProgress => "Work In Progress",
      TaskStatus::UnderReview => "Under Review",
      TaskStatus::Completed => "Completed",
    }
  }
}

impl std::fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// Task priority. Absent on a task means the server never assigned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
  Urgent,
  High,
  Medium,
  Low,
}

impl Priority {
  /// All priorities from most to least urgent.
  pub const ALL: [Priority; 4] = [
    Priority::Urgent,
    Priority::High,
    Priority::Medium,
    Priority::Low,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Priority::Urgent => "Urgent",
      Priority::High => "High",
      Priority::Medium => "Medium",
      Priority::Low => "Low",
    }
  }
}

impl std::fmt::Display for Priority {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id: u64,
  pub username: String,
  #[serde(default)]
  pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
  #[serde(rename = "fileURL")]
  pub file_url: String,
  #[serde(rename = "fileName")]
  pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub start_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub end_date: Option<DateTime<Utc>>,
}

/// Project status is never sent by the server; it is derived from end_date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
  Active,
  Completed,
}

impl ProjectStatus {
  pub fn label(&self) -> &'static str {
    match self {
      ProjectStatus::Active => "Active",
      ProjectStatus::Completed => "Completed",
    }
  }
}

impl Project {
  /// A project with an end date is Completed, otherwise Active.
  pub fn status(&self) -> ProjectStatus {
    if self.end_date.is_some() {
      ProjectStatus::Completed
    } else {
      ProjectStatus::Active
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub status: TaskStatus,
  #[serde(default)]
  pub priority: Option<Priority>,
  /// Comma-separated on the wire; use [`Task::tag_list`] to split.
  #[serde(default)]
  pub tags: Option<String>,
  #[serde(default)]
  pub start_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub due_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub points: Option<u32>,
  pub project_id: u64,
  #[serde(default)]
  pub assignee: Option<User>,
  #[serde(default)]
  pub author: Option<User>,
  #[serde(default)]
  pub attachments: Vec<Attachment>,
  /// Comment bodies are opaque to this client; only the count is used.
  #[serde(default)]
  pub comments: Vec<serde_json::Value>,
}

impl Task {
  /// Split the comma-separated tag string into trimmed, non-empty tags.
  pub fn tag_list(&self) -> Vec<&str> {
    self
      .tags
      .as_deref()
      .map(|tags| {
        tags
          .split(',')
          .map(str::trim)
          .filter(|tag| !tag.is_empty())
          .collect()
      })
      .unwrap_or_default()
  }

  pub fn comment_count(&self) -> usize {
    self.comments.len()
  }
}

/// Body for `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskPayload {
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub status: TaskStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<Priority>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_date: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub due_date: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub points: Option<u32>,
  pub project_id: u64,
}

impl NewTaskPayload {
  /// Minimal payload: a titled task in To Do for the given project.
  pub fn new(title: impl Into<String>, project_id: u64) -> Self {
    Self {
      title: title.into(),
      description: None,
      status: TaskStatus::ToDo,
      priority: None,
      tags: None,
      start_date: None,
      due_date: None,
      points: None,
      project_id,
    }
  }
}

/// Response of the server-side search endpoint. Every section is optional
/// on the wire; missing sections are empty lists.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResults {
  #[serde(default)]
  pub tasks: Vec<Task>,
  #[serde(default)]
  pub projects: Vec<Project>,
  #[serde(default)]
  pub users: Vec<User>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_task_deserializes_camel_case() {
    let json = r#"{
      "id": 5,
      "title": "Ship the login page",
      "status": "Work In Progress",
      "priority": "High",
      "tags": "frontend, auth",
      "dueDate": "2024-03-01T00:00:00Z",
      "points": 3,
      "projectId": 1,
      "assignee": { "userId": 7, "username": "alice", "profilePictureUrl": "p7.jpg" },
      "attachments": [{ "fileURL": "i1.jpg", "fileName": "mock.jpg" }],
      "comments": [{}, {}]
    }"#;

    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.id, 5);
    assert_eq!(task.status, TaskStatus::WorkInProgress);
    assert_eq!(task.priority, Some(Priority::High));
    assert_eq!(task.project_id, 1);
    assert_eq!(task.assignee.as_ref().unwrap().username, "alice");
    assert_eq!(task.attachments[0].file_url, "i1.jpg");
    assert_eq!(task.comment_count(), 2);
  }

  #[test]
  fn test_task_optional_fields_default() {
    let json = r#"{ "id": 1, "title": "Bare", "status": "To Do", "projectId": 9 }"#;
    let task: Task = serde_json::from_str(json).unwrap();
    assert!(task.priority.is_none());
    assert!(task.assignee.is_none());
    assert!(task.attachments.is_empty());
    assert!(task.tag_list().is_empty());
  }

  #[test]
  fn test_malformed_status_is_rejected() {
    let json = r#"{ "id": 1, "title": "Bad", "status": "Blocked", "projectId": 9 }"#;
    assert!(serde_json::from_str::<Task>(json).is_err());
  }

  #[test]
  fn test_tag_list_splits_and_trims() {
    let json = r#"{ "id": 1, "title": "T", "status": "To Do", "projectId": 1, "tags": "a, b ,,c" }"#;
    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.tag_list(), vec!["a", "b", "c"]);
  }

  #[test]
  fn test_status_round_trips_wire_names() {
    for status in TaskStatus::ALL {
      let json = serde_json::to_string(&status).unwrap();
      assert_eq!(json, format!("\"{}\"", status.label()));
      let back: TaskStatus = serde_json::from_str(&json).unwrap();
      assert_eq!(back, status);
    }
  }

  #[test]
  fn test_project_status_derived_from_end_date() {
    let active: Project =
      serde_json::from_str(r#"{ "id": 1, "name": "A", "endDate": null }"#).unwrap();
    let done: Project =
      serde_json::from_str(r#"{ "id": 2, "name": "B", "endDate": "2024-01-01T00:00:00Z" }"#)
        .unwrap();
    assert_eq!(active.status(), ProjectStatus::Active);
    assert_eq!(done.status(), ProjectStatus::Completed);
  }

  #[test]
  fn test_new_task_payload_serializes_without_absent_fields() {
    let payload = NewTaskPayload::new("First", 3);
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["title"], "First");
    assert_eq!(json["projectId"], 3);
    assert_eq!(json["status"], "To Do");
    assert!(json.get("priority").is_none());
  }
}
