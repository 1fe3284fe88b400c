//! Write operations and the cache tags they invalidate.
//!
//! Mutations are fire-and-confirm: the request is sent, the server's answer
//! is awaited, and only a successful outcome invalidates cache entries. No
//! local cache record is touched optimistically, so a failed mutation leaves
//! every view exactly where it was.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::types::{NewTaskPayload, TaskStatus};
use crate::api::Api;
use crate::error::ApiError;

use super::key::ResourceTag;

/// A write request together with everything needed to invalidate the right
/// cache entries afterwards.
#[derive(Debug, Clone)]
pub enum Mutation {
  /// `PATCH /tasks/{id}/status` - a card moved to another column.
  UpdateTaskStatus {
    task_id: u64,
    project_id: u64,
    status: TaskStatus,
  },
  /// `POST /tasks`
  CreateTask(NewTaskPayload),
}

impl Mutation {
  /// The tags a successful run of this mutation invalidates.
  pub fn invalidates(&self) -> Vec<ResourceTag> {
    match self {
      Mutation::UpdateTaskStatus { project_id, .. } => vec![ResourceTag::Tasks {
        project_id: *project_id,
      }],
      Mutation::CreateTask(payload) => vec![ResourceTag::Tasks {
        project_id: payload.project_id,
      }],
    }
  }

  pub fn description(&self) -> String {
    match self {
      Mutation::UpdateTaskStatus {
        task_id, status, ..
      } => format!("move task {} to {}", task_id, status),
      Mutation::CreateTask(payload) => format!("create task '{}'", payload.title),
    }
  }
}

/// The resolved result of one mutation.
pub struct MutationOutcome {
  pub mutation: Mutation,
  pub result: Result<(), String>,
}

/// Runs mutations as background tasks and reports their outcomes on poll.
///
/// Nothing serializes mutations against each other: two moves of the same
/// task can be in flight at once, both are sent, and the cache ends up
/// reflecting whichever refetch resolves last.
pub struct MutationCoordinator {
  api: Arc<dyn Api>,
  tx: mpsc::UnboundedSender<MutationOutcome>,
  rx: mpsc::UnboundedReceiver<MutationOutcome>,
  in_flight: usize,
}

impl MutationCoordinator {
  pub fn new(api: Arc<dyn Api>) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      api,
      tx,
      rx,
      in_flight: 0,
    }
  }

  /// Send a mutation to the server. The outcome arrives via [`poll`].
  ///
  /// [`poll`]: MutationCoordinator::poll
  pub fn submit(&mut self, mutation: Mutation) {
    self.in_flight += 1;
    debug!(mutation = %mutation.description(), "submitting mutation");

    let api = Arc::clone(&self.api);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = run(api.as_ref(), &mutation)
        .await
        .map_err(|e| e.to_string());
      let _ = tx.send(MutationOutcome { mutation, result });
    });
  }

  /// Drain resolved mutations.
  pub fn poll(&mut self) -> Vec<MutationOutcome> {
    let mut outcomes = Vec::new();
    while let Ok(outcome) = self.rx.try_recv() {
      self.in_flight = self.in_flight.saturating_sub(1);
      if let Err(err) = &outcome.result {
        warn!(mutation = %outcome.mutation.description(), error = %err, "mutation failed");
      }
      outcomes.push(outcome);
    }
    outcomes
  }

  pub fn in_flight(&self) -> usize {
    self.in_flight
  }
}

async fn run(api: &dyn Api, mutation: &Mutation) -> Result<(), ApiError> {
  match mutation {
    Mutation::UpdateTaskStatus {
      task_id, status, ..
    } => {
      // The returned task is discarded - the refetch triggered by
      // invalidation is the authoritative update path.
      api.update_task_status(*task_id, *status).await?;
    }
    Mutation::CreateTask(payload) => {
      api.create_task(payload).await?;
    }
  }
  Ok(())
}
