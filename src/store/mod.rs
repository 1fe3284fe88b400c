//! Client-side data synchronization layer.
//!
//! Modeled on the query-cache pattern of web data-fetching libraries: views
//! subscribe to [`ResourceKey`]s and render whatever the cache currently
//! holds, writes go through [`Mutation`]s that invalidate tags, and the
//! entries behind those tags refresh in the background while subscribers
//! keep seeing the previous value.

mod cache;
mod key;
mod mutation;

use std::sync::Arc;
use std::time::Duration;

pub use cache::{ResourceData, ResourceStatus, Snapshot};
pub use key::{ResourceKey, ResourceTag};
pub use mutation::Mutation;

use cache::ResourceCache;
use mutation::MutationCoordinator;

use crate::api::Api;

/// How long an entry without subscribers stays cached.
const DEFAULT_RETENTION: Duration = Duration::from_secs(300);

/// Facade over the resource cache and the mutation coordinator.
///
/// Owned by the UI loop; everything here runs on one thread, with spawned
/// fetch/mutation tasks reporting back through channels drained by
/// [`Store::poll`].
pub struct Store {
  cache: ResourceCache,
  mutations: MutationCoordinator,
  last_mutation_error: Option<String>,
}

impl Store {
  pub fn new(api: Arc<dyn Api>) -> Self {
    Self::with_retention(api, DEFAULT_RETENTION)
  }

  pub fn with_retention(api: Arc<dyn Api>, retention: Duration) -> Self {
    Self {
      cache: ResourceCache::new(Arc::clone(&api), retention),
      mutations: MutationCoordinator::new(api),
      last_mutation_error: None,
    }
  }

  pub fn subscribe(&mut self, key: ResourceKey) {
    self.cache.subscribe(key);
  }

  pub fn release(&mut self, key: &ResourceKey) {
    self.cache.release(key);
  }

  pub fn snapshot(&self, key: &ResourceKey) -> Snapshot<'_> {
    self.cache.snapshot(key)
  }

  pub fn refetch(&mut self, key: &ResourceKey) {
    self.cache.refetch(key);
  }

  /// Submit a write. The result surfaces via [`Store::poll`]; on success the
  /// mutation's tags are invalidated and affected entries refresh in the
  /// background.
  pub fn mutate(&mut self, mutation: Mutation) {
    self.last_mutation_error = None;
    self.mutations.submit(mutation);
  }

  /// Drain completed fetches and mutations. Returns true if anything
  /// changed and a redraw is warranted.
  pub fn poll(&mut self) -> bool {
    let mut changed = self.cache.poll();

    for outcome in self.mutations.poll() {
      changed = true;
      match outcome.result {
        Ok(()) => {
          for tag in outcome.mutation.invalidates() {
            self.cache.invalidate(&tag);
          }
        }
        Err(err) => {
          self.last_mutation_error = Some(err);
        }
      }
    }
    changed
  }

  /// Evict entries idle past the retention window. Called on the tick timer.
  pub fn sweep(&mut self) {
    self.cache.sweep();
  }

  pub fn pending_mutations(&self) -> usize {
    self.mutations.in_flight()
  }

  pub fn last_mutation_error(&self) -> Option<&str> {
    self.last_mutation_error.as_deref()
  }

  pub fn clear_mutation_error(&mut self) {
    self.last_mutation_error = None;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  use std::sync::Mutex;

  use async_trait::async_trait;
  use tokio::time::sleep;

  use crate::api::types::{NewTaskPayload, Project, SearchResults, Task, TaskStatus};
  use crate::error::ApiError;

  fn sample_task(id: u64, project_id: u64, status: TaskStatus) -> Task {
    Task {
      id,
      title: format!("Task {}", id),
      description: None,
      status,
      priority: None,
      tags: None,
      start_date: None,
      due_date: None,
      points: None,
      project_id,
      assignee: None,
      author: None,
      attachments: Vec::new(),
      comments: Vec::new(),
    }
  }

  /// In-memory server double. Fetch delay applies to reads only, so
  /// mutations can resolve while a refetch is still on the wire.
  struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    projects: Mutex<Vec<Project>>,
    fetch_delay: Duration,
    task_fetches: AtomicUsize,
    mutation_calls: AtomicUsize,
    fail_fetches: AtomicBool,
    fail_mutations: AtomicBool,
  }

  impl FakeApi {
    fn new(tasks: Vec<Task>) -> Self {
      Self {
        tasks: Mutex::new(tasks),
        projects: Mutex::new(Vec::new()),
        fetch_delay: Duration::ZERO,
        task_fetches: AtomicUsize::new(0),
        mutation_calls: AtomicUsize::new(0),
        fail_fetches: AtomicBool::new(false),
        fail_mutations: AtomicBool::new(false),
      }
    }

    fn with_fetch_delay(mut self, delay: Duration) -> Self {
      self.fetch_delay = delay;
      self
    }
  }

  #[async_trait]
  impl crate::api::Api for FakeApi {
    async fn projects(&self) -> Result<Vec<Project>, ApiError> {
      sleep(self.fetch_delay).await;
      Ok(self.projects.lock().unwrap().clone())
    }

    async fn tasks(&self, project_id: u64) -> Result<Vec<Task>, ApiError> {
      sleep(self.fetch_delay).await;
      self.task_fetches.fetch_add(1, Ordering::SeqCst);
      if self.fail_fetches.load(Ordering::SeqCst) {
        return Err(ApiError::Network("connection refused".to_string()));
      }
      Ok(
        self
          .tasks
          .lock()
          .unwrap()
          .iter()
          .filter(|t| t.project_id == project_id)
          .cloned()
          .collect(),
      )
    }

    async fn search(&self, _query: &str) -> Result<SearchResults, ApiError> {
      sleep(self.fetch_delay).await;
      Ok(SearchResults::default())
    }

    async fn update_task_status(
      &self,
      task_id: u64,
      status: TaskStatus,
    ) -> Result<Task, ApiError> {
      self.mutation_calls.fetch_add(1, Ordering::SeqCst);
      if self.fail_mutations.load(Ordering::SeqCst) {
        return Err(ApiError::Server { status: 500 });
      }
      let mut tasks = self.tasks.lock().unwrap();
      let task = tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| ApiError::Validation(format!("no task {}", task_id)))?;
      task.status = status;
      Ok(task.clone())
    }

    async fn create_task(&self, payload: &NewTaskPayload) -> Result<Task, ApiError> {
      self.mutation_calls.fetch_add(1, Ordering::SeqCst);
      if self.fail_mutations.load(Ordering::SeqCst) {
        return Err(ApiError::Server { status: 500 });
      }
      let mut tasks = self.tasks.lock().unwrap();
      let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
      let mut task = sample_task(id, payload.project_id, payload.status);
      task.title = payload.title.clone();
      tasks.push(task.clone());
      Ok(task)
    }
  }

  /// Poll the store until the condition holds, failing after ~2 seconds.
  async fn wait_until(store: &mut Store, mut condition: impl FnMut(&Store) -> bool) {
    for _ in 0..400 {
      store.poll();
      if condition(store) {
        return;
      }
      sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
  }

  fn tasks_key(project_id: u64) -> ResourceKey {
    ResourceKey::Tasks { project_id }
  }

  fn status_of(store: &Store, project_id: u64, task_id: u64) -> Option<TaskStatus> {
    store
      .snapshot(&tasks_key(project_id))
      .tasks()
      .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
      .map(|t| t.status)
  }

  #[tokio::test]
  async fn test_concurrent_subscribers_share_one_fetch() {
    let api = Arc::new(
      FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)])
        .with_fetch_delay(Duration::from_millis(30)),
    );
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    store.subscribe(tasks_key(1));
    store.subscribe(tasks_key(1));

    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;

    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 1);

    // Another subscriber arriving after resolution is served from cache.
    store.subscribe(tasks_key(1));
    store.poll();
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_status_update_invalidates_and_refetches() {
    let api = Arc::new(FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)]));
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      status_of(s, 1, 5) == Some(TaskStatus::ToDo)
    })
    .await;

    store.mutate(Mutation::UpdateTaskStatus {
      task_id: 5,
      project_id: 1,
      status: TaskStatus::Completed,
    });

    wait_until(&mut store, |s| {
      status_of(s, 1, 5) == Some(TaskStatus::Completed)
    })
    .await;

    assert_eq!(api.mutation_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 2);
    assert!(store.last_mutation_error().is_none());
  }

  #[tokio::test]
  async fn test_refetch_serves_stale_value_until_resolved() {
    let api = Arc::new(
      FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)])
        .with_fetch_delay(Duration::from_millis(50)),
    );
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;

    // Mutations resolve immediately; the invalidation-triggered refetch
    // takes 50ms, giving us a window to observe the stale value.
    store.mutate(Mutation::UpdateTaskStatus {
      task_id: 5,
      project_id: 1,
      status: TaskStatus::Completed,
    });
    wait_until(&mut store, |s| s.snapshot(&tasks_key(1)).refreshing).await;

    let snapshot = store.snapshot(&tasks_key(1));
    assert_eq!(snapshot.status, ResourceStatus::Success);
    assert_eq!(status_of(&store, 1, 5), Some(TaskStatus::ToDo));

    wait_until(&mut store, |s| {
      status_of(s, 1, 5) == Some(TaskStatus::Completed)
    })
    .await;
  }

  #[tokio::test]
  async fn test_failed_mutation_leaves_cache_untouched() {
    let api = Arc::new(FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)]));
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;

    api.fail_mutations.store(true, Ordering::SeqCst);
    store.mutate(Mutation::UpdateTaskStatus {
      task_id: 5,
      project_id: 1,
      status: TaskStatus::Completed,
    });
    wait_until(&mut store, |s| s.pending_mutations() == 0).await;

    assert!(store.last_mutation_error().is_some());
    // No invalidation happened, so no refetch and no change.
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(status_of(&store, 1, 5), Some(TaskStatus::ToDo));
  }

  #[tokio::test]
  async fn test_fetch_error_surfaces_and_retries_on_next_subscription() {
    let api = Arc::new(FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)]));
    api.fail_fetches.store(true, Ordering::SeqCst);
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| s.snapshot(&tasks_key(1)).is_error()).await;
    assert!(store
      .snapshot(&tasks_key(1))
      .error
      .unwrap()
      .contains("connection refused"));

    // No automatic retry while nothing new subscribes.
    sleep(Duration::from_millis(30)).await;
    store.poll();
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 1);

    api.fail_fetches.store(false, Ordering::SeqCst);
    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;
  }

  #[tokio::test]
  async fn test_eviction_after_retention_window() {
    let api = Arc::new(FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)]));
    let mut store = Store::with_retention(api.clone(), Duration::ZERO);

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;

    store.release(&tasks_key(1));
    store.sweep();
    assert!(store.snapshot(&tasks_key(1)).is_loading());

    // Re-subscription after eviction fetches fresh.
    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_release_before_resolve_still_caches_result() {
    let api = Arc::new(
      FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)])
        .with_fetch_delay(Duration::from_millis(30)),
    );
    let mut store = Store::with_retention(api.clone(), Duration::from_secs(60));

    store.subscribe(tasks_key(1));
    store.release(&tasks_key(1));
    store.sweep();

    // The in-flight fetch is not aborted; its result lands in the cache.
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_invalidation_drops_unwatched_entries() {
    let api = Arc::new(FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)]));
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;
    store.release(&tasks_key(1));

    store.mutate(Mutation::UpdateTaskStatus {
      task_id: 5,
      project_id: 1,
      status: TaskStatus::Completed,
    });
    wait_until(&mut store, |s| s.pending_mutations() == 0).await;
    store.poll();

    // Nobody was watching, so the entry is dropped rather than refetched.
    assert!(store.snapshot(&tasks_key(1)).is_loading());
    assert_eq!(api.task_fetches.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_overlapping_mutations_are_both_sent() {
    let api = Arc::new(FakeApi::new(vec![sample_task(5, 1, TaskStatus::ToDo)]));
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(1));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(1)).status == ResourceStatus::Success
    })
    .await;

    store.mutate(Mutation::UpdateTaskStatus {
      task_id: 5,
      project_id: 1,
      status: TaskStatus::WorkInProgress,
    });
    store.mutate(Mutation::UpdateTaskStatus {
      task_id: 5,
      project_id: 1,
      status: TaskStatus::UnderReview,
    });

    wait_until(&mut store, |s| s.pending_mutations() == 0).await;
    assert_eq!(api.mutation_calls.load(Ordering::SeqCst), 2);

    // Last write on the fake server wins; the cache converges on it.
    wait_until(&mut store, |s| {
      status_of(s, 1, 5) == Some(TaskStatus::UnderReview)
    })
    .await;
  }

  #[tokio::test]
  async fn test_create_task_invalidates_project_tasks() {
    let api = Arc::new(FakeApi::new(vec![sample_task(1, 3, TaskStatus::ToDo)]));
    let mut store = Store::new(api.clone());

    store.subscribe(tasks_key(3));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(3)).status == ResourceStatus::Success
    })
    .await;

    store.mutate(Mutation::CreateTask(NewTaskPayload::new("New card", 3)));
    wait_until(&mut store, |s| {
      s.snapshot(&tasks_key(3))
        .tasks()
        .map(|tasks| tasks.len() == 2)
        .unwrap_or(false)
    })
    .await;
  }
}
