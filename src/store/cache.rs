//! Tag-addressed resource cache with request de-duplication and
//! stale-while-revalidate refresh.
//!
//! All state lives on the UI thread. Fetches run as spawned tasks and report
//! back over a channel; `poll()` drains completions on each tick and replaces
//! entry values wholesale, so a render between ticks never observes a
//! partially updated entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::types::{Project, SearchResults, Task};
use crate::api::Api;
use crate::error::ApiError;

use super::key::{ResourceKey, ResourceTag};

/// A fetched resource value. One variant per [`ResourceKey`] family.
#[derive(Debug, Clone)]
pub enum ResourceData {
  Projects(Vec<Project>),
  Tasks(Vec<Task>),
  Search(SearchResults),
}

impl ResourceData {
  pub fn as_projects(&self) -> Option<&[Project]> {
    match self {
      ResourceData::Projects(projects) => Some(projects),
      _ => None,
    }
  }

  pub fn as_tasks(&self) -> Option<&[Task]> {
    match self {
      ResourceData::Tasks(tasks) => Some(tasks),
      _ => None,
    }
  }

  pub fn as_search(&self) -> Option<&SearchResults> {
    match self {
      ResourceData::Search(results) => Some(results),
      _ => None,
    }
  }
}

/// Lifecycle state of a cache entry as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
  Loading,
  Success,
  Error,
}

/// Read-only view of a cache entry.
///
/// `data` stays populated through background refreshes and after a failed
/// refresh, so views keep rendering the last-known-good value.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
  pub status: ResourceStatus,
  pub data: Option<&'a ResourceData>,
  pub error: Option<&'a str>,
  /// A background refresh is in flight while cached data is being served.
  pub refreshing: bool,
}

impl<'a> Snapshot<'a> {
  pub fn is_loading(&self) -> bool {
    self.status == ResourceStatus::Loading
  }

  pub fn is_error(&self) -> bool {
    self.status == ResourceStatus::Error
  }

  pub fn tasks(&self) -> Option<&'a [Task]> {
    self.data.and_then(ResourceData::as_tasks)
  }

  pub fn projects(&self) -> Option<&'a [Project]> {
    self.data.and_then(ResourceData::as_projects)
  }

  pub fn search(&self) -> Option<&'a SearchResults> {
    self.data.and_then(ResourceData::as_search)
  }
}

#[derive(Default)]
struct Entry {
  data: Option<ResourceData>,
  error: Option<String>,
  in_flight: bool,
  /// Invalidated while a fetch was already running; refetch once it lands.
  stale: bool,
  subscribers: usize,
  released_at: Option<Instant>,
}

struct FetchDone {
  key: ResourceKey,
  result: Result<ResourceData, ApiError>,
}

/// In-memory cache of server resources, keyed by endpoint plus arguments.
pub struct ResourceCache {
  api: Arc<dyn Api>,
  entries: HashMap<ResourceKey, Entry>,
  tx: mpsc::UnboundedSender<FetchDone>,
  rx: mpsc::UnboundedReceiver<FetchDone>,
  /// How long an entry without subscribers survives before eviction.
  retention: Duration,
}

impl ResourceCache {
  pub fn new(api: Arc<dyn Api>, retention: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      api,
      entries: HashMap::new(),
      tx,
      rx,
      retention,
    }
  }

  /// Register a subscriber for a key.
  ///
  /// The first subscriber triggers the fetch; later subscribers joining
  /// before it resolves share the in-flight request. A fresh cached value is
  /// served as-is, while an errored entry is retried.
  pub fn subscribe(&mut self, key: ResourceKey) {
    let entry = self.entries.entry(key.clone()).or_default();
    entry.subscribers += 1;
    entry.released_at = None;

    let needs_fetch = !entry.in_flight && (entry.data.is_none() || entry.error.is_some());
    if needs_fetch {
      self.spawn_fetch(&key);
    }
  }

  /// Drop one subscriber. The entry stays cached until the retention window
  /// passes with no subscribers; an in-flight fetch is not aborted and its
  /// result is still cached when it arrives.
  pub fn release(&mut self, key: &ResourceKey) {
    if let Some(entry) = self.entries.get_mut(key) {
      entry.subscribers = entry.subscribers.saturating_sub(1);
      if entry.subscribers == 0 {
        entry.released_at = Some(Instant::now());
      }
    }
  }

  /// Current view of a key. Unknown keys read as loading.
  pub fn snapshot(&self, key: &ResourceKey) -> Snapshot<'_> {
    let Some(entry) = self.entries.get(key) else {
      return Snapshot {
        status: ResourceStatus::Loading,
        data: None,
        error: None,
        refreshing: false,
      };
    };

    let status = if entry.error.is_some() {
      ResourceStatus::Error
    } else if entry.data.is_some() {
      ResourceStatus::Success
    } else {
      ResourceStatus::Loading
    };

    Snapshot {
      status,
      data: entry.data.as_ref(),
      error: entry.error.as_deref(),
      refreshing: entry.in_flight && entry.data.is_some(),
    }
  }

  /// Mark every entry matching the tag stale and refresh it in the
  /// background. Entries nobody subscribes to are dropped instead.
  pub fn invalidate(&mut self, tag: &ResourceTag) {
    let mut refetch = Vec::new();
    self.entries.retain(|key, entry| {
      if !key.matches(tag) {
        return true;
      }
      if entry.subscribers == 0 && !entry.in_flight {
        debug!(key = %key.description(), "invalidated entry with no subscribers, dropping");
        return false;
      }
      entry.stale = true;
      if !entry.in_flight {
        refetch.push(key.clone());
      }
      true
    });

    for key in refetch {
      self.spawn_fetch(&key);
    }
  }

  /// Explicit refresh of one key, keeping the current value visible until
  /// the new one lands.
  pub fn refetch(&mut self, key: &ResourceKey) {
    if self.entries.contains_key(key) {
      self.spawn_fetch(key);
    }
  }

  /// Drain completed fetches into the cache. Returns true if anything
  /// changed and a redraw is warranted.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    let mut respawn = Vec::new();

    while let Ok(done) = self.rx.try_recv() {
      changed = true;
      let Some(entry) = self.entries.get_mut(&done.key) else {
        continue;
      };
      entry.in_flight = false;

      match done.result {
        Ok(data) => {
          entry.data = Some(data);
          entry.error = None;
        }
        Err(err) => {
          warn!(key = %done.key.description(), error = %err, "resource fetch failed");
          // Keep last-known-good data, if any, alongside the error.
          entry.error = Some(err.to_string());
        }
      }

      if entry.stale {
        entry.stale = false;
        respawn.push(done.key);
      }
    }

    for key in respawn {
      self.spawn_fetch(&key);
    }
    changed
  }

  /// Evict entries whose subscriber count has been zero for longer than the
  /// retention window. Entries with a fetch still in flight are kept so the
  /// arriving result can be cached.
  pub fn sweep(&mut self) {
    let retention = self.retention;
    self.entries.retain(|key, entry| {
      let keep = entry.subscribers > 0
        || entry.in_flight
        || entry
          .released_at
          .map(|released| released.elapsed() < retention)
          .unwrap_or(true);
      if !keep {
        debug!(key = %key.description(), "evicting idle cache entry");
      }
      keep
    });
  }

  fn spawn_fetch(&mut self, key: &ResourceKey) {
    let Some(entry) = self.entries.get_mut(key) else {
      return;
    };
    if entry.in_flight {
      return;
    }
    entry.in_flight = true;
    entry.stale = false;

    let api = Arc::clone(&self.api);
    let tx = self.tx.clone();
    let key = key.clone();
    debug!(key = %key.description(), "fetching resource");

    tokio::spawn(async move {
      let result = fetch_resource(api.as_ref(), &key).await;
      // Ignore send errors - the cache may have been dropped on shutdown.
      let _ = tx.send(FetchDone { key, result });
    });
  }
}

async fn fetch_resource(api: &dyn Api, key: &ResourceKey) -> Result<ResourceData, ApiError> {
  match key {
    ResourceKey::Projects => api.projects().await.map(ResourceData::Projects),
    ResourceKey::Tasks { project_id } => api.tasks(*project_id).await.map(ResourceData::Tasks),
    ResourceKey::Search { query } => api.search(query).await.map(ResourceData::Search),
  }
}
