//! Cache keys and invalidation tags.

/// Identity of a cached server query: endpoint plus arguments.
///
/// Keys compare structurally, so two subscriptions built independently for
/// the same project share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
  /// `GET /projects`
  Projects,
  /// `GET /tasks?projectId={id}`
  Tasks { project_id: u64 },
  /// `GET /search?query={q}`
  Search { query: String },
}

impl ResourceKey {
  /// The invalidation tag this key answers to.
  pub fn tag(&self) -> ResourceTag {
    match self {
      ResourceKey::Projects => ResourceTag::Projects,
      ResourceKey::Tasks { project_id } => ResourceTag::Tasks {
        project_id: *project_id,
      },
      ResourceKey::Search { .. } => ResourceTag::Search,
    }
  }

  pub fn matches(&self, tag: &ResourceTag) -> bool {
    self.tag() == *tag
  }

  /// Human-readable form for logs.
  pub fn description(&self) -> String {
    match self {
      ResourceKey::Projects => "projects".to_string(),
      ResourceKey::Tasks { project_id } => format!("tasks for project {}", project_id),
      ResourceKey::Search { query } => format!("search '{}'", query),
    }
  }
}

/// Groups cache entries for invalidation. A mutation declares the tags it
/// invalidates; every entry whose key matches is refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceTag {
  Projects,
  /// The task list of one project. Task mutations invalidate only the
  /// project they touched.
  Tasks { project_id: u64 },
  /// All cached search results, regardless of query.
  Search,
}
