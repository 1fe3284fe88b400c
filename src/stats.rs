//! Pure derivations over cached resources.
//!
//! Everything here is recomputed from the latest cache snapshot on each
//! render; there is no hidden state, so the same input always produces the
//! same grouping or counts.

use crate::api::types::{Priority, Project, ProjectStatus, Task, TaskStatus};

/// Group tasks into board columns, in fixed column order. Tasks keep their
/// relative order within a column.
pub fn group_by_status(tasks: &[Task]) -> Vec<(TaskStatus, Vec<&Task>)> {
  TaskStatus::ALL
    .iter()
    .map(|&status| {
      let column = tasks.iter().filter(|t| t.status == status).collect();
      (status, column)
    })
    .collect()
}

/// Count tasks per priority, from most to least urgent, with unprioritized
/// tasks in a trailing `None` bucket. Buckets no task falls into are omitted.
pub fn priority_distribution(tasks: &[Task]) -> Vec<(Option<Priority>, usize)> {
  let buckets = Priority::ALL.iter().map(|&p| Some(p)).chain([None]);
  buckets
    .filter_map(|priority| {
      let count = tasks.iter().filter(|t| t.priority == priority).count();
      (count > 0).then_some((priority, count))
    })
    .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStatusCounts {
  pub active: usize,
  pub completed: usize,
}

/// Count projects by derived status.
pub fn project_status_counts(projects: &[Project]) -> ProjectStatusCounts {
  let mut counts = ProjectStatusCounts::default();
  for project in projects {
    match project.status() {
      ProjectStatus::Active => counts.active += 1,
      ProjectStatus::Completed => counts.completed += 1,
    }
  }
  counts
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Utc};

  fn task(id: u64, status: TaskStatus, priority: Option<Priority>) -> Task {
    Task {
      id,
      title: format!("Task {}", id),
      description: None,
      status,
      priority,
      tags: None,
      start_date: None,
      due_date: None,
      points: None,
      project_id: 1,
      assignee: None,
      author: None,
      attachments: Vec::new(),
      comments: Vec::new(),
    }
  }

  fn project(id: u64, completed: bool) -> Project {
    Project {
      id,
      name: format!("Project {}", id),
      description: None,
      start_date: None,
      end_date: completed.then(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
    }
  }

  #[test]
  fn test_grouping_is_deterministic_and_ordered() {
    let tasks = vec![
      task(1, TaskStatus::Completed, None),
      task(2, TaskStatus::ToDo, None),
      task(3, TaskStatus::ToDo, None),
      task(4, TaskStatus::UnderReview, None),
    ];

    let grouped = group_by_status(&tasks);
    assert_eq!(grouped.len(), 4);
    assert_eq!(grouped[0].0, TaskStatus::ToDo);
    assert_eq!(
      grouped[0].1.iter().map(|t| t.id).collect::<Vec<_>>(),
      vec![2, 3]
    );
    assert!(grouped[1].1.is_empty()); // Work In Progress
    assert_eq!(grouped[2].1[0].id, 4);
    assert_eq!(grouped[3].1[0].id, 1);

    // Same input, same output.
    let again = group_by_status(&tasks);
    for (a, b) in grouped.iter().zip(again.iter()) {
      assert_eq!(a.0, b.0);
      assert_eq!(
        a.1.iter().map(|t| t.id).collect::<Vec<_>>(),
        b.1.iter().map(|t| t.id).collect::<Vec<_>>()
      );
    }
  }

  #[test]
  fn test_priority_distribution_counts() {
    let tasks = vec![
      task(1, TaskStatus::ToDo, Some(Priority::Urgent)),
      task(2, TaskStatus::ToDo, Some(Priority::Urgent)),
      task(3, TaskStatus::ToDo, Some(Priority::High)),
      task(4, TaskStatus::ToDo, Some(Priority::Low)),
    ];

    let distribution = priority_distribution(&tasks);
    assert_eq!(
      distribution,
      vec![
        (Some(Priority::Urgent), 2),
        (Some(Priority::High), 1),
        (Some(Priority::Low), 1)
      ]
    );
  }

  #[test]
  fn test_priority_distribution_buckets_unassigned_under_none() {
    let tasks = vec![
      task(1, TaskStatus::ToDo, None),
      task(2, TaskStatus::ToDo, Some(Priority::Medium)),
      task(3, TaskStatus::ToDo, None),
    ];
    assert_eq!(
      priority_distribution(&tasks),
      vec![(Some(Priority::Medium), 1), (None, 2)]
    );
  }

  #[test]
  fn test_project_status_counts() {
    let projects = vec![project(1, false), project(2, true)];
    let counts = project_status_counts(&projects);
    assert_eq!(counts.active, 1);
    assert_eq!(counts.completed, 1);
  }
}
