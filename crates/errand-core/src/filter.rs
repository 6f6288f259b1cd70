use anyhow::anyhow;
use serde::{
  Deserialize,
  Serialize
};

use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TasksFilter {
  #[default]
  All,
  Active,
  Completed
}

impl TasksFilter {
  pub const NAMES: [&'static str; 3] =
    ["all", "active", "completed"];

  pub fn name(self) -> &'static str {
    match self {
      | Self::All => "all",
      | Self::Active => "active",
      | Self::Completed => "completed"
    }
  }

  pub fn matches(
    self,
    task: &Task
  ) -> bool {
    match self {
      | Self::All => true,
      | Self::Active => task.is_active(),
      | Self::Completed => {
        task.is_completed()
      }
    }
  }

  pub fn apply(
    self,
    tasks: &[Task]
  ) -> Vec<Task> {
    tasks
      .iter()
      .filter(|task| self.matches(task))
      .cloned()
      .collect()
  }
}

impl std::fmt::Display for TasksFilter {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>
  ) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl std::str::FromStr for TasksFilter {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let token =
      s.trim().to_ascii_lowercase();
    if token.is_empty() {
      return Err(anyhow!(
        "filter name cannot be empty"
      ));
    }

    let mut matches = Self::NAMES
      .iter()
      .filter(|name| {
        name.starts_with(&token)
      });
    let first =
      matches.next().ok_or_else(|| {
        anyhow!(
          "unknown filter: {s} \
           (expected all, active or \
           completed)"
        )
      })?;
    if matches.next().is_some() {
      return Err(anyhow!(
        "ambiguous filter: {s}"
      ));
    }

    Ok(match *first {
      | "active" => Self::Active,
      | "completed" => Self::Completed,
      | _ => Self::All
    })
  }
}

#[cfg(test)]
mod tests {
  use super::TasksFilter;
  use crate::task::Task;

  fn sample() -> Vec<Task> {
    vec![
      Task::with_id("1", "Title1", "Description1"),
      Task::with_id("2", "Title2", "Description2")
        .completed_copy(),
      Task::with_id("3", "Title3", "Description3")
        .completed_copy(),
    ]
  }

  #[test]
  fn apply_keeps_order_and_selects_by_completion()
  {
    let tasks = sample();

    assert_eq!(
      TasksFilter::All.apply(&tasks).len(),
      3
    );

    let active =
      TasksFilter::Active.apply(&tasks);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "1");

    let completed =
      TasksFilter::Completed.apply(&tasks);
    let ids: Vec<&str> = completed
      .iter()
      .map(|task| task.id.as_str())
      .collect();
    assert_eq!(ids, vec!["2", "3"]);
  }

  #[test]
  fn parses_full_names_and_prefixes() {
    assert_eq!(
      "all".parse::<TasksFilter>().ok(),
      Some(TasksFilter::All)
    );
    assert_eq!(
      "ACT".parse::<TasksFilter>().ok(),
      Some(TasksFilter::Active)
    );
    assert_eq!(
      "c".parse::<TasksFilter>().ok(),
      Some(TasksFilter::Completed)
    );
    assert!(
      "a".parse::<TasksFilter>().is_err(),
      "a is ambiguous between all and active"
    );
    assert!(
      "done".parse::<TasksFilter>().is_err()
    );
    assert!(
      "  ".parse::<TasksFilter>().is_err()
    );
  }
}
