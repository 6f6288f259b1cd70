use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, description)
    }

    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            completed: false,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }

    pub fn completed_copy(&self) -> Self {
        Self {
            completed: true,
            ..self.clone()
        }
    }

    pub fn activated_copy(&self) -> Self {
        Self {
            completed: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Task;

    #[test]
    fn generated_ids_are_unique_and_non_empty() {
        let a = Task::new("a", "");
        let b = Task::new("a", "");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_means_no_title_and_no_description() {
        let cases = [
            ("", "", true),
            ("title", "", false),
            ("", "description", false),
            ("title", "description", false),
        ];
        for (title, description, expected) in cases {
            let task = Task::with_id("t", title, description);
            assert_eq!(task.is_empty(), expected, "{title:?} / {description:?}");
            assert_eq!(
                task.is_empty(),
                task.title.is_empty() && task.description.is_empty()
            );
        }
    }

    #[test]
    fn active_is_negation_of_completed() {
        let task = Task::new("title", "description");
        assert!(task.is_active());
        assert!(!task.is_completed());

        let done = task.completed_copy();
        assert!(done.is_completed());
        assert!(!done.is_active());
        assert_eq!(done.id, task.id);

        let reopened = done.activated_copy();
        assert!(reopened.is_active());
        assert!(task.is_active(), "copied-from value is untouched");
    }

    #[test]
    fn display_title_falls_back_to_description() {
        assert_eq!(Task::with_id("1", "Title", "Desc").display_title(), "Title");
        assert_eq!(Task::with_id("2", "", "Desc").display_title(), "Desc");
        assert_eq!(Task::with_id("3", "", "").display_title(), "");
    }
}
