use crate::task::Task;

// Insertion-ordered task table keyed by id.
#[derive(Debug, Clone, Default)]
pub(crate) struct TaskTable {
    rows: Vec<Task>,
}

impl TaskTable {
    pub(crate) fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut table = Self::default();
        for task in tasks {
            table.upsert(task);
        }
        table
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn all(&self) -> Vec<Task> {
        self.rows.clone()
    }

    pub(crate) fn get(&self, task_id: &str) -> Option<Task> {
        self.rows.iter().find(|task| task.id == task_id).cloned()
    }

    pub(crate) fn upsert(&mut self, task: Task) {
        match self.rows.iter_mut().find(|row| row.id == task.id) {
            Some(row) => *row = task,
            None => self.rows.push(task),
        }
    }

    pub(crate) fn set_completed(&mut self, task_id: &str, completed: bool) -> bool {
        match self.rows.iter_mut().find(|row| row.id == task_id) {
            Some(row) => {
                *row = if completed {
                    row.completed_copy()
                } else {
                    row.activated_copy()
                };
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, task_id: &str) -> Option<Task> {
        let idx = self.rows.iter().position(|row| row.id == task_id)?;
        Some(self.rows.remove(idx))
    }

    pub(crate) fn retain_active(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(Task::is_active);
        before - self.rows.len()
    }

    pub(crate) fn replace_all(&mut self, tasks: &[Task]) {
        *self = Self::from_tasks(tasks.iter().cloned());
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::TaskTable;
    use crate::task::Task;

    #[test]
    fn upsert_replaces_in_place_and_keeps_order() {
        let mut table = TaskTable::from_tasks([
            Task::with_id("a", "A", ""),
            Task::with_id("b", "B", ""),
        ]);
        table.upsert(Task::with_id("a", "A2", ""));
        table.upsert(Task::with_id("c", "C", ""));

        let titles: Vec<String> = table.all().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["A2", "B", "C"]);
    }

    #[test]
    fn retain_active_drops_completed_rows() {
        let mut table = TaskTable::from_tasks([
            Task::with_id("a", "A", "").completed_copy(),
            Task::with_id("b", "B", ""),
        ]);
        assert!(table.set_completed("b", false));
        assert!(!table.set_completed("missing", true));
        assert_eq!(table.retain_active(), 1);
        assert_eq!(table.len(), 1);
        assert!(table.get("a").is_none());
        assert!(table.remove("b").is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn set_completed_toggles_only_the_flag() {
        let mut table = TaskTable::from_tasks([
            Task::with_id("a", "A", "first"),
            Task::with_id("b", "B", "second"),
        ]);

        assert!(table.set_completed("a", true));
        let done = table.get("a").expect("row a");
        assert!(done.completed);
        assert_eq!((done.title.as_str(), done.description.as_str()), ("A", "first"));

        assert!(table.set_completed("a", false));
        assert!(table.get("a").expect("row a").is_active());

        let ids: Vec<String> = table.all().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
