use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::DataNotAvailable;
use crate::repository::TasksRepository;
use crate::repository::table::TaskTable;
use crate::task::Task;

// Stand-in for a network service: an in-memory map whose reads are delayed.
#[derive(Debug)]
pub struct RemoteTasks {
    table: Mutex<TaskTable>,
    latency: Duration,
}

impl RemoteTasks {
    pub fn new(latency: Duration) -> Self {
        Self {
            table: Mutex::new(TaskTable::default()),
            latency,
        }
    }

    pub fn seeded(latency: Duration) -> Self {
        Self {
            table: Mutex::new(TaskTable::from_tasks(demo_tasks())),
            latency,
        }
    }

    pub fn with_tasks(latency: Duration, tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            table: Mutex::new(TaskTable::from_tasks(tasks)),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            debug!(latency_ms = self.latency.as_millis() as u64, "simulating remote latency");
            tokio::time::sleep(self.latency).await;
        }
    }
}

pub fn demo_tasks() -> Vec<Task> {
    vec![
        Task::new(
            "Build tower in Pisa",
            "Ground looks good, no foundation work required.",
        ),
        Task::new(
            "Finish bridge in Tacoma",
            "Found awesome girders at half the cost!",
        ),
    ]
}

impl TasksRepository for RemoteTasks {
    #[tracing::instrument(skip(self))]
    async fn get_task(&self, task_id: &str) -> Result<Task, DataNotAvailable> {
        self.simulate_latency().await;
        self.table.lock().get(task_id).ok_or(DataNotAvailable)
    }

    #[tracing::instrument(skip(self))]
    async fn get_tasks(&self) -> Result<Vec<Task>, DataNotAvailable> {
        self.simulate_latency().await;
        Ok(self.table.lock().all())
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    async fn save_task(&self, task: Task) {
        self.table.lock().upsert(task);
    }

    #[tracing::instrument(skip(self))]
    async fn complete_task(&self, task_id: &str) {
        self.table.lock().set_completed(task_id, true);
    }

    #[tracing::instrument(skip(self))]
    async fn activate_task(&self, task_id: &str) {
        self.table.lock().set_completed(task_id, false);
    }

    #[tracing::instrument(skip(self))]
    async fn clear_completed_tasks(&self) {
        self.table.lock().retain_active();
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, task_id: &str) {
        self.table.lock().remove(task_id);
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all_tasks(&self) {
        self.table.lock().clear();
    }

    // Always fresh.
    async fn refresh_tasks(&self) {}
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::RemoteTasks;
    use crate::repository::TasksRepository;

    #[tokio::test(start_paused = true)]
    async fn reads_wait_for_the_configured_latency() {
        let remote = RemoteTasks::seeded(Duration::from_millis(5000));
        let started = Instant::now();

        let tasks = remote.get_tasks().await.expect("seeded tasks");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Build tower in Pisa");
        assert!(started.elapsed() >= Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_remote_still_answers_with_a_list() {
        let remote = RemoteTasks::new(Duration::ZERO);
        assert_eq!(remote.get_tasks().await.map(|t| t.len()), Ok(0));
        assert!(remote.get_task("missing").await.is_err());
    }
}
