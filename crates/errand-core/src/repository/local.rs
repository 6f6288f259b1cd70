use parking_lot::Mutex;
use tracing::debug;

use crate::error::DataNotAvailable;
use crate::repository::TasksRepository;
use crate::repository::table::TaskTable;
use crate::task::Task;

#[derive(Debug, Default)]
pub struct LocalTasks {
    table: Mutex<TaskTable>,
}

impl LocalTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            table: Mutex::new(TaskTable::from_tasks(tasks)),
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl TasksRepository for LocalTasks {
    #[tracing::instrument(skip(self))]
    async fn get_task(&self, task_id: &str) -> Result<Task, DataNotAvailable> {
        self.table.lock().get(task_id).ok_or(DataNotAvailable)
    }

    #[tracing::instrument(skip(self))]
    async fn get_tasks(&self) -> Result<Vec<Task>, DataNotAvailable> {
        let table = self.table.lock();
        if table.is_empty() {
            debug!("local table is empty");
            return Err(DataNotAvailable);
        }
        Ok(table.all())
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
        let removed = self.table.lock().retain_active();
        debug!(removed, "cleared completed tasks");
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, task_id: &str) {
        self.table.lock().remove(task_id);
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all_tasks(&self) {
        self.table.lock().clear();
    }

    async fn refresh_tasks(&self) {}
}
