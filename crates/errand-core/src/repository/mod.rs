use std::future::Future;

use crate::error::DataNotAvailable;
use crate::task::Task;

pub mod cached;
pub mod local;
pub mod remote;
mod table;

pub use cached::CachedRepository;
pub use local::LocalTasks;
pub use remote::RemoteTasks;

pub trait TasksRepository: Send + Sync + 'static {
    fn get_task(&self, task_id: &str)
    -> impl Future<Output = Result<Task, DataNotAvailable>> + Send;

    fn get_tasks(&self) -> impl Future<Output = Result<Vec<Task>, DataNotAvailable>> + Send;

    fn save_task(&self, task: Task) -> impl Future<Output = ()> + Send;

    fn complete_task(&self, task_id: &str) -> impl Future<Output = ()> + Send;

    fn activate_task(&self, task_id: &str) -> impl Future<Output = ()> + Send;

    fn clear_completed_tasks(&self) -> impl Future<Output = ()> + Send;

    fn delete_task(&self, task_id: &str) -> impl Future<Output = ()> + Send;

    fn delete_all_tasks(&self) -> impl Future<Output = ()> + Send;

    fn refresh_tasks(&self) -> impl Future<Output = ()> + Send;
}
