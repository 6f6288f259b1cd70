pub mod add_edit_task;
pub mod statistics;
pub mod task_detail;
pub mod tasks;

pub use add_edit_task::{AddEditTaskIntent, AddEditTaskPresenter, AddEditTaskState};
pub use statistics::{StatisticsIntent, StatisticsPresenter, StatisticsState};
pub use task_detail::{TaskDetailIntent, TaskDetailMessage, TaskDetailPresenter, TaskDetailState};
pub use tasks::{TaskDisplay, TasksIntent, TasksMessage, TasksPresenter, TasksState};

use crate::error::ScreenError;

fn require_task_id<'a>(task_id: &'a str, operation: &'static str) -> Result<&'a str, ScreenError> {
    if task_id.is_empty() {
        Err(ScreenError::missing_task_id(operation))
    } else {
        Ok(task_id)
    }
}
