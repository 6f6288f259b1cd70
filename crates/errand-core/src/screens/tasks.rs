use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScreenError;
use crate::filter::TasksFilter;
use crate::mvi::{Presenter, Screen};
use crate::navigator::Navigator;
use crate::repository::TasksRepository;
use crate::screens::require_task_id;
use crate::task::Task;

#[derive(Debug, Clone)]
pub enum TasksIntent {
    Filter(TasksFilter),
    Refresh,
    AddNewTask,
    OpenTaskDetails(Task),
    CompleteTask(Task),
    ActivateTask(Task),
    ClearCompletedTasks,
    TaskSuccessfullySaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDisplay {
    ShowTasks,
    ShowNoTasks,
    ShowNoActiveTasks,
    ShowNoCompletedTasks,
}

impl TaskDisplay {
    pub fn empty_for(filter: TasksFilter) -> Self {
        match filter {
            TasksFilter::All => Self::ShowNoTasks,
            TasksFilter::Active => Self::ShowNoActiveTasks,
            TasksFilter::Completed => Self::ShowNoCompletedTasks,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TasksMessage {
    #[default]
    None,
    TaskMarkedCompleted,
    TaskMarkedActive,
    CompletedTasksCleared,
    SuccessfullySaved,
    LoadingTasksError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksState {
    pub show_loading_indicator: bool,
    pub task_display: TaskDisplay,
    pub tasks: Vec<Task>,
    pub active_filter: TasksFilter,
    pub message: TasksMessage,
}

impl Default for TasksState {
    fn default() -> Self {
        Self {
            show_loading_indicator: false,
            task_display: TaskDisplay::ShowNoTasks,
            tasks: Vec::new(),
            active_filter: TasksFilter::All,
            message: TasksMessage::None,
        }
    }
}

pub struct TasksPresenter<R, N> {
    repository: Arc<R>,
    navigator: Arc<N>,
    screen: Screen<TasksState, TasksIntent>,
    first_load: bool,
}

impl<R, N> TasksPresenter<R, N>
where
    R: TasksRepository,
    N: Navigator,
{
    pub fn new(repository: Arc<R>, navigator: Arc<N>, message_duration: Duration) -> Self {
        Self {
            repository,
            navigator,
            screen: Screen::new(TasksState::default(), message_duration),
            first_load: true,
        }
    }

    pub fn state(&self) -> &TasksState {
        self.screen.state()
    }

    async fn load_tasks(&mut self, force_update: bool) {
        // The first load always goes to the remote source.
        let force_update = force_update || self.first_load;
        self.first_load = false;
        self.load(force_update, true).await;
    }

    async fn load(&mut self, force_update: bool, show_loading_ui: bool) {
        if show_loading_ui {
            self.screen.update_with(|state| TasksState {
                show_loading_indicator: true,
                ..state.clone()
            });
        }
        if force_update {
            self.repository.refresh_tasks().await;
        }

        match self.repository.get_tasks().await {
            Ok(tasks) => {
                let filter = self.screen.state().active_filter;
                let visible = filter.apply(&tasks);
                debug!(
                    total = tasks.len(),
                    visible = visible.len(),
                    %filter,
                    "tasks loaded"
                );
                let task_display = if visible.is_empty() {
                    TaskDisplay::empty_for(filter)
                } else {
                    TaskDisplay::ShowTasks
                };
                self.screen.update_with(|state| TasksState {
                    show_loading_indicator: false,
                    task_display,
                    tasks: visible,
                    ..state.clone()
                });
            }
            Err(err) => {
                debug!(error = %err, "tasks unavailable");
                if show_loading_ui {
                    self.screen.update_with(|state| TasksState {
                        show_loading_indicator: false,
                        ..state.clone()
                    });
                }
                self.show_message(TasksMessage::LoadingTasksError);
            }
        }
    }

    fn show_message(&mut self, message: TasksMessage) {
        self.screen.start_message_timer();
        self.screen.update_with(|state| TasksState {
            message,
            ..state.clone()
        });
    }

    async fn complete_task(&mut self, task: &Task) -> Result<(), ScreenError> {
        let task_id = require_task_id(&task.id, "complete task")?;
        self.repository.complete_task(task_id).await;
        self.load(false, false).await;
        self.show_message(TasksMessage::TaskMarkedCompleted);
        Ok(())
    }

    async fn activate_task(&mut self, task: &Task) -> Result<(), ScreenError> {
        let task_id = require_task_id(&task.id, "activate task")?;
        self.repository.activate_task(task_id).await;
        self.load(false, false).await;
        self.show_message(TasksMessage::TaskMarkedActive);
        Ok(())
    }

    async fn clear_completed_tasks(&mut self) {
        self.repository.clear_completed_tasks().await;
        self.load(false, false).await;
        self.show_message(TasksMessage::CompletedTasksCleared);
    }
}

impl<R, N> Presenter for TasksPresenter<R, N>
where
    R: TasksRepository,
    N: Navigator,
{
    type State = TasksState;
    type Intent = TasksIntent;

    const NAME: &'static str = "tasks";

    fn screen(&self) -> &Screen<TasksState, TasksIntent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<TasksState, TasksIntent> {
        &mut self.screen
    }

    async fn on_attach(&mut self) -> Result<(), ScreenError> {
        self.load_tasks(false).await;
        Ok(())
    }

    async fn on_intent(&mut self, intent: TasksIntent) -> Result<(), ScreenError> {
        match intent {
            TasksIntent::Filter(filter) => {
                self.screen.update_with(|state| TasksState {
                    active_filter: filter,
                    ..state.clone()
                });
                self.load_tasks(false).await;
            }
            TasksIntent::Refresh => self.load_tasks(true).await,
            TasksIntent::AddNewTask => self.navigator.navigate_to_add_task(),
            TasksIntent::OpenTaskDetails(task) => {
                let task_id = require_task_id(&task.id, "open task details")?;
                self.navigator.navigate_to_task_details(task_id);
            }
            TasksIntent::CompleteTask(task) => self.complete_task(&task).await?,
            TasksIntent::ActivateTask(task) => self.activate_task(&task).await?,
            TasksIntent::ClearCompletedTasks => self.clear_completed_tasks().await,
            TasksIntent::TaskSuccessfullySaved => {
                self.show_message(TasksMessage::SuccessfullySaved)
            }
        }
        Ok(())
    }

    fn on_message_expired(&mut self) {
        self.screen.update_with(|state| TasksState {
            message: TasksMessage::None,
            ..state.clone()
        });
    }
}
