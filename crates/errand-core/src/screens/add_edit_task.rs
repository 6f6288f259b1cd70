use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScreenError;
use crate::mvi::{Presenter, Screen};
use crate::navigator::Navigator;
use crate::repository::TasksRepository;
use crate::screens::require_task_id;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddEditTaskIntent {
    TitleChanged(String),
    DescriptionChanged(String),
    SaveTask,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEditTaskState {
    pub show_empty_task_error: bool,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditTarget {
    New,
    Existing(String),
}

pub struct AddEditTaskPresenter<R, N> {
    target: EditTarget,
    // Completion flag of the loaded task, kept so an edit does not reopen it.
    completed: bool,
    repository: Arc<R>,
    navigator: Arc<N>,
    screen: Screen<AddEditTaskState, AddEditTaskIntent>,
}

impl<R, N> AddEditTaskPresenter<R, N>
where
    R: TasksRepository,
    N: Navigator,
{
    pub fn new(
        task_id: Option<String>,
        repository: Arc<R>,
        navigator: Arc<N>,
        message_duration: Duration,
    ) -> Self {
        let target = match task_id {
            Some(task_id) => EditTarget::Existing(task_id),
            None => EditTarget::New,
        };
        Self {
            target,
            completed: false,
            repository,
            navigator,
            screen: Screen::new(AddEditTaskState::default(), message_duration),
        }
    }

    pub fn is_new_task(&self) -> bool {
        self.target == EditTarget::New
    }

    pub fn task_id(&self) -> Option<&str> {
        match &self.target {
            EditTarget::New => None,
            EditTarget::Existing(task_id) => Some(task_id),
        }
    }

    pub fn state(&self) -> &AddEditTaskState {
        self.screen.state()
    }

    fn is_data_missing(&self) -> bool {
        let state = self.screen.state();
        state.title.is_empty() && state.description.is_empty()
    }

    async fn populate_task(&mut self, task_id: &str) {
        match self.repository.get_task(task_id).await {
            Ok(task) => {
                debug!(task_id, "task populated");
                self.completed = task.completed;
                self.screen.update_with(|state| AddEditTaskState {
                    title: task.title.clone(),
                    description: task.description.clone(),
                    ..state.clone()
                });
            }
            Err(err) => {
                debug!(task_id, error = %err, "task to edit not available");
                self.show_empty_task_error();
            }
        }
    }

    async fn save_task(&mut self) -> Result<(), ScreenError> {
        let (title, description) = {
            let state = self.screen.state();
            (state.title.clone(), state.description.clone())
        };
        let task = match &self.target {
            EditTarget::New => Task::new(title, description),
            EditTarget::Existing(task_id) => {
                let task_id = require_task_id(task_id, "update task")?;
                Task {
                    id: task_id.to_string(),
                    title,
                    description,
                    completed: self.completed,
                }
            }
        };

        if task.is_empty() {
            self.show_empty_task_error();
            return Ok(());
        }

        info!(task_id = %task.id, new = self.is_new_task(), "saving task");
        self.repository.save_task(task).await;
        self.navigator.return_success();
        Ok(())
    }

    fn show_empty_task_error(&mut self) {
        self.screen.start_message_timer();
        self.screen.update_with(|state| AddEditTaskState {
            show_empty_task_error: true,
            ..state.clone()
        });
    }
}

impl<R, N> Presenter for AddEditTaskPresenter<R, N>
where
    R: TasksRepository,
    N: Navigator,
{
    type State = AddEditTaskState;
    type Intent = AddEditTaskIntent;

    const NAME: &'static str = "add_edit_task";

    fn screen(&self) -> &Screen<AddEditTaskState, AddEditTaskIntent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<AddEditTaskState, AddEditTaskIntent> {
        &mut self.screen
    }

    async fn on_attach(&mut self) -> Result<(), ScreenError> {
        let EditTarget::Existing(task_id) = &self.target else {
            return Ok(());
        };
        if !self.is_data_missing() {
            return Ok(());
        }
        let task_id = require_task_id(task_id, "populate task")?.to_string();
        self.populate_task(&task_id).await;
        Ok(())
    }

    async fn on_intent(&mut self, intent: AddEditTaskIntent) -> Result<(), ScreenError> {
        match intent {
            AddEditTaskIntent::TitleChanged(title) => {
                let next = AddEditTaskState {
                    title,
                    ..self.screen.state().clone()
                };
                self.screen.update_silently(next);
            }
            AddEditTaskIntent::DescriptionChanged(description) => {
                let next = AddEditTaskState {
                    description,
                    ..self.screen.state().clone()
                };
                self.screen.update_silently(next);
            }
            AddEditTaskIntent::SaveTask => self.save_task().await?,
        }
        Ok(())
    }

    fn on_message_expired(&mut self) {
        self.screen.update_with(|state| AddEditTaskState {
            show_empty_task_error: false,
            ..state.clone()
        });
    }
}
