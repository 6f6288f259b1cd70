use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScreenError;
use crate::mvi::{Presenter, Screen};
use crate::navigator::Navigator;
use crate::repository::TasksRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDetailIntent {
    EditTask,
    DeleteTask,
    CompleteTask,
    ActivateTask,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDetailMessage {
    #[default]
    None,
    TaskMarkedCompleted,
    TaskMarkedActive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetailState {
    pub show_loading_indicator: bool,
    pub task_missing: bool,
    pub title: String,
    pub description: String,
    pub completion_status: bool,
    pub message: TaskDetailMessage,
}

pub struct TaskDetailPresenter<R, N> {
    task_id: String,
    repository: Arc<R>,
    navigator: Arc<N>,
    screen: Screen<TaskDetailState, TaskDetailIntent>,
}

impl<R, N> TaskDetailPresenter<R, N>
where
    R: TasksRepository,
    N: Navigator,
{
    pub fn new(
        task_id: impl Into<String>,
        repository: Arc<R>,
        navigator: Arc<N>,
        message_duration: Duration,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            repository,
            navigator,
            screen: Screen::new(TaskDetailState::default(), message_duration),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> &TaskDetailState {
        self.screen.state()
    }

    async fn open_task(&mut self) {
        if self.task_id.is_empty() {
            self.mark_missing();
            return;
        }

        self.screen.update_with(|state| TaskDetailState {
            show_loading_indicator: true,
            ..state.clone()
        });
        match self.repository.get_task(&self.task_id).await {
            Ok(task) => {
                debug!(task_id = %task.id, completed = task.completed, "task loaded");
                self.screen.update_with(|state| TaskDetailState {
                    show_loading_indicator: false,
                    task_missing: false,
                    title: task.title.clone(),
                    description: task.description.clone(),
                    completion_status: task.completed,
                    ..state.clone()
                });
            }
            Err(err) => {
                debug!(task_id = %self.task_id, error = %err, "task missing");
                self.screen.update_with(|state| TaskDetailState {
                    show_loading_indicator: false,
                    task_missing: true,
                    title: String::new(),
                    description: String::new(),
                    ..state.clone()
                });
            }
        }
    }

    fn mark_missing(&mut self) {
        self.screen.update_with(|state| TaskDetailState {
            task_missing: true,
            ..state.clone()
        });
    }

    // An empty id renders the missing placeholder before refusing.
    fn require_id(&mut self, operation: &'static str) -> Result<String, ScreenError> {
        if self.task_id.is_empty() {
            self.mark_missing();
            return Err(ScreenError::missing_task_id(operation));
        }
        Ok(self.task_id.clone())
    }

    fn set_completion(&mut self, completed: bool, message: TaskDetailMessage) {
        self.screen.update_with(|state| TaskDetailState {
            completion_status: completed,
            ..state.clone()
        });
        self.screen.start_message_timer();
        self.screen.update_with(|state| TaskDetailState {
            message,
            ..state.clone()
        });
    }
}

impl<R, N> Presenter for TaskDetailPresenter<R, N>
where
    R: TasksRepository,
    N: Navigator,
{
    type State = TaskDetailState;
    type Intent = TaskDetailIntent;

    const NAME: &'static str = "task_detail";

    fn screen(&self) -> &Screen<TaskDetailState, TaskDetailIntent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<TaskDetailState, TaskDetailIntent> {
        &mut self.screen
    }

    async fn on_attach(&mut self) -> Result<(), ScreenError> {
        self.open_task().await;
        Ok(())
    }

    async fn on_intent(&mut self, intent: TaskDetailIntent) -> Result<(), ScreenError> {
        match intent {
            TaskDetailIntent::EditTask => {
                let task_id = self.require_id("edit task")?;
                self.navigator.navigate_to_edit_task(&task_id);
            }
            TaskDetailIntent::DeleteTask => {
                let task_id = self.require_id("delete task")?;
                self.repository.delete_task(&task_id).await;
                self.navigator.go_back();
            }
            TaskDetailIntent::CompleteTask => {
                let task_id = self.require_id("complete task")?;
                self.repository.complete_task(&task_id).await;
                self.set_completion(true, TaskDetailMessage::TaskMarkedCompleted);
            }
            TaskDetailIntent::ActivateTask => {
                let task_id = self.require_id("activate task")?;
                self.repository.activate_task(&task_id).await;
                self.set_completion(false, TaskDetailMessage::TaskMarkedActive);
            }
        }
        Ok(())
    }

    fn on_message_expired(&mut self) {
        self.screen.update_with(|state| TaskDetailState {
            message: TaskDetailMessage::None,
            ..state.clone()
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{TaskDetailIntent, TaskDetailMessage, TaskDetailPresenter, TaskDetailState};
    use crate::error::ScreenError;
    use crate::mvi::{DEFAULT_MESSAGE_DURATION, attach};
    use crate::navigator::Navigation;
    use crate::task::Task;
    use crate::testing::{FakeRepository, RecordingNavigator, RecordingView, RepoCall};

    type View = RecordingView<TaskDetailState, TaskDetailIntent>;

    fn presenter(
        task_id: &str,
        repository: &Arc<FakeRepository>,
        navigator: &Arc<RecordingNavigator>,
    ) -> TaskDetailPresenter<FakeRepository, RecordingNavigator> {
        TaskDetailPresenter::new(
            task_id,
            Arc::clone(repository),
            Arc::clone(navigator),
            DEFAULT_MESSAGE_DURATION,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn attach_loads_active_task() {
        let task = Task::new("Details Requested", "For this task");
        let repository = FakeRepository::with_tasks(vec![task.clone()]);
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();

        let attachment = attach(presenter(&task.id, &repository, &navigator), view.clone());
        view.intents.settled().await;

        let renders = view.renders();
        assert!(renders.iter().any(|state| state.show_loading_indicator));
        let last = view.last().expect("rendered");
        assert!(!last.show_loading_indicator);
        assert!(!last.task_missing);
        assert_eq!(last.title, "Details Requested");
        assert_eq!(last.description, "For this task");
        assert!(!last.completion_status);
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn attach_loads_completed_task() {
        let task = Task::new("Done", "already").completed_copy();
        let repository = FakeRepository::with_tasks(vec![task.clone()]);
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();

        let attachment = attach(presenter(&task.id, &repository, &navigator), view.clone());
        view.intents.settled().await;

        assert_eq!(view.last().map(|state| state.completion_status), Some(true));
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_task_renders_missing() {
        let repository = FakeRepository::with_tasks(Vec::new());
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();

        let attachment = attach(presenter("nope", &repository, &navigator), view.clone());
        view.intents.settled().await;

        let last = view.last().expect("rendered");
        assert!(last.task_missing);
        assert!(!last.show_loading_indicator);
        assert!(last.title.is_empty());
        assert!(last.description.is_empty());
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_id_renders_missing_without_repository_call() {
        let repository = FakeRepository::with_tasks(Vec::new());
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();

        let attachment = attach(presenter("", &repository, &navigator), view.clone());
        view.intents.settled().await;

        assert_eq!(view.last().map(|state| state.task_missing), Some(true));
        assert!(repository.calls().is_empty());
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn every_intent_with_empty_id_is_refused() {
        let repository = FakeRepository::with_tasks(Vec::new());
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();
        let attachment = attach(presenter("", &repository, &navigator), view.clone());

        view.intents.publish(TaskDetailIntent::EditTask);
        view.intents.publish(TaskDetailIntent::DeleteTask);
        view.intents.publish(TaskDetailIntent::CompleteTask);
        view.intents.publish(TaskDetailIntent::ActivateTask);
        view.intents.settled().await;

        assert_eq!(
            view.errors(),
            vec![
                ScreenError::missing_task_id("edit task"),
                ScreenError::missing_task_id("delete task"),
                ScreenError::missing_task_id("complete task"),
                ScreenError::missing_task_id("activate task"),
            ]
        );
        assert!(repository.calls().is_empty());
        assert!(navigator.calls().is_empty());
        assert_eq!(view.last().map(|state| state.task_missing), Some(true));
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn edit_and_delete_navigate() {
        let task = Task::new("Edit", "me");
        let repository = FakeRepository::with_tasks(vec![task.clone()]);
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();
        let attachment = attach(presenter(&task.id, &repository, &navigator), view.clone());

        view.intents.publish(TaskDetailIntent::EditTask);
        view.intents.publish(TaskDetailIntent::DeleteTask);
        view.intents.settled().await;

        assert_eq!(
            navigator.calls(),
            vec![Navigation::EditTask(task.id.clone()), Navigation::Back]
        );
        assert!(repository.calls().contains(&RepoCall::Delete(task.id.clone())));
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn complete_then_activate_flip_status_and_message() {
        let task = Task::new("Flip", "me");
        let repository = FakeRepository::with_tasks(vec![task.clone()]);
        let navigator = RecordingNavigator::new();
        let (view, _renders) = View::new();
        let attachment = attach(presenter(&task.id, &repository, &navigator), view.clone());

        view.intents.publish(TaskDetailIntent::CompleteTask);
        view.intents.settled().await;
        let last = view.last().expect("rendered");
        assert!(last.completion_status);
        assert_eq!(last.message, TaskDetailMessage::TaskMarkedCompleted);

        view.intents.publish(TaskDetailIntent::ActivateTask);
        view.intents.settled().await;
        let last = view.last().expect("rendered");
        assert!(!last.completion_status);
        assert_eq!(last.message, TaskDetailMessage::TaskMarkedActive);

        assert!(repository.calls().contains(&RepoCall::Complete(task.id.clone())));
        assert!(repository.calls().contains(&RepoCall::Activate(task.id.clone())));

        tokio::time::sleep(DEFAULT_MESSAGE_DURATION + Duration::from_millis(1)).await;
        assert_eq!(
            view.last().map(|state| state.message),
            Some(TaskDetailMessage::None)
        );
        attachment.detach().await.expect("detach");
    }
}
