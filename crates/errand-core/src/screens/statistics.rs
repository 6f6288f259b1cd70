use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScreenError;
use crate::mvi::{DEFAULT_MESSAGE_DURATION, Presenter, Screen};
use crate::repository::TasksRepository;

// The statistics screen only reacts to being attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsIntent {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsState {
    pub show_progress_indicator: bool,
    pub active_count: usize,
    pub completed_count: usize,
    pub show_loading_error: bool,
}

pub struct StatisticsPresenter<R> {
    repository: Arc<R>,
    screen: Screen<StatisticsState, StatisticsIntent>,
}

impl<R: TasksRepository> StatisticsPresenter<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            screen: Screen::new(StatisticsState::default(), DEFAULT_MESSAGE_DURATION),
        }
    }

    pub fn state(&self) -> &StatisticsState {
        self.screen.state()
    }

    async fn load_statistics(&mut self) {
        self.screen.update_with(|state| StatisticsState {
            show_progress_indicator: true,
            ..state.clone()
        });

        match self.repository.get_tasks().await {
            Ok(tasks) => {
                let completed_count = tasks.iter().filter(|task| task.is_completed()).count();
                let active_count = tasks.len() - completed_count;
                debug!(active_count, completed_count, "statistics computed");
                self.screen.update_with(|state| StatisticsState {
                    show_progress_indicator: false,
                    active_count,
                    completed_count,
                    ..state.clone()
                });
            }
            Err(err) => {
                debug!(error = %err, "statistics unavailable");
                self.screen.update_with(|state| StatisticsState {
                    show_progress_indicator: false,
                    show_loading_error: true,
                    ..state.clone()
                });
            }
        }
    }
}

impl<R: TasksRepository> Presenter for StatisticsPresenter<R> {
    type State = StatisticsState;
    type Intent = StatisticsIntent;

    const NAME: &'static str = "statistics";

    fn screen(&self) -> &Screen<StatisticsState, StatisticsIntent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<StatisticsState, StatisticsIntent> {
        &mut self.screen
    }

    async fn on_attach(&mut self) -> Result<(), ScreenError> {
        self.load_statistics().await;
        Ok(())
    }

    async fn on_intent(&mut self, intent: StatisticsIntent) -> Result<(), ScreenError> {
        match intent {}
    }

    fn on_message_expired(&mut self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{StatisticsIntent, StatisticsPresenter, StatisticsState};
    use crate::mvi::attach;
    use crate::task::Task;
    use crate::testing::{FakeRepository, RecordingView, RepoCall};

    type View = RecordingView<StatisticsState, StatisticsIntent>;

    #[tokio::test(start_paused = true)]
    async fn counts_active_and_completed() {
        let repository = FakeRepository::with_tasks(vec![
            Task::new("one", ""),
            Task::new("two", "").completed_copy(),
            Task::new("three", "").completed_copy(),
        ]);
        let (view, _renders) = View::new();

        let attachment = attach(StatisticsPresenter::new(Arc::clone(&repository)), view.clone());
        view.intents.settled().await;

        assert!(view.renders().iter().any(|s| s.show_progress_indicator));
        assert_eq!(
            view.last(),
            Some(StatisticsState {
                show_progress_indicator: false,
                active_count: 1,
                completed_count: 2,
                show_loading_error: false,
            })
        );
        assert_eq!(repository.calls(), vec![RepoCall::GetTasks]);
        attachment.detach().await.expect("detach");
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_tasks_show_loading_error() {
        let repository = FakeRepository::unavailable();
        let (view, _renders) = View::new();

        let attachment = attach(StatisticsPresenter::new(repository), view.clone());
        view.intents.settled().await;

        let last = view.last().expect("rendered");
        assert!(last.show_loading_error);
        assert!(!last.show_progress_indicator);
        attachment.detach().await.expect("detach");
    }
}
