use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{DataNotAvailable, ScreenError};
use crate::mvi::{Intents, MviView};
use crate::navigator::{Navigation, Navigator};
use crate::repository::TasksRepository;
use crate::task::Task;

pub struct RecordingView<S, I> {
    pub intents: Intents<I>,
    renders: Mutex<Vec<S>>,
    errors: Mutex<Vec<ScreenError>>,
    sender: mpsc::UnboundedSender<S>,
}

impl<S: Clone, I: Send + 'static> RecordingView<S, I> {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<S>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let view = Self {
            intents: Intents::new(),
            renders: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            sender,
        };
        (Arc::new(view), receiver)
    }

    pub fn renders(&self) -> Vec<S> {
        self.renders.lock().clone()
    }

    pub fn last(&self) -> Option<S> {
        self.renders.lock().last().cloned()
    }

    pub fn errors(&self) -> Vec<ScreenError> {
        self.errors.lock().clone()
    }
}

impl<S, I> MviView for RecordingView<S, I>
where
    S: Clone + Send + Sync,
    I: Send,
{
    type State = S;
    type Intent = I;

    fn intents(&self) -> &Intents<I> {
        &self.intents
    }

    fn render(&self, state: &S) {
        self.renders.lock().push(state.clone());
        let _ = self.sender.send(state.clone());
    }

    fn report_error(&self, error: &ScreenError) {
        self.errors.lock().push(error.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    GetTask(String),
    GetTasks,
    Save(Task),
    Complete(String),
    Activate(String),
    ClearCompleted,
    Delete(String),
    DeleteAll,
    Refresh,
}

#[derive(Debug, Default)]
pub struct FakeRepository {
    tasks: Mutex<Option<Vec<Task>>>,
    calls: Mutex<Vec<RepoCall>>,
}

impl FakeRepository {
    pub fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(Some(tasks)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().clone()
    }

    pub fn saved(&self) -> Vec<Task> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RepoCall::Save(task) => Some(task),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RepoCall) {
        self.calls.lock().push(call);
    }
}

impl TasksRepository for FakeRepository {
    async fn get_task(&self, task_id: &str) -> Result<Task, DataNotAvailable> {
        self.record(RepoCall::GetTask(task_id.to_string()));
        self.tasks
            .lock()
            .as_ref()
            .and_then(|tasks| tasks.iter().find(|task| task.id == task_id).cloned())
            .ok_or(DataNotAvailable)
    }

    async fn get_tasks(&self) -> Result<Vec<Task>, DataNotAvailable> {
        self.record(RepoCall::GetTasks);
        self.tasks.lock().clone().ok_or(DataNotAvailable)
    }

    async fn save_task(&self, task: Task) {
        self.record(RepoCall::Save(task));
    }

    async fn complete_task(&self, task_id: &str) {
        self.record(RepoCall::Complete(task_id.to_string()));
    }

    async fn activate_task(&self, task_id: &str) {
        self.record(RepoCall::Activate(task_id.to_string()));
    }

    async fn clear_completed_tasks(&self) {
        self.record(RepoCall::ClearCompleted);
    }

    async fn delete_task(&self, task_id: &str) {
        self.record(RepoCall::Delete(task_id.to_string()));
    }

    async fn delete_all_tasks(&self) {
        self.record(RepoCall::DeleteAll);
    }

    async fn refresh_tasks(&self) {
        self.record(RepoCall::Refresh);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Navigation> {
        self.calls.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to_add_task(&self) {
        self.calls.lock().push(Navigation::AddTask);
    }

    fn navigate_to_edit_task(&self, task_id: &str) {
        self.calls.lock().push(Navigation::EditTask(task_id.to_string()));
    }

    fn navigate_to_task_details(&self, task_id: &str) {
        self.calls
            .lock()
            .push(Navigation::TaskDetails(task_id.to_string()));
    }

    fn go_back(&self) {
        self.calls.lock().push(Navigation::Back);
    }

    fn return_success(&self) {
        self.calls.lock().push(Navigation::Success);
    }
}
