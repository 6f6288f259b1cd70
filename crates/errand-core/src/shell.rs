use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::ScreenError;
use crate::filter::TasksFilter;
use crate::mvi::{Attachment, Intents, MviView, ViewRef, attach};
use crate::navigator::{ChannelNavigator, Navigation};
use crate::render::{Renderer, ScreenState};
use crate::repository::{CachedRepository, LocalTasks, RemoteTasks};
use crate::screens::{
    AddEditTaskIntent, AddEditTaskPresenter, AddEditTaskState, StatisticsIntent,
    StatisticsPresenter, StatisticsState, TaskDetailIntent, TaskDetailPresenter, TaskDetailState,
    TasksIntent, TasksPresenter, TasksState,
};
use crate::task::Task;

type Repo = CachedRepository<LocalTasks, RemoteTasks>;
type TasksScreen = TasksPresenter<Repo, ChannelNavigator>;
type TaskDetailScreen = TaskDetailPresenter<Repo, ChannelNavigator>;
type AddEditTaskScreen = AddEditTaskPresenter<Repo, ChannelNavigator>;
type StatisticsScreen = StatisticsPresenter<Repo>;

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

const TASKS_COMMANDS: &[&str] = &[
    "filter", "refresh", "add", "open", "done", "activate", "clear", "stats", "help", "quit",
];
const TASK_DETAIL_COMMANDS: &[&str] = &["edit", "delete", "done", "activate", "back", "help", "quit"];
const ADD_EDIT_TASK_COMMANDS: &[&str] = &["title", "desc", "save", "back", "help", "quit"];
const STATISTICS_COMMANDS: &[&str] = &["back", "help", "quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Tasks,
    TaskDetail(String),
    AddEditTask(Option<String>),
    Statistics,
}

impl Route {
    fn commands(&self) -> &'static [&'static str] {
        match self {
            Self::Tasks => TASKS_COMMANDS,
            Self::TaskDetail(_) => TASK_DETAIL_COMMANDS,
            Self::AddEditTask(_) => ADD_EDIT_TASK_COMMANDS,
            Self::Statistics => STATISTICS_COMMANDS,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tasks => f.write_str("tasks"),
            Self::TaskDetail(_) => f.write_str("detail"),
            Self::AddEditTask(None) => f.write_str("add"),
            Self::AddEditTask(Some(_)) => f.write_str("edit"),
            Self::Statistics => f.write_str("stats"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// Draws each new state once; identical consecutive states are skipped.
pub struct TerminalView<S, I> {
    intents: Intents<I>,
    renderer: Renderer,
    out: Output,
    last: Mutex<Option<S>>,
}

impl<S, I> TerminalView<S, I>
where
    S: Clone,
    I: Send + 'static,
{
    fn new(renderer: Renderer, out: Output) -> Arc<Self> {
        Arc::new(Self {
            intents: Intents::new(),
            renderer,
            out,
            last: Mutex::new(None),
        })
    }

    pub fn last_state(&self) -> Option<S> {
        self.last.lock().clone()
    }

    fn forget(&self) {
        self.last.lock().take();
    }
}

impl<S, I> MviView for TerminalView<S, I>
where
    S: ScreenState + Clone + PartialEq + Send + Sync,
    I: Send,
{
    type State = S;
    type Intent = I;

    fn intents(&self) -> &Intents<I> {
        &self.intents
    }

    fn render(&self, state: &S) {
        let mut last = self.last.lock();
        if last.as_ref() == Some(state) {
            trace!(screen = S::SCREEN, "state unchanged; not redrawn");
            return;
        }

        let mut out = self.out.lock();
        let written = self
            .renderer
            .write_state(&mut **out, state)
            .and_then(|()| out.flush().context("failed to flush output"));
        if let Err(err) = written {
            warn!(screen = S::SCREEN, error = %err, "failed to draw screen");
        }
        *last = Some(state.clone());
    }

    fn report_error(&self, error: &ScreenError) {
        let mut out = self.out.lock();
        if let Err(err) = self.renderer.write_error(&mut **out, error) {
            warn!(screen = S::SCREEN, error = %err, "failed to print screen error");
        }
    }
}

struct Views {
    tasks: Arc<TerminalView<TasksState, TasksIntent>>,
    task_detail: Arc<TerminalView<TaskDetailState, TaskDetailIntent>>,
    add_edit_task: Arc<TerminalView<AddEditTaskState, AddEditTaskIntent>>,
    statistics: Arc<TerminalView<StatisticsState, StatisticsIntent>>,
}

enum Active {
    Tasks(Attachment<TasksScreen>),
    TaskDetail(Attachment<TaskDetailScreen>),
    AddEditTask(Attachment<AddEditTaskScreen>),
    Statistics(Attachment<StatisticsScreen>),
}

// A presenter waiting underneath the current screen.
enum Parked {
    Tasks(TasksScreen),
    TaskDetail(TaskDetailScreen),
    AddEditTask(AddEditTaskScreen),
    Statistics(StatisticsScreen),
}

impl Parked {
    fn route(&self) -> Route {
        match self {
            Self::Tasks(_) => Route::Tasks,
            Self::TaskDetail(presenter) => Route::TaskDetail(presenter.task_id().to_string()),
            Self::AddEditTask(presenter) => {
                Route::AddEditTask(presenter.task_id().map(str::to_string))
            }
            Self::Statistics(_) => Route::Statistics,
        }
    }
}

pub struct Shell {
    repository: Arc<Repo>,
    navigator: Arc<ChannelNavigator>,
    navigation: mpsc::UnboundedReceiver<Navigation>,
    message_duration: Duration,
    views: Views,
    out: Output,
    route: Route,
    active: Option<Active>,
    parked: Vec<Parked>,
}

impl Shell {
    pub fn new(cfg: &Config, renderer: Renderer, out: Box<dyn Write + Send>) -> Self {
        let remote = if cfg.seed_demo_tasks {
            RemoteTasks::seeded(cfg.remote_latency)
        } else {
            RemoteTasks::new(cfg.remote_latency)
        };
        let repository = Arc::new(CachedRepository::new(LocalTasks::new(), remote));
        let (navigator, navigation) = ChannelNavigator::new();
        let out: Output = Arc::new(Mutex::new(out));
        let views = Views {
            tasks: TerminalView::new(renderer.clone(), Arc::clone(&out)),
            task_detail: TerminalView::new(renderer.clone(), Arc::clone(&out)),
            add_edit_task: TerminalView::new(renderer.clone(), Arc::clone(&out)),
            statistics: TerminalView::new(renderer, Arc::clone(&out)),
        };

        Self {
            repository,
            navigator: Arc::new(navigator),
            navigation,
            message_duration: cfg.message_duration,
            views,
            out,
            route: Route::Tasks,
            active: None,
            parked: Vec::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn listed_tasks(&self) -> Vec<Task> {
        self.views
            .tasks
            .last_state()
            .map(|state| state.tasks)
            .unwrap_or_default()
    }

    #[tracing::instrument(skip(self))]
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let presenter = TasksPresenter::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.navigator),
            self.message_duration,
        );
        self.show(Parked::Tasks(presenter));
        self.settle().await
    }

    #[tracing::instrument(skip(self), fields(route = %self.route))]
    pub async fn execute(&mut self, line: &str) -> anyhow::Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));
        let command = expand_command_abbrev(word, self.route.commands()).ok_or_else(|| {
            anyhow!(
                "unknown or ambiguous command on the {} screen: {word} (try help)",
                self.route
            )
        })?;
        debug!(command, "resolved command");

        match command {
            "quit" => return Ok(Flow::Quit),
            "help" => {
                self.write_help()?;
                return Ok(Flow::Continue);
            }
            "back" => self.navigate(Navigation::Back).await?,
            "stats" => {
                let presenter = StatisticsPresenter::new(Arc::clone(&self.repository));
                self.push(Parked::Statistics(presenter)).await?;
            }
            _ => match self.route {
                Route::Tasks => self.tasks_command(command, rest)?,
                Route::TaskDetail(_) => self.task_detail_command(command)?,
                Route::AddEditTask(_) => self.add_edit_task_command(command, rest)?,
                Route::Statistics => return Err(anyhow!("unsupported command: {command}")),
            },
        }

        self.settle().await?;
        Ok(Flow::Continue)
    }

    pub fn prompt(&self) -> anyhow::Result<()> {
        let mut out = self.out.lock();
        write!(out, "{}> ", self.route)?;
        out.flush()?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        self.detach_active().await?;
        info!(parked = self.parked.len(), "shell stopped");
        Ok(())
    }

    fn tasks_command(&self, command: &str, rest: &str) -> anyhow::Result<()> {
        let intent = match command {
            "filter" => TasksIntent::Filter(rest.parse::<TasksFilter>()?),
            "refresh" => TasksIntent::Refresh,
            "add" => TasksIntent::AddNewTask,
            "open" => TasksIntent::OpenTaskDetails(self.listed_task(rest)?),
            "done" => TasksIntent::CompleteTask(self.listed_task(rest)?),
            "activate" => TasksIntent::ActivateTask(self.listed_task(rest)?),
            "clear" => TasksIntent::ClearCompletedTasks,
            other => return Err(anyhow!("unsupported command: {other}")),
        };
        self.views.tasks.intents.publish(intent);
        Ok(())
    }

    fn task_detail_command(&self, command: &str) -> anyhow::Result<()> {
        let intent = match command {
            "edit" => TaskDetailIntent::EditTask,
            "delete" => TaskDetailIntent::DeleteTask,
            "done" => TaskDetailIntent::CompleteTask,
            "activate" => TaskDetailIntent::ActivateTask,
            other => return Err(anyhow!("unsupported command: {other}")),
        };
        self.views.task_detail.intents.publish(intent);
        Ok(())
    }

    fn add_edit_task_command(&self, command: &str, rest: &str) -> anyhow::Result<()> {
        let intent = match command {
            "title" => AddEditTaskIntent::TitleChanged(rest.to_string()),
            "desc" => AddEditTaskIntent::DescriptionChanged(rest.to_string()),
            "save" => AddEditTaskIntent::SaveTask,
            other => return Err(anyhow!("unsupported command: {other}")),
        };
        self.views.add_edit_task.intents.publish(intent);
        Ok(())
    }

    fn listed_task(&self, arg: &str) -> anyhow::Result<Task> {
        let index: usize = arg
            .parse()
            .with_context(|| format!("expected a task number, got {arg:?}"))?;
        let tasks = self.listed_tasks();
        index
            .checked_sub(1)
            .and_then(|idx| tasks.get(idx).cloned())
            .ok_or_else(|| anyhow!("no task #{index} in the current list"))
    }

    fn write_help(&self) -> anyhow::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{} commands: {}", self.route, self.route.commands().join(", "))?;
        Ok(())
    }

    // Waits for the current screen to finish its queued intents, then follows
    // any navigation those intents requested.
    async fn settle(&mut self) -> anyhow::Result<()> {
        loop {
            match &self.active {
                Some(Active::Tasks(_)) => self.views.tasks.intents.settled().await,
                Some(Active::TaskDetail(_)) => self.views.task_detail.intents.settled().await,
                Some(Active::AddEditTask(_)) => self.views.add_edit_task.intents.settled().await,
                Some(Active::Statistics(_)) => self.views.statistics.intents.settled().await,
                None => false,
            };

            match self.navigation.try_recv() {
                Ok(navigation) => self.navigate(navigation).await?,
                Err(_) => return Ok(()),
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn navigate(&mut self, navigation: Navigation) -> anyhow::Result<()> {
        info!(from = %self.route, ?navigation, "navigating");
        match navigation {
            Navigation::AddTask => {
                let presenter = self.add_edit_task_presenter(None);
                self.push(Parked::AddEditTask(presenter)).await
            }
            Navigation::EditTask(task_id) => {
                let presenter = self.add_edit_task_presenter(Some(task_id));
                self.push(Parked::AddEditTask(presenter)).await
            }
            Navigation::TaskDetails(task_id) => {
                let presenter = TaskDetailPresenter::new(
                    task_id,
                    Arc::clone(&self.repository),
                    Arc::clone(&self.navigator),
                    self.message_duration,
                );
                self.push(Parked::TaskDetail(presenter)).await
            }
            Navigation::Back => self.go_back().await,
            Navigation::Success => self.return_success().await,
        }
    }

    fn add_edit_task_presenter(&self, task_id: Option<String>) -> AddEditTaskScreen {
        AddEditTaskPresenter::new(
            task_id,
            Arc::clone(&self.repository),
            Arc::clone(&self.navigator),
            self.message_duration,
        )
    }

    async fn push(&mut self, next: Parked) -> anyhow::Result<()> {
        if let Some(current) = self.detach_active().await? {
            self.parked.push(current);
        }
        self.show(next);
        Ok(())
    }

    async fn go_back(&mut self) -> anyhow::Result<()> {
        if self.parked.is_empty() {
            warn!(route = %self.route, "already on the first screen");
            return Ok(());
        }
        self.detach_active().await?;
        if let Some(previous) = self.parked.pop() {
            self.show(previous);
        }
        Ok(())
    }

    // A saved task returns straight to the list, which then confirms the save.
    async fn return_success(&mut self) -> anyhow::Result<()> {
        self.detach_active().await?;
        let mut tasks = None;
        while let Some(parked) = self.parked.pop() {
            match parked {
                Parked::Tasks(presenter) => {
                    tasks = Some(presenter);
                    break;
                }
                other => debug!(route = %other.route(), "dropping screen on success"),
            }
        }
        let presenter = match tasks {
            Some(presenter) => presenter,
            None => TasksPresenter::new(
                Arc::clone(&self.repository),
                Arc::clone(&self.navigator),
                self.message_duration,
            ),
        };
        self.show(Parked::Tasks(presenter));
        self.views
            .tasks
            .intents
            .publish(TasksIntent::TaskSuccessfullySaved);
        Ok(())
    }

    fn show(&mut self, next: Parked) {
        self.route = next.route();
        info!(route = %self.route, "showing screen");
        let active = match next {
            Parked::Tasks(presenter) => {
                self.views.tasks.forget();
                let view: ViewRef<TasksState, TasksIntent> = self.views.tasks.clone();
                Active::Tasks(attach(presenter, view))
            }
            Parked::TaskDetail(presenter) => {
                self.views.task_detail.forget();
                let view: ViewRef<TaskDetailState, TaskDetailIntent> =
                    self.views.task_detail.clone();
                Active::TaskDetail(attach(presenter, view))
            }
            Parked::AddEditTask(presenter) => {
                self.views.add_edit_task.forget();
                let view: ViewRef<AddEditTaskState, AddEditTaskIntent> =
                    self.views.add_edit_task.clone();
                Active::AddEditTask(attach(presenter, view))
            }
            Parked::Statistics(presenter) => {
                self.views.statistics.forget();
                let view: ViewRef<StatisticsState, StatisticsIntent> =
                    self.views.statistics.clone();
                Active::Statistics(attach(presenter, view))
            }
        };
        self.active = Some(active);
    }

    async fn detach_active(&mut self) -> anyhow::Result<Option<Parked>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        let parked = match active {
            Active::Tasks(attachment) => Parked::Tasks(attachment.detach().await?),
            Active::TaskDetail(attachment) => Parked::TaskDetail(attachment.detach().await?),
            Active::AddEditTask(attachment) => Parked::AddEditTask(attachment.detach().await?),
            Active::Statistics(attachment) => Parked::Statistics(attachment.detach().await?),
        };
        Ok(Some(parked))
    }
}

fn expand_command_abbrev<'a>(token: &str, known: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = known.iter().copied().find(|name| *name == token) {
        return Some(exact);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[tracing::instrument(skip(cfg))]
pub async fn run(cfg: &Config, script: Option<&Path>) -> anyhow::Result<()> {
    let renderer = Renderer::for_stdout(cfg.render_format, cfg.color);
    let mut shell = Shell::new(cfg, renderer, Box::new(io::stdout()));
    shell.start().await?;

    match script {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read script {}", path.display()))?;
            for (line_num, line) in text.lines().enumerate() {
                let flow = shell
                    .execute(line)
                    .await
                    .with_context(|| format!("{}:{}", path.display(), line_num + 1))?;
                if flow == Flow::Quit {
                    break;
                }
            }
        }
        None => {
            let interactive = io::stdin().is_terminal();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                if interactive {
                    shell.prompt()?;
                }
                let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
                    break;
                };
                match shell.execute(&line).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => eprintln!("error: {err:#}"),
                }
            }
        }
    }

    shell.shutdown().await
}
