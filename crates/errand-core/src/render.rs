use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::error::ScreenError;
use crate::filter::TasksFilter;
use crate::screens::{
    AddEditTaskState, StatisticsState, TaskDetailMessage, TaskDetailState, TaskDisplay,
    TasksMessage, TasksState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for RenderFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("invalid render format: {other} (expected text or json)")),
        }
    }
}

// A view state the terminal knows how to draw.
pub trait ScreenState: Serialize {
    const SCREEN: &'static str;

    fn write_text(&self, renderer: &Renderer, out: &mut dyn Write) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    format: RenderFormat,
}

impl Renderer {
    pub fn new(format: RenderFormat, color: bool) -> Self {
        Self { color, format }
    }

    // Colour only applies when stdout is a terminal.
    pub fn for_stdout(format: RenderFormat, color: bool) -> Self {
        Self::new(format, color && io::stdout().is_terminal())
    }

    #[tracing::instrument(skip(self, out, state), fields(screen = S::SCREEN))]
    pub fn write_state<S: ScreenState>(&self, out: &mut dyn Write, state: &S) -> anyhow::Result<()> {
        match self.format {
            RenderFormat::Text => state.write_text(self, out),
            RenderFormat::Json => {
                let line = serde_json::json!({
                    "screen": S::SCREEN,
                    "state": state,
                });
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
                Ok(())
            }
        }
    }

    pub fn write_error(&self, out: &mut dyn Write, error: &ScreenError) -> anyhow::Result<()> {
        match self.format {
            RenderFormat::Text => writeln!(out, "{} {error}", self.paint("error:", "31"))?,
            RenderFormat::Json => {
                let line = serde_json::json!({
                    "error": error.code(),
                    "message": error.to_string(),
                });
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
            }
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn write_message(&self, out: &mut dyn Write, message: Option<&str>) -> anyhow::Result<()> {
        if let Some(message) = message {
            writeln!(out, "{}", self.paint(&format!("» {message}"), "36"))?;
        }
        Ok(())
    }
}

impl ScreenState for TasksState {
    const SCREEN: &'static str = "tasks";

    fn write_text(&self, renderer: &Renderer, out: &mut dyn Write) -> anyhow::Result<()> {
        let heading = match self.active_filter {
            TasksFilter::All => "All Tasks",
            TasksFilter::Active => "Active Tasks",
            TasksFilter::Completed => "Completed Tasks",
        };
        writeln!(out, "{}", renderer.paint(heading, "1"))?;

        if self.show_loading_indicator {
            writeln!(out, "Loading...")?;
        } else {
            match self.task_display {
                TaskDisplay::ShowTasks => {
                    let headers = vec!["#".to_string(), "Done".to_string(), "Title".to_string()];
                    let rows = self
                        .tasks
                        .iter()
                        .enumerate()
                        .map(|(idx, task)| {
                            let done = if task.is_completed() {
                                renderer.paint("[x]", "32")
                            } else {
                                "[ ]".to_string()
                            };
                            vec![
                                renderer.paint(&(idx + 1).to_string(), "33"),
                                done,
                                task.display_title().to_string(),
                            ]
                        })
                        .collect();
                    write_table(&mut *out, headers, rows)?;
                }
                TaskDisplay::ShowNoTasks => writeln!(out, "You have no tasks!")?,
                TaskDisplay::ShowNoActiveTasks => writeln!(out, "You have no active tasks!")?,
                TaskDisplay::ShowNoCompletedTasks => {
                    writeln!(out, "You have no completed tasks!")?
                }
            }
        }

        let message = match self.message {
            TasksMessage::None => None,
            TasksMessage::TaskMarkedCompleted => Some("Task marked complete"),
            TasksMessage::TaskMarkedActive => Some("Task marked active"),
            TasksMessage::CompletedTasksCleared => Some("Completed tasks cleared"),
            TasksMessage::SuccessfullySaved => Some("Task saved"),
            TasksMessage::LoadingTasksError => Some("Error while loading tasks"),
        };
        renderer.write_message(out, message)
    }
}

impl ScreenState for TaskDetailState {
    const SCREEN: &'static str = "task_detail";

    fn write_text(&self, renderer: &Renderer, out: &mut dyn Write) -> anyhow::Result<()> {
        if self.task_missing {
            writeln!(out, "{}", renderer.paint("No data", "31"))?;
        } else if self.show_loading_indicator {
            writeln!(out, "Loading...")?;
        } else {
            let status = if self.completion_status {
                renderer.paint("completed", "32")
            } else {
                "active".to_string()
            };
            writeln!(out, "title        {}", self.title)?;
            writeln!(out, "description  {}", self.description)?;
            writeln!(out, "status       {status}")?;
        }

        let message = match self.message {
            TaskDetailMessage::None => None,
            TaskDetailMessage::TaskMarkedCompleted => Some("Task marked complete"),
            TaskDetailMessage::TaskMarkedActive => Some("Task marked active"),
        };
        renderer.write_message(out, message)
    }
}

impl ScreenState for AddEditTaskState {
    const SCREEN: &'static str = "add_edit_task";

    fn write_text(&self, renderer: &Renderer, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(out, "title        {}", self.title)?;
        writeln!(out, "description  {}", self.description)?;
        let message = self
            .show_empty_task_error
            .then_some("Tasks cannot be empty");
        renderer.write_message(out, message)
    }
}

impl ScreenState for StatisticsState {
    const SCREEN: &'static str = "statistics";

    fn write_text(&self, renderer: &Renderer, out: &mut dyn Write) -> anyhow::Result<()> {
        if self.show_progress_indicator {
            writeln!(out, "Loading...")?;
        } else if self.show_loading_error {
            writeln!(out, "{}", renderer.paint("Error loading statistics", "31"))?;
        } else if self.active_count == 0 && self.completed_count == 0 {
            writeln!(out, "You have no tasks.")?;
        } else {
            writeln!(out, "Active tasks: {}", self.active_count)?;
            writeln!(out, "Completed tasks: {}", self.completed_count)?;
        }
        Ok(())
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(header.as_str()))
        .collect();

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let mut line = String::new();
    for (header, &width) in headers.iter().zip(&widths) {
        line.push_str(&format!("{header:width$} "));
    }
    writeln!(writer, "{}", line.trim_end())?;

    line.clear();
    for &width in &widths {
        line.push_str(&format!("{:-<width$} ", ""));
    }
    writeln!(writer, "{}", line.trim_end())?;

    for row in rows {
        line.clear();
        for (cell, &width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            line.push_str(cell);
            line.push_str(&" ".repeat(padding));
            line.push(' ');
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
