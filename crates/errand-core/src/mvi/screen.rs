use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::error::ScreenError;
use crate::mvi::view::ViewRef;

pub const DEFAULT_MESSAGE_DURATION: Duration = Duration::from_millis(2750);

#[derive(Debug, Clone)]
pub struct MessageTimer {
    duration: Duration,
    deadline: Option<Instant>,
}

impl MessageTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    // Replaces any pending deadline.
    pub fn start(&mut self) -> Instant {
        let deadline = Instant::now() + self.duration;
        if self.deadline.replace(deadline).is_some() {
            trace!("restarted pending message timer");
        }
        deadline
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Current view state of one presenter plus the view it renders to.
pub struct Screen<S, I> {
    state: S,
    view: Option<ViewRef<S, I>>,
    timer: MessageTimer,
}

impl<S, I> Screen<S, I> {
    pub fn new(initial: S, message_duration: Duration) -> Self {
        Self {
            state: initial,
            view: None,
            timer: MessageTimer::new(message_duration),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn is_attached(&self) -> bool {
        self.view.is_some()
    }

    pub fn update(&mut self, state: S) {
        self.state = state;
        self.render();
    }

    pub fn update_with(&mut self, reduce: impl FnOnce(&S) -> S) {
        let next = reduce(&self.state);
        self.update(next);
    }

    pub fn update_silently(&mut self, state: S) {
        self.state = state;
    }

    pub fn render(&self) {
        if let Some(view) = self.view.as_ref() {
            view.render(&self.state);
        }
    }

    pub fn attach(&mut self, view: ViewRef<S, I>) {
        self.view = Some(view);
        self.render();
    }

    pub fn detach(&mut self) -> Option<ViewRef<S, I>> {
        self.view.take()
    }

    pub fn report_error(&self, error: &ScreenError) {
        if let Some(view) = self.view.as_ref() {
            view.report_error(error);
        }
    }

    pub fn timer(&self) -> &MessageTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut MessageTimer {
        &mut self.timer
    }

    pub fn start_message_timer(&mut self) {
        self.timer.start();
    }
}
