use std::fmt::Debug;
use std::future::Future;

use anyhow::Context;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ScreenError;
use crate::mvi::intents::{Envelope, Subscription};
use crate::mvi::screen::Screen;
use crate::mvi::view::ViewRef;

pub trait Presenter: Send + 'static {
    type State: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Intent: Debug + Send + 'static;

    const NAME: &'static str;

    fn screen(&self) -> &Screen<Self::State, Self::Intent>;

    fn screen_mut(&mut self) -> &mut Screen<Self::State, Self::Intent>;

    fn on_attach(&mut self) -> impl Future<Output = Result<(), ScreenError>> + Send;

    fn on_intent(
        &mut self,
        intent: Self::Intent,
    ) -> impl Future<Output = Result<(), ScreenError>> + Send;

    fn on_message_expired(&mut self);
}

/// A presenter running against an attached view. The presenter is owned by
/// a single tokio task until [`Attachment::detach`] hands it back.
pub struct Attachment<P: Presenter> {
    stop: oneshot::Sender<()>,
    task: JoinHandle<P>,
}

impl<P: Presenter> Attachment<P> {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    #[tracing::instrument(skip(self), fields(presenter = P::NAME))]
    pub async fn detach(self) -> anyhow::Result<P> {
        let Attachment { stop, task } = self;
        if stop.send(()).is_err() {
            debug!("presenter loop already stopped");
        }
        task.await
            .with_context(|| format!("{} presenter task failed", P::NAME))
    }
}

pub fn attach<P: Presenter>(
    presenter: P,
    view: ViewRef<P::State, P::Intent>,
) -> Attachment<P> {
    // Subscribe before spawning so intents published right after attach are
    // queued rather than dropped.
    let subscription = view.intents().subscribe();
    let (stop, stopped) = oneshot::channel();
    let task = tokio::spawn(run_attached(presenter, view, subscription, stopped));
    Attachment { stop, task }
}

async fn run_attached<P: Presenter>(
    mut presenter: P,
    view: ViewRef<P::State, P::Intent>,
    mut subscription: Subscription<P::Intent>,
    mut stopped: oneshot::Receiver<()>,
) -> P {
    // A dropped attachment means the view may already belong to another
    // presenter. An explicit detach still drains what was queued.
    let detach_requested = match stopped.try_recv() {
        Err(TryRecvError::Closed) => {
            view.intents().unsubscribe(&subscription);
            debug!(presenter = P::NAME, "stopped before attaching");
            return presenter;
        }
        Err(TryRecvError::Empty) => false,
        Ok(()) => true,
    };

    presenter.screen_mut().attach(view.clone());
    info!(presenter = P::NAME, "view attached");

    if let Err(err) = presenter.on_attach().await {
        reject(&presenter, &err);
    }

    loop {
        let deadline = presenter.screen().timer().deadline();
        tokio::select! {
            biased;

            // Due expirations run before queued intents.
            () = wait_for(deadline), if deadline.is_some() => {
                if presenter.screen_mut().timer_mut().take_expired(Instant::now()) {
                    debug!(presenter = P::NAME, "transient message expired");
                    presenter.on_message_expired();
                }
            }

            envelope = subscription.next() => match envelope {
                Some(Envelope::Intent(intent)) => {
                    debug!(presenter = P::NAME, ?intent, "handling intent");
                    if let Err(err) = presenter.on_intent(intent).await {
                        reject(&presenter, &err);
                    }
                }
                Some(Envelope::Barrier(ack)) => {
                    let _ = ack.send(());
                }
                None => {
                    debug!(presenter = P::NAME, "intent source closed");
                    break;
                }
            },

            () = stop_signal(&mut stopped, detach_requested) => break,
        }
    }

    if !view.intents().unsubscribe(&subscription) {
        debug!(presenter = P::NAME, "view taken over by another presenter");
    }
    presenter.screen_mut().detach();
    info!(presenter = P::NAME, "view detached");
    presenter
}

fn reject<P: Presenter>(presenter: &P, err: &ScreenError) {
    warn!(
        presenter = P::NAME,
        code = err.code(),
        error = %err,
        "intent rejected"
    );
    presenter.screen().report_error(err);
}

// The receiver must not be polled again once `try_recv` has taken the value.
async fn stop_signal(stopped: &mut oneshot::Receiver<()>, already: bool) {
    if !already {
        let _ = stopped.await;
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
