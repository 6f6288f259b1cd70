use std::sync::Arc;

use crate::error::ScreenError;
use crate::mvi::intents::Intents;

pub trait MviView: Send + Sync {
    type State;
    type Intent;

    fn intents(&self) -> &Intents<Self::Intent>;

    fn render(&self, state: &Self::State);

    fn report_error(&self, _error: &ScreenError) {}
}

pub type ViewRef<S, I> = Arc<dyn MviView<State = S, Intent = I>>;
