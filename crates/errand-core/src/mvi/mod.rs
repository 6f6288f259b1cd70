pub mod intents;
pub mod presenter;
pub mod screen;
pub mod view;

pub use intents::{Intents, Subscription};
pub use presenter::{Attachment, Presenter, attach};
pub use screen::{DEFAULT_MESSAGE_DURATION, MessageTimer, Screen};
pub use view::{MviView, ViewRef};
