use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub trait Navigator: Send + Sync + 'static {
    fn navigate_to_add_task(&self);

    fn navigate_to_edit_task(&self, task_id: &str);

    fn navigate_to_task_details(&self, task_id: &str);

    fn go_back(&self);

    fn return_success(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "task_id", rename_all = "snake_case")]
pub enum Navigation {
    AddTask,
    EditTask(String),
    TaskDetails(String),
    Back,
    Success,
}

// Forwards navigation requests to whoever drives the screens.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<Navigation>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, navigation: Navigation) {
        debug!(?navigation, "navigation requested");
        if self.sender.send(navigation).is_err() {
            warn!("navigation receiver dropped; request ignored");
        }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate_to_add_task(&self) {
        self.send(Navigation::AddTask);
    }

    fn navigate_to_edit_task(&self, task_id: &str) {
        self.send(Navigation::EditTask(task_id.to_string()));
    }

    fn navigate_to_task_details(&self, task_id: &str) {
        self.send(Navigation::TaskDetails(task_id.to_string()));
    }

    fn go_back(&self) {
        self.send(Navigation::Back);
    }

    fn return_success(&self) {
        self.send(Navigation::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelNavigator, Navigation, Navigator};

    #[test]
    fn forwards_requests_in_order() {
        let (navigator, mut receiver) = ChannelNavigator::new();
        navigator.navigate_to_task_details("42");
        navigator.navigate_to_edit_task("42");
        navigator.return_success();

        let mut seen = Vec::new();
        while let Ok(navigation) = receiver.try_recv() {
            seen.push(navigation);
        }
        assert_eq!(
            seen,
            vec![
                Navigation::TaskDetails("42".to_string()),
                Navigation::EditTask("42".to_string()),
                Navigation::Success,
            ]
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Navigation::EditTask("7".into())).expect("json");
        assert_eq!(json, r#"{"kind":"edit_task","task_id":"7"}"#);
        let json = serde_json::to_string(&Navigation::Back).expect("json");
        assert_eq!(json, r#"{"kind":"back"}"#);
    }
}
