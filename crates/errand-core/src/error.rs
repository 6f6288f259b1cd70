use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("data not available")]
pub struct DataNotAvailable;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("{operation} requires a task id, but none is set")]
    MissingTaskId { operation: &'static str },
}

impl ScreenError {
    pub fn missing_task_id(operation: &'static str) -> Self {
        Self::MissingTaskId { operation }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTaskId { .. } => "missing_task_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScreenError;

    #[test]
    fn missing_task_id_names_the_operation() {
        let err = ScreenError::missing_task_id("delete task");
        assert_eq!(err.code(), "missing_task_id");
        assert_eq!(
            err.to_string(),
            "delete task requires a task id, but none is set"
        );
    }
}
