//! User-facing notifications raised by the batch orchestrator.

/// Terminal and error notifications shown to the user as modal dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The selected folder is not a content folder.
    InvalidFolder,
    /// The folder holds no level sequences.
    NoSequencesFound,
    /// The renderer refused to start a sequence.
    CouldNotStartRendering { message: String },
    /// Every sequence of the batch rendered.
    BatchRenderingComplete { count: usize },
    /// A sequence failed while rendering.
    RenderingFailed { sequence: String, error: String },
    /// A render finished outside of any batch.
    RenderingSucceeded,
}

impl Notification {
    /// Dialog title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidFolder => "Invalid Folder",
            Self::NoSequencesFound => "No Sequences Found",
            Self::CouldNotStartRendering { .. } => "Could not start rendering",
            Self::BatchRenderingComplete { .. } => "Batch Rendering Complete",
            Self::RenderingFailed { .. } => "Rendering failed",
            Self::RenderingSucceeded => "Successful rendering",
        }
    }

    /// Dialog body.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidFolder => "Selected folder is not a valid content folder.".to_string(),
            Self::NoSequencesFound => {
                "No level sequence assets found in the selected folder.".to_string()
            }
            Self::CouldNotStartRendering { message } => message.clone(),
            Self::BatchRenderingComplete { count } => {
                format!("Successfully rendered {} sequences.", count)
            }
            Self::RenderingFailed { sequence, error } => {
                format!("Failed on sequence: {}\n\nError: {}", sequence, error)
            }
            Self::RenderingSucceeded => "Rendering finished successfully".to_string(),
        }
    }

    /// Whether this notification reports a problem.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Self::BatchRenderingComplete { .. } | Self::RenderingSucceeded
        )
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

/// Sink for notifications, typically a message box.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl<F> Notifier for F
where
    F: FnMut(Notification),
{
    fn notify(&mut self, notification: Notification) {
        self(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_sequence_and_error() {
        let n = Notification::RenderingFailed {
            sequence: "Shot030".to_string(),
            error: "GPU lost".to_string(),
        };
        assert_eq!(n.message(), "Failed on sequence: Shot030\n\nError: GPU lost");
        assert!(n.is_error());
    }

    #[test]
    fn completion_message_contains_count() {
        let n = Notification::BatchRenderingComplete { count: 4 };
        assert_eq!(n.title(), "Batch Rendering Complete");
        assert!(n.message().contains('4'));
        assert!(!n.is_error());
    }

    #[test]
    fn closures_are_notifiers() {
        let mut seen = Vec::new();
        {
            let mut sink = |n: Notification| seen.push(n);
            sink.notify(Notification::InvalidFolder);
        }
        assert_eq!(seen, vec![Notification::InvalidFolder]);
    }
}
