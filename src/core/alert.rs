//! User-facing alert presentation for rejections
//!
//! Presenting the alert belongs to the host. The validator only calls into
//! an [`AlertSink`] when `showAlert` is set.

/// Something that can put a rejection message in front of the user.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Default sink: routes the alert through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn alert(&self, message: &str) {
        log::warn!("{}", message);
    }
}

impl<F> AlertSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn alert(&self, message: &str) {
        self(message)
    }
}
