//! User-visible notification seam.

/// Sink for user-visible error notifications (toast seam).
///
/// Only backend rejection of the token exchange produces a notification;
/// every other failure is handled transparently via redirects or logging.
pub trait Notifier: Send + Sync {
    /// Surface an error message to the user.
    fn error(&self, message: &str);
}

/// Default [`Notifier`] that logs instead of rendering. Useful for headless
/// embeddings and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::error!(target: "uptime_session::notify", "{message}");
    }
}
