//! Alert system for displaying success and error messages to users.
//!
//! Controllers emit [Notification]s through a [Notifier] and never wait for them to be shown.
//! The presentation layer decides how each [AlertType] is rendered.

use tokio::sync::mpsc::UnboundedSender;

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    /// A transient message confirming that an action worked.
    Success,
    /// A transient message explaining that an action failed.
    Error,
    /// A blocking message the user must dismiss before continuing.
    Alert,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// How the message should be presented.
    pub alert_type: AlertType,
    /// The text shown to the user.
    pub message: String,
}

impl Notification {
    /// Create a new success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Success,
            message: message.into(),
        }
    }

    /// Create a new error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Error,
            message: message.into(),
        }
    }

    /// Create a new blocking alert
    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Alert,
            message: message.into(),
        }
    }
}

/// Fire-and-forget sink for [Notification]s.
pub trait Notifier: Send + Sync {
    /// Show `notification` to the user.
    fn notify(&self, notification: Notification);
}

/// A [Notifier] that forwards notifications over a channel to the presentation layer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier that sends every notification to `sender`.
    pub fn new(sender: UnboundedSender<Notification>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(error) = self.sender.send(notification) {
            // Nobody is listening anymore, so there is nobody to tell.
            tracing::debug!("Dropped notification {:?}", error.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::{AlertType, ChannelNotifier, Notification, Notifier};

    #[test]
    fn constructors_set_alert_type() {
        assert_eq!(Notification::success("ok").alert_type, AlertType::Success);
        assert_eq!(Notification::error("no").alert_type, AlertType::Error);
        assert_eq!(Notification::alert("stop").alert_type, AlertType::Alert);
    }

    #[tokio::test]
    async fn channel_notifier_forwards_notifications_in_order() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let notifier = ChannelNotifier::new(sender);

        notifier.notify(Notification::success("first"));
        notifier.notify(Notification::error("second"));

        assert_eq!(receiver.recv().await, Some(Notification::success("first")));
        assert_eq!(receiver.recv().await, Some(Notification::error("second")));
    }

    #[test]
    fn channel_notifier_ignores_closed_channel() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let notifier = ChannelNotifier::new(sender);

        notifier.notify(Notification::success("nobody is listening"));
    }
}
