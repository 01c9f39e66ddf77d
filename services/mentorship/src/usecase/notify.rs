use tracing::{debug, warn};

use crate::domain::repository::NotificationPort;
use crate::domain::types::Notification;

/// Hand a notification to the dispatcher and swallow any failure.
///
/// Called only after the state transition has committed; the return value is
/// informational and must never change the caller's result.
pub async fn dispatch_best_effort<N: NotificationPort>(
    notifier: &N,
    notification: Notification,
) -> bool {
    let channel = notification.channel;
    let template = notification.template;
    match notifier.notify(notification).await {
        Ok(true) => true,
        Ok(false) => {
            debug!(?channel, ?template, "notification not delivered");
            false
        }
        Err(e) => {
            warn!(error = %e, ?channel, ?template, "notification failed");
            false
        }
    }
}
