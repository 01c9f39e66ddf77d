use std::time::Duration;

use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::repository::NotificationPort;
use crate::domain::types::{Notification, NotificationChannel, NotificationError};
use crate::infra::templates::{Rendered, render};

/// SMTP settings. STARTTLS relay with optional credentials.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .context("build smtp relay")?;
        if let Some(port) = settings.port {
            builder = builder.port(port);
        }
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        let from = settings
            .from
            .parse::<Mailbox>()
            .context("parse smtp sender address")?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    pub async fn send(&self, to: &str, rendered: &Rendered) -> Result<(), NotificationError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|_| NotificationError::InvalidRecipient(to.to_owned()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(rendered.subject.clone())
            .body(rendered.body.clone())
            .context("build email message")?;
        self.transport
            .send(message)
            .await
            .context("smtp send")?;
        Ok(())
    }
}

/// Messaging gateway reached through a JSON webhook: `{"to": ..., "body": ...}`.
#[derive(Clone)]
pub struct WebhookMessenger {
    client: reqwest::Client,
    url: String,
}

impl WebhookMessenger {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build messaging client")?;
        Ok(Self { client, url })
    }

    pub async fn send(&self, to: &str, rendered: &Rendered) -> Result<(), NotificationError> {
        self.client
            .post(&self.url)
            .json(&serde_json::json!({ "to": to, "body": rendered.body }))
            .send()
            .await
            .context("messaging webhook request")?
            .error_for_status()
            .context("messaging webhook status")?;
        Ok(())
    }
}

/// Producer half of the delivery queue. `notify` never waits on delivery:
/// a full queue is reported as `QueueFull` and the message is dropped.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
    email_enabled: bool,
    messaging_enabled: bool,
}

impl NotificationQueue {
    fn channel_enabled(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Email => self.email_enabled,
            NotificationChannel::Messaging => self.messaging_enabled,
        }
    }
}

fn check_recipient(notification: &Notification) -> Result<(), NotificationError> {
    let r = notification.recipient.as_str();
    let ok = match notification.channel {
        NotificationChannel::Email => r.contains('@'),
        NotificationChannel::Messaging => {
            r.starts_with('+') && r.len() > 1 && r[1..].bytes().all(|b| b.is_ascii_digit())
        }
    };
    if ok {
        Ok(())
    } else {
        Err(NotificationError::InvalidRecipient(r.to_owned()))
    }
}

impl NotificationPort for NotificationQueue {
    async fn notify(&self, notification: Notification) -> Result<bool, NotificationError> {
        check_recipient(&notification)?;
        if !self.channel_enabled(notification.channel) {
            debug!(channel = ?notification.channel, template = ?notification.template, "channel not configured");
            return Ok(false);
        }
        self.tx.try_send(notification).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotificationError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => NotificationError::QueueClosed,
        })?;
        Ok(true)
    }
}

/// Start the delivery worker. It runs until every queue handle is dropped.
pub fn spawn_notification_worker(
    capacity: usize,
    mailer: Option<SmtpMailer>,
    messenger: Option<WebhookMessenger>,
) -> (NotificationQueue, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));
    let queue = NotificationQueue {
        tx,
        email_enabled: mailer.is_some(),
        messaging_enabled: messenger.is_some(),
    };

    let handle = tokio::spawn(async move {
        info!(
            email = mailer.is_some(),
            messaging = messenger.is_some(),
            "notification worker started"
        );
        while let Some(notification) = rx.recv().await {
            let rendered = render(notification.template, &notification.context);
            let result = match (notification.channel, &mailer, &messenger) {
                (NotificationChannel::Email, Some(m), _) => {
                    m.send(&notification.recipient, &rendered).await
                }
                (NotificationChannel::Messaging, _, Some(w)) => {
                    w.send(&notification.recipient, &rendered).await
                }
                _ => Ok(()),
            };
            match result {
                Ok(()) => debug!(
                    channel = ?notification.channel,
                    template = ?notification.template,
                    "notification delivered"
                ),
                Err(e) => warn!(
                    error = format!("{e:#}"),
                    channel = ?notification.channel,
                    template = ?notification.template,
                    "notification delivery failed"
                ),
            }
        }
        info!("notification worker stopped");
    });

    (queue, handle)
}
