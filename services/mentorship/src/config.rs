use std::time::Duration;

use serde::Deserialize;

use portal_core::config::Config;

use crate::infra::notify::SmtpSettings;

/// Mentorship service configuration, read from environment variables.
#[derive(Debug, Deserialize)]
pub struct MentorshipConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Shared counter and cache store. Process-local store when unset.
    pub redis_url: Option<String>,
    /// HTTP port (default 3120). Env var: `MENTORSHIP_PORT`.
    #[serde(default = "default_port")]
    pub mentorship_port: u16,
    /// Base URL used in verification links.
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_smtp_from")]
    pub smtp_from: String,
    /// Messaging gateway webhook. Messaging is disabled when unset.
    pub messaging_webhook_url: Option<String>,
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
    #[serde(default = "default_notification_queue_capacity")]
    pub notification_queue_capacity: usize,
    /// Reverse proxies in front of the service that append to
    /// `x-forwarded-for`. Default 0: the peer address identifies the client.
    #[serde(default)]
    pub trusted_proxy_hops: usize,
}

fn default_port() -> u16 {
    3120
}

fn default_site_base_url() -> String {
    "http://localhost:3000".to_owned()
}

fn default_smtp_from() -> String {
    "College Portal <no-reply@localhost>".to_owned()
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_notification_queue_capacity() -> usize {
    1024
}

impl Config for MentorshipConfig {}

impl MentorshipConfig {
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.as_ref().filter(|h| !h.trim().is_empty())?;
        Some(SmtpSettings {
            host: host.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from: self.smtp_from.clone(),
        })
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs.max(1))
    }
}
