use std::net::SocketAddr;
use std::time::Duration;

use sea_orm::Database;
use tracing::{info, warn};

use portal_core::config::Config;
use portal_core::tracing::init_tracing;

use portal_mentorship::config::MentorshipConfig;
use portal_mentorship::infra::cache::{KvStore, RedisStore};
use portal_mentorship::infra::lookup::HttpLookupProvider;
use portal_mentorship::infra::memory::{MemoryStore, spawn_purger};
use portal_mentorship::infra::notify::{SmtpMailer, WebhookMessenger, spawn_notification_worker};
use portal_mentorship::router::build_router;
use portal_mentorship::state::AppState;
use portal_mentorship::usecase::registration::PurgeExpiredTokensUseCase;

const MEMORY_PURGE_PERIOD: Duration = Duration::from_secs(60);
const TOKEN_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Delete expired verification tokens every `period`. Failures are logged and
/// retried on the next tick.
fn spawn_token_sweeper(state: &AppState, period: Duration) -> tokio::task::JoinHandle<()> {
    let usecase = PurgeExpiredTokensUseCase {
        students: state.student_repo(),
        clock: state.clock(),
    };
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            if let Err(e) = usecase.execute().await {
                warn!(error = %e, "expired token sweep failed");
            }
        }
    })
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MentorshipConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let kv = match &config.redis_url {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .expect("failed to create Redis pool");
            KvStore::Redis(RedisStore { pool })
        }
        None => {
            warn!("REDIS_URL not set, counters and lookup cache are process-local");
            let store = MemoryStore::new();
            spawn_purger(store.clone(), MEMORY_PURGE_PERIOD);
            KvStore::Memory(store)
        }
    };

    let mailer = config
        .smtp_settings()
        .map(|smtp| SmtpMailer::new(&smtp).expect("invalid SMTP configuration"));
    let messenger = config.messaging_webhook_url.clone().map(|url| {
        WebhookMessenger::new(url, config.lookup_timeout()).expect("invalid messaging webhook")
    });
    if mailer.is_none() {
        warn!("SMTP_HOST not set, email notifications are disabled");
    }
    let (notifier, _worker) =
        spawn_notification_worker(config.notification_queue_capacity, mailer, messenger);

    let lookup_provider =
        HttpLookupProvider::new(config.lookup_timeout()).expect("failed to build lookup client");

    let state = AppState {
        db,
        kv: kv.clone(),
        notifier,
        lookup_provider,
        site_base_url: config.site_base_url.trim_end_matches('/').to_owned(),
        trusted_proxy_hops: config.trusted_proxy_hops,
    };

    spawn_token_sweeper(&state, TOKEN_SWEEP_PERIOD);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.mentorship_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(backend = kv.backend(), "mentorship service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
