use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::domain::types::registration_client_key;
use crate::error::PortalServiceError;
use crate::infra::cache::KvStore;
use crate::usecase::rate_limit::RateLimiter;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const UNKNOWN_IP: &str = "0.0.0.0";

/// Resolved client address, stored in request extensions by
/// [`rate_limit_registration`].
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

/// State for [`rate_limit_registration`].
#[derive(Clone)]
pub struct RegistrationThrottle {
    pub kv: KvStore,
    /// Reverse proxies between the client and this service. Zero means the
    /// peer address is the client and `x-forwarded-for` is ignored.
    pub trusted_proxy_hops: usize,
}

/// Client address used as the throttling key.
///
/// Each trusted proxy appends the address it saw, so with `n` trusted hops the
/// client is the `n`-th entry from the right. Entries further left are written
/// by the client and never read. A header shorter than the trusted chain falls
/// back to the peer address.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxy_hops: usize,
) -> String {
    let forwarded = (trusted_proxy_hops > 0)
        .then(|| headers.get(FORWARDED_FOR_HEADER))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').nth(trusted_proxy_hops - 1))
        .map(str::trim)
        .filter(|v| v.parse::<IpAddr>().is_ok())
        .map(str::to_owned);

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_IP.to_owned())
}

fn peer_addr(request: &Request) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Throttle anonymous registration per (address, user-agent bucket).
///
/// Counter store failures let the request through.
pub async fn rate_limit_registration(
    State(throttle): State<RegistrationThrottle>,
    mut request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(
        request.headers(),
        peer_addr(&request),
        throttle.trusted_proxy_hops,
    );
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let key = registration_client_key(&ip, user_agent);
    request.extensions_mut().insert(ClientIp(ip.clone()));

    let limiter = RateLimiter::registration(throttle.kv);
    match limiter.check(&key).await {
        Ok(decision) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                RATE_LIMIT_REMAINING_HEADER,
                HeaderValue::from(decision.remaining),
            );
            response
        }
        Err(e @ PortalServiceError::RateLimitExceeded { .. }) => {
            warn!(%ip, "registration rate limit exceeded");
            e.into_response()
        }
        Err(e) => {
            warn!(error = format!("{e:#}"), %key, "rate limiter unavailable, allowing request");
            next.run(request).await
        }
    }
}
