//! Per-client-IP rate limiting

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use assessly_shared::config::RateLimitSettings;

use crate::response::ApiError;

pub type IpRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

pub fn build_limiter(settings: &RateLimitSettings) -> IpRateLimiter {
    let per_second = NonZeroU32::new(settings.per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(settings.burst).unwrap_or(per_second);
    RateLimiter::keyed(Quota::per_second(per_second).allow_burst(burst))
}

/// Keyed limiter plus the policy for deciding which address a request is from.
pub struct ClientRateLimiter {
    limiter: IpRateLimiter,
    trust_forwarded_for: bool,
    cleanup_interval: Duration,
}

impl ClientRateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            limiter: build_limiter(settings),
            trust_forwarded_for: settings.trust_forwarded_for,
            cleanup_interval: Duration::from_secs(settings.cleanup_interval_secs.max(1)),
        }
    }

    /// Socket peer, unless the deployment sits behind a proxy that appends to
    /// `x-forwarded-for`. Then the right-most hop is the one the proxy saw.
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
        let forwarded = if self.trust_forwarded_for {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.rsplit(',').next())
                .and_then(|ip| ip.trim().parse().ok())
        } else {
            None
        };

        forwarded
            .or_else(|| peer.map(|addr| addr.ip()))
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    pub fn check(&self, ip: &IpAddr) -> bool {
        self.limiter.check_key(ip).is_ok()
    }

    /// Number of client addresses currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Drop entries whose quota has fully replenished.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let removed = before.saturating_sub(self.limiter.len());
        if removed > 0 {
            debug!(removed = removed, "Rate limiter cleanup completed");
        }
    }

    pub fn start_cleanup_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval_duration = self.cleanup_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_duration);

            loop {
                interval.tick().await;
                self.prune();
            }
        })
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = limiter.client_ip(request.headers(), peer);

    if !limiter.check(&ip) {
        warn!("Rate limit exceeded for {}", ip);
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn settings(trust_forwarded_for: bool) -> RateLimitSettings {
        RateLimitSettings {
            per_second: 1,
            burst: 2,
            trust_forwarded_for,
            ..Default::default()
        }
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_client_ip_ignores_forwarded_for_by_default() {
        let limiter = ClientRateLimiter::new(&settings(false));
        let peer: SocketAddr = "192.0.2.10:9000".parse().unwrap();

        let headers = forwarded("203.0.113.7");
        assert_eq!(limiter.client_ip(&headers, Some(peer)), peer.ip());
        assert_eq!(
            limiter.client_ip(&HeaderMap::new(), None),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_trusted_proxy_uses_last_hop() {
        let limiter = ClientRateLimiter::new(&settings(true));
        let peer: SocketAddr = "10.0.0.1:9000".parse().unwrap();

        // Left-most entries are client supplied
        let headers = forwarded("1.2.3.4, 203.0.113.7");
        assert_eq!(
            limiter.client_ip(&headers, Some(peer)),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
        assert_eq!(limiter.client_ip(&forwarded("garbage"), Some(peer)), peer.ip());
    }

    #[test]
    fn test_rotating_forwarded_for_does_not_reset_quota() {
        let limiter = ClientRateLimiter::new(&settings(false));
        let peer: SocketAddr = "198.51.100.1:5000".parse().unwrap();

        let mut allowed = 0;
        for i in 0..10 {
            let headers = forwarded(&format!("203.0.113.{}", i));
            let ip = limiter.client_ip(&headers, Some(peer));
            if limiter.check(&ip) {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 2);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_burst_is_enforced_per_ip() {
        let limiter = ClientRateLimiter::new(&settings(false));
        let a: IpAddr = "198.51.100.1".parse().unwrap();
        let b: IpAddr = "198.51.100.2".parse().unwrap();

        assert!(limiter.check(&a));
        assert!(limiter.check(&a));
        assert!(!limiter.check(&a));
        assert!(limiter.check(&b));
    }

    #[tokio::test]
    async fn test_prune_drops_replenished_clients() {
        let limiter = ClientRateLimiter::new(&RateLimitSettings {
            per_second: 1000,
            burst: 1,
            ..Default::default()
        });
        for i in 0..50u8 {
            limiter.check(&IpAddr::V4(Ipv4Addr::new(198, 51, 100, i)));
        }
        assert_eq!(limiter.tracked_clients(), 50);

        tokio::time::sleep(Duration::from_millis(20)).await;
        limiter.prune();
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
