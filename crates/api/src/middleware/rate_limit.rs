//! Brute-force protection for `POST /api/auth/login`.
//!
//! Attempts are counted per client IP with `governor`'s GCRA limiter: a burst
//! of five, then one more every six seconds. The client IP is the TCP peer
//! unless `API_CLIENT_IP_HEADER` names the header a fronting proxy sets.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, Request};
use axum::response::IntoResponse;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::key_extractor::KeyExtractor;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

const LOGIN_BURST: u32 = 5;
const LOGIN_REPLENISH_SECS: u64 = 6;

/// Rate-limit key.
///
/// With no header configured every request is keyed on its socket peer, so
/// clients cannot pick their own bucket. A configured header is read from
/// its rightmost entry, the one appended by the proxy itself.
#[derive(Debug, Clone, Default)]
pub struct ClientIp {
    header: Option<HeaderName>,
}

impl ClientIp {
    #[must_use]
    pub const fn new(header: Option<HeaderName>) -> Self {
        Self { header }
    }

    fn forwarded<T>(&self, req: &Request<T>) -> Option<IpAddr> {
        let value = req.headers().get(self.header.as_ref()?)?.to_str().ok()?;
        value.rsplit(',').next()?.trim().parse().ok()
    }
}

impl KeyExtractor for ClientIp {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<IpAddr, GovernorError> {
        self.forwarded(req)
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type LoginRateLimit = GovernorLayer<ClientIp, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Layer for the login route. Rejected attempts get a `429` error envelope
/// with `Retry-After`.
///
/// # Panics
///
/// Never in practice: the builder only fails for a zero period or burst.
#[must_use]
pub fn auth_rate_limiter(client_ip_header: Option<HeaderName>) -> LoginRateLimit {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIp::new(client_ip_header))
        .per_second(LOGIN_REPLENISH_SECS)
        .burst_size(LOGIN_BURST)
        .finish()
        .expect("login rate limit has a non-zero period and burst");
    GovernorLayer::new(Arc::new(config))
        .error_handler(|err| AppError::from(err).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn login(headers: &[(&str, &str)], peer: Option<&str>) -> Request<()> {
        let mut req = headers
            .iter()
            .fold(Request::post("/api/auth/login"), |b, (k, v)| b.header(*k, *v))
            .body(())
            .unwrap();
        if let Some(peer) = peer {
            req.extensions_mut()
                .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        }
        req
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_proxy_headers_ignored_by_default() {
        let req = login(
            &[
                ("x-real-ip", "203.0.113.7"),
                ("x-forwarded-for", "198.51.100.4"),
                ("cf-connecting-ip", "198.51.100.5"),
            ],
            Some("192.0.2.1:5555"),
        );
        assert_eq!(ClientIp::default().extract(&req).unwrap(), ip("192.0.2.1"));
    }

    #[test]
    fn test_configured_header_wins() {
        let key = ClientIp::new(Some(HeaderName::from_static("fly-client-ip")));
        let req = login(
            &[("fly-client-ip", " 2001:db8::1 "), ("x-real-ip", "203.0.113.7")],
            Some("10.0.0.2:443"),
        );
        assert_eq!(key.extract(&req).unwrap(), ip("2001:db8::1"));
    }

    #[test]
    fn test_configured_list_header_uses_last_hop() {
        let key = ClientIp::new(Some(HeaderName::from_static("x-forwarded-for")));
        let req = login(
            &[("x-forwarded-for", "6.6.6.6, 198.51.100.4")],
            Some("10.0.0.2:443"),
        );
        assert_eq!(key.extract(&req).unwrap(), ip("198.51.100.4"));
    }

    #[test]
    fn test_unparsable_header_falls_back_to_peer() {
        let key = ClientIp::new(Some(HeaderName::from_static("x-real-ip")));
        let req = login(&[("x-real-ip", "unknown")], Some("192.0.2.1:5555"));
        assert_eq!(key.extract(&req).unwrap(), ip("192.0.2.1"));
    }

    #[test]
    fn test_no_address_is_an_error() {
        assert!(ClientIp::default().extract(&login(&[], None)).is_err());
        let spoofed = login(&[("x-real-ip", "203.0.113.7")], None);
        assert!(ClientIp::default().extract(&spoofed).is_err());
    }
}
