//! Rate limiting using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: login/registration, ~10/min per IP
//! - `api_rate_limiter`: everything else under `/api`, ~100/min per IP

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Client IP from proxy headers, then the socket peer.
///
/// Requests with no recoverable address share one bucket.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

const IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-real-ip"];

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        if let Some(ip) = IP_HEADERS
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find_map(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // First hop of X-Forwarded-For
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| {
                addr.ip()
            }))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Auth endpoints: one token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never in practice: the period and burst are fixed non-zero values, which
/// `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// General API: one token per second, burst of 50.
///
/// # Panics
///
/// See [`auth_rate_limiter`].
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    limiter(1, 50)
}

fn limiter(replenish_seconds: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst)
        .finish()
        .expect("non-zero rate limiter period and burst are valid");
    GovernorLayer::new(Arc::new(config))
}
