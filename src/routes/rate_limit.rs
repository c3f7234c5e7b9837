use axum::{extract::ConnectInfo, http::Request};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

/// Rate-limit key for routes that trigger upstream fetches.
///
/// Uses the first `X-Forwarded-For` hop when the dashboard sits behind a
/// proxy, then the peer address. Requests with neither share the loopback
/// bucket, so a local operator is still limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorKeyExtractor;

impl KeyExtractor for OperatorKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return Ok(ip);
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}
