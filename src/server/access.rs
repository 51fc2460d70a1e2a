//! Single-address allow-list.

use crate::error::AppError;
use crate::server::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};

/// Whether `remote` passes the configured allow-list.
pub fn is_allowed(allowed: Option<IpAddr>, remote: Option<IpAddr>) -> bool {
    match (allowed, remote) {
        (None, _) => true,
        (Some(allowed), Some(remote)) => allowed.to_canonical() == remote.to_canonical(),
        (Some(_), None) => false,
    }
}

/// Reject requests from any address but the configured one with 403.
pub async fn ip_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !is_allowed(state.config.server.allowed_ip, remote) {
        tracing::warn!(remote = ?remote, path = %req.uri().path(), "Rejected by allow-list");
        return AppError::Forbidden.into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_allow_list_admits_everyone() {
        assert!(is_allowed(None, Some("10.0.0.2".parse().unwrap())));
        assert!(is_allowed(None, None));
    }

    #[test]
    fn allow_list_is_exact_match() {
        let allowed = Some("10.0.0.1".parse().unwrap());
        assert!(is_allowed(allowed, Some("10.0.0.1".parse().unwrap())));
        assert!(!is_allowed(allowed, Some("10.0.0.2".parse().unwrap())));
        assert!(!is_allowed(allowed, None));
    }

    #[test]
    fn mapped_ipv6_matches_ipv4() {
        let allowed = Some("10.0.0.1".parse().unwrap());
        assert!(is_allowed(allowed, Some("::ffff:10.0.0.1".parse().unwrap())));
    }
}
