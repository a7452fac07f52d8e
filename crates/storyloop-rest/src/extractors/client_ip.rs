//! Client address extractor.

use crate::state::AppState;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use storyloop_security::ClientAddressSources;

/// The caller's address and its salted hash.
///
/// Only the hash is handed to services; raw addresses are never stored.
#[derive(Debug, Clone)]
pub struct ClientIp {
    pub address: String,
    pub hash: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let address = ClientAddressSources {
            forwarded_for: header(&parts.headers, "x-forwarded-for"),
            real_ip: header(&parts.headers, "x-real-ip"),
            remote_addr: header(&parts.headers, "remote-addr"),
            peer,
        }
        .resolve();

        let hash = state.ip_hasher.hash(&address);
        Ok(Self { address, hash })
    }
}
