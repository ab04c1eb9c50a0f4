//! Client address resolution
//!
//! Proxies are trusted by default: the leftmost `X-Forwarded-For` hop wins,
//! then `X-Real-IP`, then the TCP peer.

use hyper::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub fn resolve(headers: &HeaderMap, peer_addr: SocketAddr, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        if let Some(ip) = forwarded_for(headers).or_else(|| real_ip(headers)) {
            return ip;
        }
    }
    peer_addr.ip().to_canonical()
}

/// Leftmost hop, provided every hop in the list is a valid address
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get("x-forwarded-for")?.to_str().ok()?;
    let hops = value
        .split(',')
        .map(|hop| hop.trim().parse::<IpAddr>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    hops.first().copied()
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-real-ip")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
