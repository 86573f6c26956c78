//! IP allow-list enforcement.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use popup_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// One allow-list entry: a network with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AllowEntry {
    network: IpAddr,
    prefix: u8,
}

impl AllowEntry {
    fn parse(raw: &str) -> Result<Self, AppError> {
        let invalid = || AppError::configuration(format!("Invalid IP or CIDR in allow-list: {raw}"));

        let (addr, prefix) = match raw.split_once('/') {
            Some((addr, bits)) => {
                let addr = normalize(addr.trim().parse().map_err(|_| invalid())?);
                let bits: u8 = bits.trim().parse().map_err(|_| invalid())?;
                (addr, bits)
            }
            None => {
                let addr = normalize(raw.parse().map_err(|_| invalid())?);
                (addr, max_prefix(addr))
            }
        };

        if prefix > max_prefix(addr) {
            return Err(invalid());
        }

        Ok(Self {
            network: mask(addr, prefix),
            prefix,
        })
    }

    fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(ip, self.prefix) == self.network
            }
            _ => false,
        }
    }
}

/// A parsed allow-list of IP addresses and CIDR blocks.
///
/// An empty list denies every caller. IPv4-mapped IPv6 addresses
/// (`::ffff:a.b.c.d`) match IPv4 entries.
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    entries: Vec<AllowEntry>,
}

impl AccessList {
    /// Parses entries such as `127.0.0.1`, `192.168.0.0/16`, or `fe80::/10`.
    /// Blank entries are skipped; anything else unparseable is an error.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, AppError> {
        let entries = entries
            .iter()
            .map(|e| e.as_ref().trim())
            .filter(|e| !e.is_empty())
            .map(AllowEntry::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Whether `ip` is allowed.
    pub fn allows(&self, ip: IpAddr) -> bool {
        let ip = normalize(ip);
        self.entries.iter().any(|entry| entry.contains(ip))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the list denies everyone.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

fn max_prefix(ip: IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask(ip: IpAddr, prefix: u8) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let bits = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V4((u32::from(v4) & bits).into())
        }
        IpAddr::V6(v6) => {
            let bits = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V6((u128::from(v6) & bits).into())
        }
    }
}

async fn enforce(
    acl: &AccessList,
    listener: &'static str,
    remote: SocketAddr,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !acl.allows(remote.ip()) {
        warn!(
            remote_ip = %remote.ip(),
            listener,
            path = %request.uri().path(),
            "ACL denied"
        );
        return Err(AppError::authorization("Forbidden (ACL)").into());
    }
    Ok(next.run(request).await)
}

/// Rejects trigger requests from callers outside `access.trigger_allow`.
pub async fn require_trigger_acl(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state.trigger_acl, "trigger", remote, request, next).await
}

/// Rejects WebSocket upgrades from callers outside `access.crmws_allow`.
pub async fn require_client_acl(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state.client_acl, "client", remote, request, next).await
}
