//! Thin capability wrapper over rtnetlink (§4.1 NetlinkAdapter).
//!
//! Every operation opens a fresh rtnetlink session, performs exactly one
//! request, and lets the session drop. Failures are normalised into
//! [`NetlinkError`] so callers never have to match on rtnetlink's own error
//! type; "already exists" / "not found" outcomes are reported as error
//! *kinds* rather than swallowed here, so the caller (`Connection::apply`/
//! `revert`) can decide to tolerate them per §4.5.

pub mod adapter;
pub mod flags;

#[cfg(test)]
pub mod fake;

use std::net::Ipv4Addr;

pub use adapter::RtNetlinkAdapter;

/// Snapshot of a kernel link's attributes, as read by `read_link`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub mac: String,
    pub flags: u32,
    pub carrier: bool,
}

impl LinkInfo {
    pub fn admin_up(&self) -> bool {
        self.flags & flags::IFF_UP != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetlinkErrorKind {
    NotFound,
    AlreadyExists,
    Other,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{detail}")]
pub struct NetlinkError {
    pub kind: NetlinkErrorKind,
    pub detail: String,
}

impl NetlinkError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            kind: NetlinkErrorKind::NotFound,
            detail: detail.into(),
        }
    }

    pub fn already_exists(detail: impl Into<String>) -> Self {
        Self {
            kind: NetlinkErrorKind::AlreadyExists,
            detail: detail.into(),
        }
    }

    pub fn other(detail: impl Into<String>) -> Self {
        Self {
            kind: NetlinkErrorKind::Other,
            detail: detail.into(),
        }
    }
}

/// A link discovered during startup enumeration (§4.6).
#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    pub name: String,
    pub info: LinkInfo,
}

/// Capability surface a [`crate::model::Interface`] and [`crate::model::Connection`]
/// drive to mutate kernel state. Implemented once against real rtnetlink
/// ([`RtNetlinkAdapter`]) and once, under `#[cfg(test)]`, against an
/// in-memory double so the object-manager logic is testable without root.
#[async_trait::async_trait]
pub trait LinkControl: Send + Sync {
    /// Enumerate non-loopback, non-virtual links for startup discovery (§4.6).
    async fn list_links(&self) -> Result<Vec<DiscoveredLink>, NetlinkError>;

    async fn read_link(&self, name: &str) -> Result<LinkInfo, NetlinkError>;

    async fn set_link_up(&self, name: &str) -> Result<(), NetlinkError>;

    async fn set_link_down(&self, name: &str) -> Result<(), NetlinkError>;

    /// Installs `cidr` (`A.B.C.D/N`) on `name`. `AlreadyExists` is the
    /// caller's cue to treat this as success (§4.1).
    async fn add_address(&self, name: &str, cidr: &str) -> Result<(), NetlinkError>;

    /// Removes `cidr` from `name`. `NotFound` is the caller's cue to treat
    /// this as success (§4.1).
    async fn del_address(&self, name: &str, cidr: &str) -> Result<(), NetlinkError>;

    /// Create-or-replace semantics: any prior default route is overwritten.
    async fn add_default_route(&self, gateway: Ipv4Addr) -> Result<(), NetlinkError>;

    async fn del_default_route(&self, gateway: Ipv4Addr) -> Result<(), NetlinkError>;
}
