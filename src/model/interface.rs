use std::sync::Arc;

use zbus::zvariant::OwnedObjectPath;

use crate::netlink::{LinkControl, NetlinkError};

/// One physical link (§3, §4.3). Created once per non-loopback, non-virtual
/// link discovered at startup and never destroyed during the daemon's
/// lifetime. `name` and `mac` are immutable after construction; `state` and
/// `carrier` are mutated only by the tick reconciler and by the netlink
/// calls issued from `Connection::apply`/`revert`.
pub struct Interface {
    name: String,
    mac: String,
    state: bool,
    carrier: bool,
    object_path: OwnedObjectPath,
    netlink: Arc<dyn LinkControl>,
}

impl Interface {
    pub fn new(
        name: String,
        mac: String,
        state: bool,
        carrier: bool,
        object_path: OwnedObjectPath,
        netlink: Arc<dyn LinkControl>,
    ) -> Self {
        Self {
            name,
            mac,
            state,
            carrier,
            object_path,
            netlink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn state(&self) -> bool {
        self.state
    }

    pub fn carrier(&self) -> bool {
        self.carrier
    }

    pub fn object_path(&self) -> &OwnedObjectPath {
        &self.object_path
    }

    pub async fn set_up(&self) -> Result<(), NetlinkError> {
        self.netlink.set_link_up(&self.name).await
    }

    pub async fn set_down(&self) -> Result<(), NetlinkError> {
        self.netlink.set_link_down(&self.name).await
    }

    pub async fn add_address(&self, cidr: &str) -> Result<(), NetlinkError> {
        self.netlink.add_address(&self.name, cidr).await
    }

    pub async fn del_address(&self, cidr: &str) -> Result<(), NetlinkError> {
        self.netlink.del_address(&self.name, cidr).await
    }

    /// Re-read flags/carrier from the kernel (§4.3 reconciliation). Returns
    /// `true` if either admin state or carrier changed, in which case the
    /// cached copy is updated and the caller should emit `changed`.
    pub async fn reconcile(&mut self) -> bool {
        let Ok(info) = self.netlink.read_link(&self.name).await else {
            return false;
        };
        let new_state = info.admin_up();
        let changed = new_state != self.state || info.carrier != self.carrier;
        if changed {
            self.state = new_state;
            self.carrier = info.carrier;
        }
        changed
    }
}
