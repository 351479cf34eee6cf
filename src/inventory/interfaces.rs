use std::collections::HashMap;
use std::sync::Arc;

use zbus::zvariant::OwnedObjectPath;

use crate::model::Interface;
use crate::netlink::LinkControl;

/// Inventory of discovered [`Interface`]s (§3, §4.6). Built once at daemon
/// construction from a link-layer enumeration; membership never changes
/// afterwards ("no hot-plug discovery after startup").
#[derive(Default)]
pub struct Interfaces {
    entries: HashMap<OwnedObjectPath, Interface>,
    active_paths: Vec<OwnedObjectPath>,
}

impl Interfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly constructed, already-published interface. Called
    /// only during daemon startup enumeration.
    pub fn insert(&mut self, interface: Interface) {
        self.entries.insert(interface.object_path().clone(), interface);
    }

    pub fn by_path(&self, path: &OwnedObjectPath) -> Option<&Interface> {
        self.entries.get(path)
    }

    pub fn by_path_mut(&mut self, path: &OwnedObjectPath) -> Option<&mut Interface> {
        self.entries.get_mut(path)
    }

    pub fn by_name(&self, name: &str) -> Option<&Interface> {
        self.entries.values().find(|i| i.name() == name)
    }

    pub fn paths(&self) -> Vec<OwnedObjectPath> {
        self.entries.keys().cloned().collect()
    }

    pub fn active_paths(&self) -> &[OwnedObjectPath] {
        &self.active_paths
    }

    /// Appends to `active_paths`. No duplicate check: the caller
    /// (`Connections::add`) guarantees uniqueness via invariant 2.
    pub fn add_active(&mut self, path: &OwnedObjectPath) {
        self.active_paths.push(path.clone());
    }

    pub fn remove_active(&mut self, path: &OwnedObjectPath) {
        self.active_paths.retain(|p| p != path);
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&OwnedObjectPath, &mut Interface)> {
        self.entries.iter_mut()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Enumerate kernel links and populate an `Interfaces` inventory (§4.6).
pub async fn discover(
    object_root: &str,
    netlink: &Arc<dyn LinkControl>,
) -> Result<Interfaces, crate::netlink::NetlinkError> {
    let mut inventory = Interfaces::new();
    for link in netlink.list_links().await? {
        let path = crate::dbus::paths::interface_path(object_root, &link.name);
        let admin_up = link.info.admin_up();
        let interface = Interface::new(
            link.name,
            link.info.mac,
            admin_up,
            link.info.carrier,
            path,
            netlink.clone(),
        );
        inventory.insert(interface);
    }
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fake::FakeLinkControl;

    #[tokio::test]
    async fn discover_populates_from_link_control() {
        let fake = Arc::new(FakeLinkControl::new());
        fake.add_link("eth0", "AA:BB:CC:DD:EE:FF", true);
        fake.add_link("eth1", "00:11:22:33:44:55", false);
        let netlink: Arc<dyn LinkControl> = fake;

        let inventory = discover("/org/blackox/Loom", &netlink).await.unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(inventory.by_name("eth0").is_some());
        assert!(inventory.by_name("eth1").is_some());
    }

    #[test]
    fn add_active_remove_active_round_trip() {
        let fake: Arc<dyn LinkControl> = Arc::new(FakeLinkControl::new());
        let path = OwnedObjectPath::try_from("/org/blackox/Loom/Interface/eth0".to_owned()).unwrap();
        let interface = Interface::new(
            "eth0".to_owned(),
            "AA:BB:CC:DD:EE:FF".to_owned(),
            true,
            true,
            path.clone(),
            fake,
        );
        let mut inventory = Interfaces::new();
        inventory.insert(interface);

        inventory.add_active(&path);
        assert_eq!(inventory.active_paths(), &[path.clone()]);
        inventory.remove_active(&path);
        assert!(inventory.active_paths().is_empty());
    }
}
