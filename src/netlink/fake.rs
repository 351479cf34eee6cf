//! In-memory [`LinkControl`] double used by the object-manager test suite
//! (§8's scenarios require root and a live kernel, so the state-machine
//! tests drive this instead).

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Mutex;

use super::{DiscoveredLink, LinkControl, LinkInfo, NetlinkError};

#[derive(Debug, Default)]
struct FakeLink {
    up: bool,
    carrier: bool,
    mac: String,
    addresses: HashSet<String>,
}

#[derive(Default)]
pub struct FakeLinkControl {
    links: Mutex<HashMap<String, FakeLink>>,
    default_route: Mutex<Option<Ipv4Addr>>,
}

impl FakeLinkControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&self, name: &str, mac: &str, carrier: bool) {
        self.links.lock().unwrap().insert(
            name.to_owned(),
            FakeLink {
                up: false,
                carrier,
                mac: mac.to_owned(),
                addresses: HashSet::new(),
            },
        );
    }

    pub fn set_carrier(&self, name: &str, carrier: bool) {
        if let Some(link) = self.links.lock().unwrap().get_mut(name) {
            link.carrier = carrier;
        }
    }

    pub fn is_up(&self, name: &str) -> bool {
        self.links.lock().unwrap().get(name).is_some_and(|l| l.up)
    }

    pub fn has_address(&self, name: &str, cidr: &str) -> bool {
        self.links
            .lock()
            .unwrap()
            .get(name)
            .is_some_and(|l| l.addresses.contains(cidr))
    }

    pub fn default_route(&self) -> Option<Ipv4Addr> {
        *self.default_route.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl LinkControl for FakeLinkControl {
    async fn list_links(&self) -> Result<Vec<DiscoveredLink>, NetlinkError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .map(|(name, link)| DiscoveredLink {
                name: name.clone(),
                info: LinkInfo {
                    mac: link.mac.clone(),
                    flags: if link.up { super::flags::IFF_UP } else { 0 },
                    carrier: link.carrier,
                },
            })
            .collect())
    }

    async fn read_link(&self, name: &str) -> Result<LinkInfo, NetlinkError> {
        let links = self.links.lock().unwrap();
        let link = links
            .get(name)
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;
        Ok(LinkInfo {
            mac: link.mac.clone(),
            flags: if link.up { super::flags::IFF_UP } else { 0 },
            carrier: link.carrier,
        })
    }

    async fn set_link_up(&self, name: &str) -> Result<(), NetlinkError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .get_mut(name)
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;
        link.up = true;
        Ok(())
    }

    async fn set_link_down(&self, name: &str) -> Result<(), NetlinkError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .get_mut(name)
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;
        link.up = false;
        Ok(())
    }

    async fn add_address(&self, name: &str, cidr: &str) -> Result<(), NetlinkError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .get_mut(name)
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;
        if !link.addresses.insert(cidr.to_owned()) {
            return Err(NetlinkError::already_exists(format!(
                "{cidr} already present on '{name}'"
            )));
        }
        Ok(())
    }

    async fn del_address(&self, name: &str, cidr: &str) -> Result<(), NetlinkError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .get_mut(name)
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;
        if !link.addresses.remove(cidr) {
            return Err(NetlinkError::not_found(format!(
                "{cidr} not present on '{name}'"
            )));
        }
        Ok(())
    }

    async fn add_default_route(&self, gateway: Ipv4Addr) -> Result<(), NetlinkError> {
        *self.default_route.lock().unwrap() = Some(gateway);
        Ok(())
    }

    async fn del_default_route(&self, gateway: Ipv4Addr) -> Result<(), NetlinkError> {
        let mut route = self.default_route.lock().unwrap();
        if *route == Some(gateway) {
            *route = None;
            Ok(())
        } else {
            Err(NetlinkError::not_found(format!(
                "no default route via {gateway}"
            )))
        }
    }
}
