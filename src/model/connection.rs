use std::sync::Arc;

use tracing::warn;
use zbus::zvariant::OwnedObjectPath;

use crate::model::{Interface, Setting};
use crate::netlink::LinkControl;
use crate::resolver::ResolvWrite;

/// A binding {Interface, Setting} and the unit of activation (§3, §4.5).
pub struct Connection {
    interface_path: OwnedObjectPath,
    setting_path: OwnedObjectPath,
    id: String,
    object_path: OwnedObjectPath,
    netlink: Arc<dyn LinkControl>,
}

impl Connection {
    pub fn new(
        interface_path: OwnedObjectPath,
        setting_path: OwnedObjectPath,
        id: String,
        object_path: OwnedObjectPath,
        netlink: Arc<dyn LinkControl>,
    ) -> Self {
        Self {
            interface_path,
            setting_path,
            id,
            object_path,
            netlink,
        }
    }

    /// `setting.uuid + "%" + interface.name`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn interface_path(&self) -> &OwnedObjectPath {
        &self.interface_path
    }

    pub fn setting_path(&self) -> &OwnedObjectPath {
        &self.setting_path
    }

    pub fn object_path(&self) -> &OwnedObjectPath {
        &self.object_path
    }

    /// The interface name this connection's id is keyed on — the suffix
    /// after `%` (§4.8's "interface already in use" check).
    pub fn interface_name(&self) -> &str {
        self.id.split('%').nth(1).unwrap_or_default()
    }

    /// Apply the profile to the kernel and resolver (§4.5). Individual
    /// netlink failures that mean "already in the desired state" are
    /// tolerated silently; anything else is logged and does not abort the
    /// remaining steps — resynchronisation happens on the next activation
    /// (§7). The inventory always considers this call a success and marks
    /// the connection active once it returns.
    pub async fn apply(&self, interface: &Interface, setting: &Setting, resolver: &dyn ResolvWrite) {
        let config = setting.configuration();
        let cidr = config.address_cidr();

        if let Err(e) = interface.set_up().await {
            warn!(connection = %self.id, "set_link_up failed: {e}");
        }
        if let Err(e) = interface.add_address(&cidr).await
            && e.kind != crate::netlink::NetlinkErrorKind::AlreadyExists
        {
            warn!(connection = %self.id, "add_address failed: {e}");
        }

        if let Some(router) = config.router
            && let Err(e) = self.netlink.add_default_route(router).await
        {
            warn!(connection = %self.id, "add_default_route failed: {e}");
        }

        if config.has_dns()
            && let Err(e) = resolver
                .write(&config.nameservers, config.domain.as_deref(), &config.searches)
                .await
        {
            warn!(connection = %self.id, "resolver write failed: {e}");
        }
    }

    /// Reverse of `apply` (§4.5).
    pub async fn revert(&self, interface: &Interface, setting: &Setting, resolver: &dyn ResolvWrite) {
        let config = setting.configuration();
        let cidr = config.address_cidr();

        if let Err(e) = interface.set_down().await {
            warn!(connection = %self.id, "set_link_down failed: {e}");
        }
        if let Err(e) = interface.del_address(&cidr).await
            && e.kind != crate::netlink::NetlinkErrorKind::NotFound
        {
            warn!(connection = %self.id, "del_address failed: {e}");
        }

        if let Some(router) = config.router
            && let Err(e) = self.netlink.del_default_route(router).await
            && e.kind != crate::netlink::NetlinkErrorKind::NotFound
        {
            warn!(connection = %self.id, "del_default_route failed: {e}");
        }

        if config.has_dns()
            && let Err(e) = resolver.erase().await
        {
            warn!(connection = %self.id, "resolver erase failed: {e}");
        }
    }
}

/// `setting.uuid + "%" + interface.name`.
pub fn connection_id(setting_uuid: &str, interface_name: &str) -> String {
    format!("{setting_uuid}%{interface_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::setting::SettingConfig;
    use crate::netlink::fake::FakeLinkControl;
    use crate::resolver::FakeResolver;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    fn path(s: &str) -> OwnedObjectPath {
        OwnedObjectPath::try_from(s.to_owned()).unwrap()
    }

    #[tokio::test]
    async fn apply_then_revert_round_trips_kernel_state() {
        let fake = Arc::new(FakeLinkControl::new());
        fake.add_link("eth0", "AA:BB:CC:DD:EE:FF", true);
        let resolver = FakeResolver::new();

        let interface = Interface::new(
            "eth0".to_owned(),
            "AA:BB:CC:DD:EE:FF".to_owned(),
            false,
            true,
            path("/org/blackox/Loom/Interface/eth0"),
            fake.clone(),
        );

        let config = SettingConfig {
            address: "10.0.0.5".parse::<Ipv4Addr>().unwrap(),
            prefix: 24,
            router: Some("10.0.0.1".parse().unwrap()),
            nameservers: vec!["8.8.8.8".parse().unwrap()],
            domain: None,
            searches: vec![],
        };
        let setting = Setting::new(
            "11111111-1111-1111-1111-111111111111".to_owned(),
            config,
            path("/org/blackox/Loom/Setting/1"),
        );

        let connection = Connection::new(
            interface.object_path().clone(),
            setting.object_path().clone(),
            connection_id(setting.uuid(), interface.name()),
            path("/org/blackox/Loom/Connection/1"),
            fake.clone(),
        );

        connection.apply(&interface, &setting, &resolver).await;
        assert!(fake.is_up("eth0"));
        assert!(fake.has_address("eth0", "10.0.0.5/24"));
        assert_eq!(fake.default_route(), Some("10.0.0.1".parse().unwrap()));
        assert!(resolver.contents().unwrap().contains("nameserver 8.8.8.8"));

        connection.revert(&interface, &setting, &resolver).await;
        assert!(!fake.is_up("eth0"));
        assert!(!fake.has_address("eth0", "10.0.0.5/24"));
        assert!(fake.default_route().is_none());
        assert!(resolver.contents().is_none());
    }

    #[tokio::test]
    async fn apply_without_router_never_touches_default_route() {
        let fake = Arc::new(FakeLinkControl::new());
        fake.add_link("eth1", "00:11:22:33:44:55", true);
        let resolver = FakeResolver::new();

        let interface = Interface::new(
            "eth1".to_owned(),
            "00:11:22:33:44:55".to_owned(),
            false,
            true,
            path("/org/blackox/Loom/Interface/eth1"),
            fake.clone(),
        );
        let config = SettingConfig {
            address: "192.168.1.2".parse().unwrap(),
            prefix: 24,
            router: None,
            nameservers: vec![],
            domain: None,
            searches: vec![],
        };
        let setting = Setting::new(
            "22222222-2222-2222-2222-222222222222".to_owned(),
            config,
            path("/org/blackox/Loom/Setting/2"),
        );
        let connection = Connection::new(
            interface.object_path().clone(),
            setting.object_path().clone(),
            connection_id(setting.uuid(), interface.name()),
            path("/org/blackox/Loom/Connection/2"),
            fake.clone(),
        );

        connection.apply(&interface, &setting, &resolver).await;
        assert!(fake.default_route().is_none());
        assert!(resolver.contents().is_none());
    }

    #[test]
    fn id_is_uuid_percent_interface_name() {
        assert_eq!(connection_id("abc", "eth0"), "abc%eth0");
    }
}
