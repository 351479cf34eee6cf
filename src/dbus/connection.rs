use zbus::zvariant::OwnedObjectPath;

use crate::daemon::SharedCore;

/// `/org/blackox/Loom/Connection/<n>` (§6, §4.5).
pub struct ConnectionIface {
    pub core: SharedCore,
    pub path: OwnedObjectPath,
}

#[zbus::interface(name = "org.blackox.Loom.Connection")]
impl ConnectionIface {
    #[zbus(property)]
    async fn interface(&self) -> OwnedObjectPath {
        self.core
            .lock()
            .await
            .connections
            .by_path(&self.path)
            .map(|c| c.interface_path().clone())
            .unwrap_or_default()
    }

    #[zbus(property)]
    async fn setting(&self) -> OwnedObjectPath {
        self.core
            .lock()
            .await
            .connections
            .by_path(&self.path)
            .map(|c| c.setting_path().clone())
            .unwrap_or_default()
    }
}
