use zbus::zvariant::OwnedObjectPath;

use crate::daemon::SharedCore;

/// `/org/blackox/Loom/Interfaces` — the Interfaces inventory singleton (§6).
pub struct InterfacesIface {
    pub core: SharedCore,
}

#[zbus::interface(name = "org.blackox.Loom.Interfaces")]
impl InterfacesIface {
    #[zbus(property)]
    async fn paths(&self) -> Vec<OwnedObjectPath> {
        self.core.lock().await.interfaces.paths()
    }

    #[zbus(property)]
    async fn active_paths(&self) -> Vec<OwnedObjectPath> {
        self.core.lock().await.interfaces.active_paths().to_vec()
    }
}
