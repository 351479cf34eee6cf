use zbus::Connection;
use zbus::object_server::SignalEmitter;
use zbus::zvariant::OwnedObjectPath;

use crate::daemon::SharedCore;

/// `/org/blackox/Loom/Interface/<name>` (§6, §4.3).
pub struct InterfaceIface {
    pub core: SharedCore,
    pub path: OwnedObjectPath,
}

#[zbus::interface(name = "org.blackox.Loom.Interface")]
impl InterfaceIface {
    #[zbus(property)]
    async fn name(&self) -> String {
        self.core
            .lock()
            .await
            .interfaces
            .by_path(&self.path)
            .map(|i| i.name().to_owned())
            .unwrap_or_default()
    }

    #[zbus(property)]
    async fn address(&self) -> String {
        self.core
            .lock()
            .await
            .interfaces
            .by_path(&self.path)
            .map(|i| i.mac().to_owned())
            .unwrap_or_default()
    }

    #[zbus(property)]
    async fn state(&self) -> bool {
        self.core
            .lock()
            .await
            .interfaces
            .by_path(&self.path)
            .map(|i| i.state())
            .unwrap_or(false)
    }

    #[zbus(property)]
    async fn carrier(&self) -> bool {
        self.core
            .lock()
            .await
            .interfaces
            .by_path(&self.path)
            .map(|i| i.carrier())
            .unwrap_or(false)
    }

    /// Emitted by the daemon tick when admin state or carrier flip (§4.3).
    #[zbus(signal)]
    pub async fn changed(emitter: &SignalEmitter<'_>) -> zbus::Result<()>;
}

/// Emit `PropertiesChanged` plus the `changed` signal for one interface.
pub async fn notify_changed(conn: &Connection, path: &OwnedObjectPath) {
    let Ok(object_path) = zbus::zvariant::ObjectPath::try_from(path.as_str()) else {
        return;
    };
    if let Ok(iface) = conn
        .object_server()
        .interface::<_, InterfaceIface>(object_path)
        .await
    {
        let _ = InterfaceIface::changed(iface.signal_emitter()).await;
    }
}
