use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use zbus::Connection;

use crate::config::Config;
use crate::dbus;
use crate::inventory::{Connections, Interfaces, Settings};
use crate::netlink::LinkControl;
use crate::resolver::ResolvWrite;

/// All mutable object-manager state, behind one lock. Every IPC handler and
/// every tick acquires this for the duration of its work, so side effects
/// from one caller are fully visible before the next begins — the
/// single-writer ordering guarantee of §5, without hand-rolling a
/// single-threaded executor.
pub struct Core {
    pub interfaces: Interfaces,
    pub settings: Settings,
    pub connections: Connections,
    pub netlink: Arc<dyn LinkControl>,
    pub resolver: Arc<dyn ResolvWrite>,
    pub object_root: String,
}

pub type SharedCore = Arc<Mutex<Core>>;

/// Process-wide hub (§4.9): owns the three inventories via [`Core`], the
/// transport connection, and the 1 Hz tick task.
pub struct Daemon {
    core: SharedCore,
    conn: Connection,
    tick: tokio::task::JoinHandle<()>,
}

impl Daemon {
    /// Enumerate links, build the three inventories in dependency order,
    /// publish them on the transport, and start the tick.
    pub async fn start(
        config: Config,
        netlink: Arc<dyn LinkControl>,
        resolver: Arc<dyn ResolvWrite>,
    ) -> crate::Result<Self> {
        let interfaces = crate::inventory::interfaces::discover(&config.object_root, &netlink)
            .await
            .map_err(|e| crate::Error::Io(std::io::Error::other(e.to_string())))?;
        info!(count = interfaces.paths().len(), "discovered interfaces");

        let settings = Settings::new(config.object_root.clone());
        let connections = Connections::new(config.object_root.clone());

        let core = Arc::new(Mutex::new(Core {
            interfaces,
            settings,
            connections,
            netlink,
            resolver,
            object_root: config.object_root.clone(),
        }));

        let conn = dbus::serve(core.clone(), &config).await?;
        info!(bus_name = %config.bus_name, "claimed bus name");

        let tick = tokio::spawn(tick_loop(core.clone(), conn.clone(), config.tick_interval));

        Ok(Self { core, conn, tick })
    }

    /// Release the inventories in reverse order: Connections first so the
    /// Interfaces/Settings they reference outlive their referrers (§4.9).
    pub async fn shutdown(self) {
        self.tick.abort();
        let mut core = self.core.lock().await;
        core.connections = Connections::new(core.object_root.clone());
        core.settings = Settings::new(core.object_root.clone());
        core.interfaces = Interfaces::new();
        debug!("daemon shut down");
    }
}

/// The 1 Hz reconciliation clock (§4.3, §4.9). Iterates Interfaces once per
/// tick and asks each whether its admin state or carrier changed.
async fn tick_loop(core: SharedCore, conn: Connection, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let changed: Vec<zbus::zvariant::OwnedObjectPath> = {
            let mut core = core.lock().await;
            let mut changed = Vec::new();
            for (path, interface) in core.interfaces.iter_mut() {
                if interface.reconcile().await {
                    changed.push(path.clone());
                }
            }
            changed
        };

        for path in changed {
            dbus::interface::notify_changed(&conn, &path).await;
        }
    }
}
