use zbus::zvariant::OwnedObjectPath;

use crate::daemon::{Core, SharedCore};
use crate::dbus::connection::ConnectionIface;

/// `/org/blackox/Loom/Connections` — the coordinator singleton (§6, §4.8).
pub struct ConnectionsIface {
    pub core: SharedCore,
}

#[zbus::interface(name = "org.blackox.Loom.Connections")]
impl ConnectionsIface {
    #[zbus(property)]
    async fn paths(&self) -> Vec<OwnedObjectPath> {
        self.core.lock().await.connections.paths()
    }

    #[zbus(property)]
    async fn active_paths(&self) -> Vec<OwnedObjectPath> {
        self.core.lock().await.connections.active_paths().to_vec()
    }

    async fn create(
        &self,
        #[zbus(object_server)] object_server: &zbus::ObjectServer,
        interface_path: OwnedObjectPath,
        setting_path: OwnedObjectPath,
    ) -> zbus::fdo::Result<OwnedObjectPath> {
        let path = {
            let mut core = self.core.lock().await;
            let netlink = core.netlink.clone();
            let Core {
                ref mut connections,
                ref interfaces,
                ref settings,
                ..
            } = *core;
            connections.create(&interface_path, &setting_path, interfaces, settings, netlink)?
        };

        object_server
            .at(
                &path,
                ConnectionIface {
                    core: self.core.clone(),
                    path: path.clone(),
                },
            )
            .await?;

        Ok(path)
    }

    async fn destroy(
        &self,
        #[zbus(object_server)] object_server: &zbus::ObjectServer,
        path: OwnedObjectPath,
    ) -> zbus::fdo::Result<()> {
        {
            let mut core = self.core.lock().await;
            core.connections.destroy(&path)?;
        }
        object_server.remove::<ConnectionIface, _>(&path).await?;
        Ok(())
    }

    async fn add(&self, path: OwnedObjectPath) -> zbus::fdo::Result<()> {
        let mut core = self.core.lock().await;
        let Core {
            ref mut connections,
            ref mut interfaces,
            ref mut settings,
            ref resolver,
            ..
        } = *core;
        connections.add(&path, interfaces, settings, resolver.as_ref()).await?;
        Ok(())
    }

    async fn delete(&self, path: OwnedObjectPath) -> zbus::fdo::Result<()> {
        let mut core = self.core.lock().await;
        let Core {
            ref mut connections,
            ref mut interfaces,
            ref mut settings,
            ref resolver,
            ..
        } = *core;
        connections
            .delete(&path, interfaces, settings, resolver.as_ref())
            .await?;
        Ok(())
    }
}
