use std::collections::HashMap;

use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use crate::daemon::SharedCore;
use crate::dbus::setting::SettingIface;

/// `/org/blackox/Loom/Settings` — the Settings inventory singleton (§6, §4.7).
pub struct SettingsIface {
    pub core: SharedCore,
}

#[zbus::interface(name = "org.blackox.Loom.Settings")]
impl SettingsIface {
    #[zbus(property)]
    async fn paths(&self) -> Vec<OwnedObjectPath> {
        self.core.lock().await.settings.paths()
    }

    #[zbus(property)]
    async fn active_paths(&self) -> Vec<OwnedObjectPath> {
        self.core.lock().await.settings.active_paths().to_vec()
    }

    async fn create(
        &self,
        #[zbus(object_server)] object_server: &zbus::ObjectServer,
        configuration: HashMap<String, OwnedValue>,
    ) -> zbus::fdo::Result<OwnedObjectPath> {
        let path = {
            let mut core = self.core.lock().await;
            core.settings.create(&configuration)?
        };

        object_server
            .at(
                &path,
                SettingIface {
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
            core.settings.destroy(&path)?;
        }
        object_server.remove::<SettingIface, _>(&path).await?;
        Ok(())
    }
}
