use zbus::zvariant::OwnedObjectPath;

use crate::daemon::SharedCore;

/// `/org/blackox/Loom/Setting/<n>` (§6, §4.4).
pub struct SettingIface {
    pub core: SharedCore,
    pub path: OwnedObjectPath,
}

#[zbus::interface(name = "org.blackox.Loom.Setting")]
impl SettingIface {
    #[zbus(property)]
    async fn uuid(&self) -> String {
        self.with_setting(|s| s.uuid().to_owned()).await
    }

    #[zbus(property)]
    async fn address(&self) -> String {
        self.with_setting(|s| s.address()).await
    }

    #[zbus(property)]
    async fn router(&self) -> String {
        self.with_setting(|s| s.router().unwrap_or_default()).await
    }

    #[zbus(property)]
    async fn name_servers(&self) -> Vec<String> {
        self.with_setting(|s| s.name_servers()).await
    }

    #[zbus(property)]
    async fn domain(&self) -> String {
        self.with_setting(|s| s.domain().unwrap_or_default().to_owned()).await
    }

    #[zbus(property)]
    async fn searches(&self) -> Vec<String> {
        self.with_setting(|s| s.searches().to_vec()).await
    }
}

impl SettingIface {
    async fn with_setting<T: Default>(&self, f: impl FnOnce(&crate::model::Setting) -> T) -> T {
        self.core
            .lock()
            .await
            .settings
            .by_path(&self.path)
            .map(f)
            .unwrap_or_default()
    }
}
