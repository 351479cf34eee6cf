use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use zbus::zvariant::OwnedObjectPath;

use crate::error::LoomError;
use crate::inventory::{Interfaces, Settings};
use crate::model::connection::connection_id;
use crate::model::Connection;
use crate::netlink::LinkControl;
use crate::resolver::ResolvWrite;

/// The coordinator: enforces uniqueness and activation invariants across
/// Interfaces and Settings, and orchestrates apply/revert (§4.8).
#[derive(Default)]
pub struct Connections {
    entries: HashMap<OwnedObjectPath, Connection>,
    active_paths: Vec<OwnedObjectPath>,
    next_id: AtomicU64,
    object_root: String,
}

impl Connections {
    pub fn new(object_root: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            active_paths: Vec::new(),
            next_id: AtomicU64::new(1),
            object_root: object_root.into(),
        }
    }

    pub fn paths(&self) -> Vec<OwnedObjectPath> {
        self.entries.keys().cloned().collect()
    }

    pub fn active_paths(&self) -> &[OwnedObjectPath] {
        &self.active_paths
    }

    pub fn by_path(&self, path: &OwnedObjectPath) -> Option<&Connection> {
        self.entries.get(path)
    }

    pub fn create(
        &mut self,
        interface_path: &OwnedObjectPath,
        setting_path: &OwnedObjectPath,
        interfaces: &Interfaces,
        settings: &Settings,
        netlink: Arc<dyn LinkControl>,
    ) -> Result<OwnedObjectPath, LoomError> {
        let interface = interfaces
            .by_path(interface_path)
            .ok_or_else(|| LoomError::invalid("no such 'interface'"))?;
        let setting = settings
            .by_path(setting_path)
            .ok_or_else(|| LoomError::invalid("no such 'setting'"))?;

        let id = connection_id(setting.uuid(), interface.name());
        if self.entries.values().any(|c| c.id() == id) {
            return Err(LoomError::invalid("connection already exists"));
        }

        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let path = crate::dbus::paths::connection_path(&self.object_root, n);
        let connection = Connection::new(
            interface_path.clone(),
            setting_path.clone(),
            id,
            path.clone(),
            netlink,
        );
        self.entries.insert(path.clone(), connection);
        Ok(path)
    }

    pub fn destroy(&mut self, path: &OwnedObjectPath) -> Result<(), LoomError> {
        if !self.entries.contains_key(path) {
            return Err(LoomError::invalid("not found"));
        }
        if self.active_paths.contains(path) {
            return Err(LoomError::invalid("is active"));
        }
        self.entries.remove(path);
        Ok(())
    }

    /// Activate a connection: bring its interface up, install its
    /// addressing, gateway and resolver config (§4.8).
    pub async fn add(
        &mut self,
        path: &OwnedObjectPath,
        interfaces: &mut Interfaces,
        settings: &mut Settings,
        resolver: &dyn ResolvWrite,
    ) -> Result<(), LoomError> {
        let connection = self
            .entries
            .get(path)
            .ok_or_else(|| LoomError::invalid("not found"))?;

        if self.active_paths.contains(path) {
            return Err(LoomError::invalid("already in use"));
        }

        let interface_name = connection.interface_name().to_owned();
        let collides = self.active_paths.iter().any(|p| {
            self.entries
                .get(p)
                .is_some_and(|c| c.interface_name() == interface_name)
        });
        if collides {
            return Err(LoomError::invalid("interface already in use"));
        }

        let interface_path = connection.interface_path().clone();
        let setting_path = connection.setting_path().clone();

        let interface = interfaces
            .by_path(&interface_path)
            .ok_or_else(|| LoomError::invalid("no such 'interface'"))?;
        let setting = settings
            .by_path(&setting_path)
            .ok_or_else(|| LoomError::invalid("no such 'setting'"))?;

        connection.apply(interface, setting, resolver).await;

        self.active_paths.push(path.clone());
        interfaces.add_active(&interface_path);
        settings.add_active(&setting_path);
        Ok(())
    }

    /// Deactivate a connection: reverse `add` (§4.8).
    pub async fn delete(
        &mut self,
        path: &OwnedObjectPath,
        interfaces: &mut Interfaces,
        settings: &mut Settings,
        resolver: &dyn ResolvWrite,
    ) -> Result<(), LoomError> {
        let connection = self
            .entries
            .get(path)
            .ok_or_else(|| LoomError::invalid("not found"))?;

        if self.active_paths.is_empty() {
            return Err(LoomError::invalid("no connections active"));
        }
        if !self.active_paths.contains(path) {
            return Err(LoomError::invalid("not active"));
        }

        let interface_path = connection.interface_path().clone();
        let setting_path = connection.setting_path().clone();

        let interface = interfaces
            .by_path(&interface_path)
            .ok_or_else(|| LoomError::invalid("no such 'interface'"))?;
        let setting = settings
            .by_path(&setting_path)
            .ok_or_else(|| LoomError::invalid("no such 'setting'"))?;

        connection.revert(interface, setting, resolver).await;

        self.active_paths.retain(|p| p != path);
        interfaces.remove_active(&interface_path);
        settings.remove_active(&setting_path);
        Ok(())
    }
}
