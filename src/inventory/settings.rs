use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;
use zbus::zvariant::OwnedObjectPath;

use crate::error::LoomError;
use crate::model::setting::validate_configuration;
use crate::model::Setting;

/// Inventory of client-authored [`Setting`]s (§3, §4.7).
#[derive(Default)]
pub struct Settings {
    entries: HashMap<OwnedObjectPath, Setting>,
    active_paths: Vec<OwnedObjectPath>,
    next_id: AtomicU64,
    object_root: String,
}

impl Settings {
    pub fn new(object_root: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            active_paths: Vec::new(),
            next_id: AtomicU64::new(1),
            object_root: object_root.into(),
        }
    }

    /// Validate, construct, insert, and return the new object path.
    pub fn create(
        &mut self,
        configuration: &HashMap<String, zbus::zvariant::OwnedValue>,
    ) -> Result<OwnedObjectPath, LoomError> {
        let parsed = validate_configuration(configuration)?;
        let uuid = Uuid::new_v4().to_string();
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let path = crate::dbus::paths::setting_path(&self.object_root, n);

        let setting = Setting::new(uuid, parsed, path.clone());
        self.entries.insert(path.clone(), setting);
        Ok(path)
    }

    /// Remove iff present and not in `active_paths` (§4.7, §9: active
    /// membership is checked *before* removal — never the reverse).
    pub fn destroy(&mut self, path: &OwnedObjectPath) -> Result<(), LoomError> {
        if !self.entries.contains_key(path) {
            return Err(LoomError::invalid("not found"));
        }
        if self.active_paths.contains(path) {
            return Err(LoomError::invalid("in use"));
        }
        self.entries.remove(path);
        Ok(())
    }

    pub fn by_path(&self, path: &OwnedObjectPath) -> Option<&Setting> {
        self.entries.get(path)
    }

    pub fn paths(&self) -> Vec<OwnedObjectPath> {
        self.entries.keys().cloned().collect()
    }

    pub fn active_paths(&self) -> &[OwnedObjectPath] {
        &self.active_paths
    }

    pub fn add_active(&mut self, path: &OwnedObjectPath) {
        self.active_paths.push(path.clone());
    }

    pub fn remove_active(&mut self, path: &OwnedObjectPath) {
        self.active_paths.retain(|p| p != path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbus::zvariant::{OwnedValue, Value};

    fn cfg(address: &str) -> HashMap<String, OwnedValue> {
        [(
            "address".to_string(),
            OwnedValue::try_from(Value::from(address)).unwrap(),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn create_then_destroy_round_trips() {
        let mut settings = Settings::new("/org/blackox/Loom");
        let path = settings.create(&cfg("10.0.0.5/24")).unwrap();
        assert!(settings.by_path(&path).is_some());

        settings.destroy(&path).unwrap();
        assert!(settings.by_path(&path).is_none());
    }

    #[test]
    fn destroy_while_active_is_rejected() {
        let mut settings = Settings::new("/org/blackox/Loom");
        let path = settings.create(&cfg("10.0.0.5/24")).unwrap();
        settings.add_active(&path);

        let err = settings.destroy(&path).unwrap_err();
        assert_eq!(err, LoomError::invalid("in use"));
        assert!(settings.by_path(&path).is_some());
    }

    #[test]
    fn destroy_missing_is_rejected() {
        let mut settings = Settings::new("/org/blackox/Loom");
        let bogus = OwnedObjectPath::try_from("/org/blackox/Loom/Setting/999".to_owned()).unwrap();
        assert!(settings.destroy(&bogus).is_err());
    }

    #[test]
    fn create_rejects_invalid_prefix() {
        let mut settings = Settings::new("/org/blackox/Loom");
        let err = settings.create(&cfg("10.0.0.5/33")).unwrap_err();
        assert!(matches!(err, LoomError::InvalidArgument(m) if m.contains("address")));
        assert!(settings.paths().is_empty());
    }
}
