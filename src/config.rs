use std::path::PathBuf;
use std::time::Duration;

/// Process-wide configuration, read once at startup from the environment.
/// None of these are part of the object-manager contract in §6; they are
/// deployment knobs with defaults that match the spec's stated behavior.
#[derive(Debug, Clone)]
pub struct Config {
    /// Well-known bus name claimed on the system bus.
    pub bus_name: String,
    /// Root of the published object tree.
    pub object_root: String,
    /// Path rewritten by ResolverWriter.
    pub resolv_conf_path: PathBuf,
    /// Reconciliation tick period (§2: "emits a 1 Hz tick").
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_name: "org.blackox.Loom".to_owned(),
            object_root: "/org/blackox/Loom".to_owned(),
            resolv_conf_path: PathBuf::from("/etc/resolv.conf"),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Build configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(name) = std::env::var("LOOM_BUS_NAME") {
            cfg.bus_name = name;
        }
        if let Ok(path) = std::env::var("LOOM_RESOLV_CONF_PATH") {
            cfg.resolv_conf_path = PathBuf::from(path);
        }
        if let Ok(ms) = std::env::var("LOOM_TICK_INTERVAL_MS")
            && let Ok(ms) = ms.parse::<u64>()
            && ms > 0
        {
            cfg.tick_interval = Duration::from_millis(ms);
        }

        cfg
    }
}
