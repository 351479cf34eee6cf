//! D-Bus transport: object paths, the three inventory singletons, and the
//! per-entity interfaces they spawn (§6).

pub mod paths;

pub mod connection;
pub mod connections;
pub mod interface;
pub mod interfaces;
pub mod setting;
pub mod settings;

use tracing::{error, info};
use zbus::Connection;
use zbus::connection::Builder;

use crate::Result;
use crate::config::Config;
use crate::daemon::SharedCore;

use connection::ConnectionIface;
use connections::ConnectionsIface;
use interface::InterfaceIface;
use interfaces::InterfacesIface;
use setting::SettingIface;
use settings::SettingsIface;

/// Claim the bus name and publish the object tree: `ObjectManager` at the
/// root, the three inventory singletons, and one [`InterfaceIface`] per
/// link discovered at startup (§4.6, §6). Settings and Connections start
/// empty, so no entity interfaces are registered for them here — they're
/// registered as clients call `create` (`dbus::settings::SettingsIface::create`,
/// `dbus::connections::ConnectionsIface::create`).
pub async fn serve(core: SharedCore, config: &Config) -> Result<Connection> {
    let interface_paths: Vec<zbus::zvariant::OwnedObjectPath> =
        core.lock().await.interfaces.paths();

    let mut builder = Builder::system()?
        .name(config.bus_name.clone())?
        .serve_at(config.object_root.clone(), zbus::fdo::ObjectManager)?
        .serve_at(
            paths::interfaces_path(&config.object_root),
            InterfacesIface { core: core.clone() },
        )?
        .serve_at(
            paths::settings_path(&config.object_root),
            SettingsIface { core: core.clone() },
        )?
        .serve_at(
            paths::connections_path(&config.object_root),
            ConnectionsIface { core: core.clone() },
        )?;

    for path in interface_paths {
        info!(path = %path, "registering interface");
        builder = builder.serve_at(
            path.clone(),
            InterfaceIface {
                core: core.clone(),
                path,
            },
        )?;
    }

    let conn = builder.build().await.inspect_err(|_| {
        error!(
            bus_name = %config.bus_name,
            "failed to claim bus name — is another instance of loomd running?"
        );
    })?;

    Ok(conn)
}
