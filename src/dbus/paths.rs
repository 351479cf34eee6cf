use zbus::zvariant::OwnedObjectPath;

/// Object path segments forbid `-`; interface names (e.g. `wlan0-bak`)
/// don't, so they're sanitised on the way into a path.
fn sanitise(name: &str) -> String {
    name.chars()
        .map(|c| if c == '-' { '_' } else { c })
        .collect()
}

pub fn interfaces_path(root: &str) -> OwnedObjectPath {
    OwnedObjectPath::try_from(format!("{root}/Interfaces")).unwrap()
}

pub fn settings_path(root: &str) -> OwnedObjectPath {
    OwnedObjectPath::try_from(format!("{root}/Settings")).unwrap()
}

pub fn connections_path(root: &str) -> OwnedObjectPath {
    OwnedObjectPath::try_from(format!("{root}/Connections")).unwrap()
}

pub fn interface_path(root: &str, name: &str) -> OwnedObjectPath {
    OwnedObjectPath::try_from(format!("{root}/Interface/{}", sanitise(name))).unwrap()
}

pub fn setting_path(root: &str, n: u64) -> OwnedObjectPath {
    OwnedObjectPath::try_from(format!("{root}/Setting/{n}")).unwrap()
}

pub fn connection_path(root: &str, n: u64) -> OwnedObjectPath {
    OwnedObjectPath::try_from(format!("{root}/Connection/{n}")).unwrap()
}

/// The null object path, used for properties like `primary_connection`
/// when nothing qualifies.
pub fn root_path() -> OwnedObjectPath {
    OwnedObjectPath::try_from("/").unwrap()
}
