use std::collections::HashMap;
use std::net::Ipv4Addr;

use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::error::LoomError;

/// A validated IPv4 profile (§3, §4.4). Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingConfig {
    pub address: Ipv4Addr,
    pub prefix: u8,
    pub router: Option<Ipv4Addr>,
    pub nameservers: Vec<Ipv4Addr>,
    pub domain: Option<String>,
    pub searches: Vec<String>,
}

impl SettingConfig {
    pub fn address_cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix)
    }

    pub fn has_dns(&self) -> bool {
        !self.nameservers.is_empty()
    }
}

/// An immutable, UUID-identified IPv4 profile.
pub struct Setting {
    uuid: String,
    configuration: SettingConfig,
    object_path: OwnedObjectPath,
}

impl Setting {
    pub fn new(uuid: String, configuration: SettingConfig, object_path: OwnedObjectPath) -> Self {
        Self {
            uuid,
            configuration,
            object_path,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn configuration(&self) -> &SettingConfig {
        &self.configuration
    }

    pub fn object_path(&self) -> &OwnedObjectPath {
        &self.object_path
    }

    pub fn address(&self) -> String {
        self.configuration.address_cidr()
    }

    pub fn router(&self) -> Option<String> {
        self.configuration.router.map(|r| r.to_string())
    }

    pub fn name_servers(&self) -> Vec<String> {
        self.configuration
            .nameservers
            .iter()
            .map(|ns| ns.to_string())
            .collect()
    }

    pub fn domain(&self) -> Option<&str> {
        self.configuration.domain.as_deref()
    }

    pub fn searches(&self) -> &[String] {
        &self.configuration.searches
    }
}

/// Parse and validate the recognised keys of a client-supplied
/// configuration map (§4.4). Unknown keys are silently ignored. Any
/// failure names the offending key in an `InvalidArgument`.
pub fn validate_configuration(
    raw: &HashMap<String, OwnedValue>,
) -> Result<SettingConfig, LoomError> {
    let address_str = read_str(raw, "address")?
        .ok_or_else(|| LoomError::invalid("missing required key 'address'"))?;
    let (address, prefix) = parse_address_cidr(&address_str)?;

    let router = match read_str(raw, "router")? {
        Some(s) => Some(parse_dotted_quad(&s, "router")?),
        None => None,
    };

    let nameservers = match read_str_list(raw, "nameservers")? {
        Some(list) => list
            .iter()
            .map(|s| parse_dotted_quad(s, "nameservers"))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let domain = match read_str(raw, "domain")? {
        Some(s) => {
            validate_fqdn(&s, "domain")?;
            Some(s)
        }
        None => None,
    };

    let searches = match read_str_list(raw, "searches")? {
        Some(list) => {
            for s in &list {
                validate_fqdn(s, "searches")?;
            }
            list
        }
        None => Vec::new(),
    };

    Ok(SettingConfig {
        address,
        prefix,
        router,
        nameservers,
        domain,
        searches,
    })
}

fn read_str(raw: &HashMap<String, OwnedValue>, key: &str) -> Result<Option<String>, LoomError> {
    match raw.get(key) {
        None => Ok(None),
        Some(v) => {
            let value: &Value = v;
            match value.downcast_ref::<zbus::zvariant::Str>() {
                Ok(s) => Ok(Some(s.to_string())),
                Err(_) => Err(LoomError::invalid(format!("key '{key}' is not a string"))),
            }
        }
    }
}

fn read_str_list(
    raw: &HashMap<String, OwnedValue>,
    key: &str,
) -> Result<Option<Vec<String>>, LoomError> {
    match raw.get(key) {
        None => Ok(None),
        Some(v) => {
            let value: &Value = v;
            let arr = value
                .downcast_ref::<zbus::zvariant::Array>()
                .map_err(|_| LoomError::invalid(format!("key '{key}' is not an array")))?;
            let mut out = Vec::with_capacity(arr.len());
            for item in arr.iter() {
                let s = item
                    .downcast_ref::<zbus::zvariant::Str>()
                    .map_err(|_| LoomError::invalid(format!("key '{key}' is not a string array")))?;
                out.push(s.to_string());
            }
            Ok(Some(out))
        }
    }
}

/// `A.B.C.D/N`, N in [0, 32].
fn parse_address_cidr(s: &str) -> Result<(Ipv4Addr, u8), LoomError> {
    let (addr, prefix) = s
        .split_once('/')
        .ok_or_else(|| LoomError::invalid("key 'address' must be 'A.B.C.D/N'"))?;
    let addr = parse_dotted_quad(addr, "address")?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| LoomError::invalid("key 'address' has a malformed prefix"))?;
    if prefix > 32 {
        return Err(LoomError::invalid(
            "key 'address' prefix must be in [0, 32]",
        ));
    }
    Ok((addr, prefix))
}

fn parse_dotted_quad(s: &str, key: &str) -> Result<Ipv4Addr, LoomError> {
    s.parse::<Ipv4Addr>()
        .map_err(|_| LoomError::invalid(format!("key '{key}' is not a well-formed dotted quad")))
}

/// One or more labels of 1-63 chars from `[A-Za-z0-9-]`, not starting or
/// ending with `-`, joined by `.`, ending in a 2-13 char alphabetic TLD.
fn validate_fqdn(s: &str, key: &str) -> Result<(), LoomError> {
    let bad = || LoomError::invalid(format!("key '{key}' is not a well-formed FQDN: '{s}'"));

    let labels: Vec<&str> = s.split('.').collect();
    if labels.len() < 2 {
        return Err(bad());
    }

    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return Err(bad());
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(bad());
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(bad());
        }
    }

    let tld = labels.last().unwrap();
    if tld.len() < 2 || tld.len() > 13 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(bad());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value<'_>)]) -> HashMap<String, OwnedValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OwnedValue::try_from(v.clone()).unwrap()))
            .collect()
    }

    #[test]
    fn accepts_minimal_configuration() {
        let cfg = map(&[("address", Value::from("10.0.0.5/24"))]);
        let parsed = validate_configuration(&cfg).unwrap();
        assert_eq!(parsed.address, "10.0.0.5".parse::<Ipv4Addr>().unwrap());
        assert_eq!(parsed.prefix, 24);
        assert!(parsed.router.is_none());
        assert!(parsed.nameservers.is_empty());
    }

    #[test]
    fn rejects_bad_prefix() {
        let cfg = map(&[("address", Value::from("10.0.0.5/33"))]);
        let err = validate_configuration(&cfg).unwrap_err();
        assert!(matches!(err, LoomError::InvalidArgument(m) if m.contains("address")));
    }

    #[test]
    fn rejects_unknown_router() {
        let cfg = map(&[
            ("address", Value::from("10.0.0.5/24")),
            ("router", Value::from("not-an-ip")),
        ]);
        let err = validate_configuration(&cfg).unwrap_err();
        assert!(matches!(err, LoomError::InvalidArgument(m) if m.contains("router")));
    }

    #[test]
    fn validates_domain_and_searches() {
        let cfg = map(&[
            ("address", Value::from("10.0.0.5/24")),
            ("domain", Value::from("example.com")),
            (
                "searches",
                Value::Array(zbus::zvariant::Array::from(vec![
                    Value::from("corp.example.com"),
                    Value::from("example.com"),
                ])),
            ),
        ]);
        let parsed = validate_configuration(&cfg).unwrap();
        assert_eq!(parsed.domain.as_deref(), Some("example.com"));
        assert_eq!(parsed.searches.len(), 2);
    }

    #[test]
    fn rejects_malformed_domain() {
        let cfg = map(&[
            ("address", Value::from("10.0.0.5/24")),
            ("domain", Value::from("-bad.com")),
        ]);
        let err = validate_configuration(&cfg).unwrap_err();
        assert!(matches!(err, LoomError::InvalidArgument(m) if m.contains("domain")));
    }

    #[test]
    fn ignores_unknown_keys() {
        let cfg = map(&[
            ("address", Value::from("10.0.0.5/24")),
            ("bogus", Value::from("whatever")),
        ]);
        assert!(validate_configuration(&cfg).is_ok());
    }
}
