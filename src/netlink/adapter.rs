use std::net::Ipv4Addr;

use futures::TryStreamExt;
use netlink_packet_route::link::{LinkAttribute, LinkInfo as LinkInfoAttr};
use netlink_packet_route::route::RouteAttribute;
use rtnetlink::{LinkUnspec, RouteMessageBuilder};

use super::{DiscoveredLink, LinkControl, LinkInfo, NetlinkError, flags};

/// Real rtnetlink-backed implementation of [`LinkControl`]. Opens a fresh
/// session per call, per §4.1.
#[derive(Debug, Default, Clone, Copy)]
pub struct RtNetlinkAdapter;

impl RtNetlinkAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn handle(&self) -> Result<rtnetlink::Handle, NetlinkError> {
        let (conn, handle, _) =
            rtnetlink::new_connection().map_err(|e| NetlinkError::other(e.to_string()))?;
        tokio::spawn(conn);
        Ok(handle)
    }
}

fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// A link is a "physical device" per §4.6 if it carries no `IFLA_LINKINFO`
/// kind string at all (bridges, veths, tuns, bonds, etc. all declare one).
fn is_physical(attrs: &[LinkAttribute]) -> bool {
    !attrs.iter().any(|a| {
        matches!(a, LinkAttribute::LinkInfo(infos) if infos.iter().any(|i| matches!(i, LinkInfoAttr::Kind(_))))
    })
}

fn map_rtnetlink_err(e: rtnetlink::Error, context: &str) -> NetlinkError {
    if let rtnetlink::Error::NetlinkError(msg) = &e {
        // Netlink error codes are negated errno values.
        const ENODEV: i32 = -19;
        const EADDRNOTAVAIL: i32 = -99;
        const EEXIST: i32 = -17;
        match msg.code.map(|c| c.get()) {
            Some(ENODEV) | Some(EADDRNOTAVAIL) => {
                return NetlinkError::not_found(format!("{context}: not found"));
            }
            Some(EEXIST) => {
                return NetlinkError::already_exists(format!("{context}: already exists"));
            }
            _ => {}
        }
    }
    NetlinkError::other(format!("{context}: {e}"))
}

#[async_trait::async_trait]
impl LinkControl for RtNetlinkAdapter {
    async fn list_links(&self) -> Result<Vec<DiscoveredLink>, NetlinkError> {
        let handle = self.handle().await?;
        let mut links = handle.link().get().execute();
        let mut out = Vec::new();

        while let Some(msg) = links
            .try_next()
            .await
            .map_err(|e| map_rtnetlink_err(e, "list_links"))?
        {
            let flag_bits = msg.header.flags.bits();
            if flag_bits & flags::IFF_LOOPBACK != 0 {
                continue;
            }
            if !is_physical(&msg.attributes) {
                continue;
            }

            let mut name = None;
            let mut mac = String::new();
            for attr in &msg.attributes {
                match attr {
                    LinkAttribute::IfName(n) => name = Some(n.clone()),
                    LinkAttribute::Address(bytes) => mac = format_mac(bytes),
                    _ => {}
                }
            }
            let Some(name) = name else { continue };

            out.push(DiscoveredLink {
                name,
                info: LinkInfo {
                    mac,
                    flags: flag_bits,
                    carrier: flags::carrier(flag_bits),
                },
            });
        }

        Ok(out)
    }

    async fn read_link(&self, name: &str) -> Result<LinkInfo, NetlinkError> {
        let handle = self.handle().await?;
        let mut links = handle
            .link()
            .get()
            .match_name(name.to_owned())
            .execute();

        let msg = links
            .try_next()
            .await
            .map_err(|e| map_rtnetlink_err(e, name))?
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;

        let flag_bits = msg.header.flags.bits();
        let mut mac = String::new();
        for attr in &msg.attributes {
            if let LinkAttribute::Address(bytes) = attr {
                mac = format_mac(bytes);
            }
        }

        Ok(LinkInfo {
            mac,
            flags: flag_bits,
            carrier: flags::carrier(flag_bits),
        })
    }

    async fn set_link_up(&self, name: &str) -> Result<(), NetlinkError> {
        self.set_link(name, true).await
    }

    async fn set_link_down(&self, name: &str) -> Result<(), NetlinkError> {
        self.set_link(name, false).await
    }

    async fn add_address(&self, name: &str, cidr: &str) -> Result<(), NetlinkError> {
        let (addr, prefix) = parse_cidr(cidr)?;
        let handle = self.handle().await?;
        let ifindex = self.resolve_index(&handle, name).await?;

        handle
            .address()
            .add(ifindex, addr.into(), prefix)
            .execute()
            .await
            .map_err(|e| map_rtnetlink_err(e, &format!("add_address({name}, {cidr})")))
    }

    async fn del_address(&self, name: &str, cidr: &str) -> Result<(), NetlinkError> {
        let (addr, prefix) = parse_cidr(cidr)?;
        let handle = self.handle().await?;
        let ifindex = self.resolve_index(&handle, name).await?;

        let mut addrs = handle.address().get().set_link_index_filter(ifindex).execute();
        let mut target = None;
        while let Some(msg) = addrs
            .try_next()
            .await
            .map_err(|e| map_rtnetlink_err(e, &format!("del_address({name}, {cidr})")))?
        {
            let matches = msg.header.prefix_len == prefix
                && msg.attributes.iter().any(|a| {
                    matches!(
                        a,
                        netlink_packet_route::address::AddressAttribute::Address(
                            std::net::IpAddr::V4(a)
                        ) if *a == addr
                    )
                });
            if matches {
                target = Some(msg);
                break;
            }
        }

        let Some(msg) = target else {
            // NotFound is treated as success by the caller.
            return Err(NetlinkError::not_found(format!(
                "no such address {cidr} on '{name}'"
            )));
        };

        handle
            .address()
            .del(msg)
            .execute()
            .await
            .map_err(|e| map_rtnetlink_err(e, &format!("del_address({name}, {cidr})")))
    }

    async fn add_default_route(&self, gateway: Ipv4Addr) -> Result<(), NetlinkError> {
        let handle = self.handle().await?;
        let route = RouteMessageBuilder::<Ipv4Addr>::new()
            .gateway(gateway)
            .build();

        // create-or-replace: a prior default route must not block activation.
        handle
            .route()
            .add(route)
            .replace()
            .execute()
            .await
            .map_err(|e| map_rtnetlink_err(e, &format!("add_default_route({gateway})")))
    }

    async fn del_default_route(&self, gateway: Ipv4Addr) -> Result<(), NetlinkError> {
        let handle = self.handle().await?;
        let mut routes = handle
            .route()
            .get(RouteMessageBuilder::<Ipv4Addr>::new().build())
            .execute();

        while let Some(msg) = routes
            .try_next()
            .await
            .map_err(|e| map_rtnetlink_err(e, "del_default_route"))?
        {
            if msg.header.destination_prefix_length != 0 {
                continue;
            }
            let matches_gw = msg.attributes.iter().any(|a| {
                matches!(
                    a,
                    RouteAttribute::Gateway(netlink_packet_route::route::RouteAddress::Inet(g))
                        if *g == gateway
                )
            });
            if matches_gw {
                return handle
                    .route()
                    .del(msg)
                    .execute()
                    .await
                    .map_err(|e| map_rtnetlink_err(e, &format!("del_default_route({gateway})")));
            }
        }

        // NotFound is treated as success by the caller.
        Err(NetlinkError::not_found(format!(
            "no default route via {gateway}"
        )))
    }
}

impl RtNetlinkAdapter {
    async fn set_link(&self, name: &str, up: bool) -> Result<(), NetlinkError> {
        let handle = self.handle().await?;
        let ifindex = self.resolve_index(&handle, name).await?;

        let builder = rtnetlink::LinkMessageBuilder::<LinkUnspec>::new().index(ifindex);
        let msg = if up { builder.up() } else { builder.down() }.build();

        handle
            .link()
            .set(msg)
            .execute()
            .await
            .map_err(|e| map_rtnetlink_err(e, &format!("set_link({name}, up={up})")))
    }

    async fn resolve_index(
        &self,
        handle: &rtnetlink::Handle,
        name: &str,
    ) -> Result<u32, NetlinkError> {
        let mut links = handle.link().get().match_name(name.to_owned()).execute();
        let msg = links
            .try_next()
            .await
            .map_err(|e| map_rtnetlink_err(e, name))?
            .ok_or_else(|| NetlinkError::not_found(format!("no such link '{name}'")))?;
        Ok(msg.header.index)
    }
}

fn parse_cidr(cidr: &str) -> Result<(Ipv4Addr, u8), NetlinkError> {
    let (addr, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| NetlinkError::other(format!("malformed cidr '{cidr}'")))?;
    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|_| NetlinkError::other(format!("malformed address '{addr}'")))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| NetlinkError::other(format!("malformed prefix '{prefix}'")))?;
    if prefix > 32 {
        return Err(NetlinkError::other(format!("prefix out of range '{prefix}'")));
    }
    Ok((addr, prefix))
}
