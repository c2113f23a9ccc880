//! network ranges: licensees identified by the caller's address.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::license::License;

/// a named address range holding licenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRange {
    /// unique name.
    pub name: String,

    /// address mask; a single address is stored as a host prefix.
    #[serde(
        serialize_with = "serialize_mask",
        deserialize_with = "deserialize_mask"
    )]
    pub subnet_mask: IpNet,

    /// free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// licenses held by this range.
    #[serde(default)]
    pub licenses: Vec<License>,
}

impl NetworkRange {
    /// create a range without licenses.
    pub fn new(name: impl Into<String>, subnet_mask: IpNet) -> Self {
        Self {
            name: name.into(),
            subnet_mask,
            description: None,
            licenses: Vec::new(),
        }
    }

    /// true if `addr` falls inside this range.
    ///
    /// ipv4-mapped ipv6 callers (`::ffff:a.b.c.d`) match ipv4 ranges.
    pub fn matches(&self, addr: IpAddr) -> bool {
        if self.subnet_mask.contains(&addr) {
            return true;
        }
        match addr {
            IpAddr::V6(v6) => v6
                .to_ipv4_mapped()
                .is_some_and(|v4| self.subnet_mask.contains(&IpAddr::V4(v4))),
            IpAddr::V4(_) => false,
        }
    }
}

/// parse a subnet mask given as cidr (`10.0.0.0/8`) or a single address.
pub fn parse_subnet_mask(s: &str) -> Result<IpNet, Error> {
    let s = s.trim();
    if let Ok(net) = s.parse::<IpNet>() {
        return Ok(net);
    }
    match s.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => Ok(IpNet::V4(Ipv4Net::from(v4))),
        Ok(IpAddr::V6(v6)) => Ok(IpNet::V6(Ipv6Net::from(v6))),
        Err(_) => Err(Error::InvalidSubnetMask(s.to_string())),
    }
}

fn serialize_mask<S>(mask: &IpNet, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&mask.to_string())
}

fn deserialize_mask<'de, D>(deserializer: D) -> Result<IpNet, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_subnet_mask(&s).map_err(serde::de::Error::custom)
}
