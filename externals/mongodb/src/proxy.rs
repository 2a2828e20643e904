//! Resolve how connections to the cluster are dialed: directly or through a SOCKS5 proxy.
//!
//! An explicitly configured proxy URL takes precedence over the process proxy environment.
//! Explicit URLs are validated strictly while the environment is best effort:
//! unusable `ALL_PROXY` values fall back to dialing directly.
use std::fmt;
use std::net::IpAddr;

use anyhow::Result;
use percent_encoding::percent_decode_str;
use url::Host;
use url::Url;

use principals_context::Context;

use crate::errors::ProxyURLError;

/// Port used when a SOCKS5 proxy URL does not specify one.
const DEFAULT_SOCKS5_PORT: u16 = 1080;

/// Process proxy configuration, captured once when a connection is resolved.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProxyEnv {
    /// Proxy URL to dial all connections through (`ALL_PROXY`).
    pub all_proxy: Option<String>,

    /// Comma separated list of hosts to dial directly (`NO_PROXY`).
    pub no_proxy: Option<String>,
}

impl ProxyEnv {
    /// Read the proxy configuration from the process environment.
    pub fn from_process() -> ProxyEnv {
        ProxyEnv {
            all_proxy: lookup_env(&["ALL_PROXY", "all_proxy"]),
            no_proxy: lookup_env(&["NO_PROXY", "no_proxy"]),
        }
    }
}

/// Return the first non-empty value among the given environment variables.
fn lookup_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// How connections to the cluster are established.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Dialer {
    /// Connect directly to the cluster.
    Direct,

    /// Tunnel connections through a SOCKS5 proxy, except for bypassed hosts.
    Socks5 { proxy: Socks5Proxy, bypass: Bypass },
}

impl Dialer {
    /// Proxy to tunnel connections to `host` through, `None` to dial directly.
    pub fn proxy_for(&self, host: &str) -> Option<&Socks5Proxy> {
        match self {
            Dialer::Direct => None,
            Dialer::Socks5 { bypass, .. } if bypass.matches(host) => None,
            Dialer::Socks5 { proxy, .. } => Some(proxy),
        }
    }
}

/// Address and optional credentials of a SOCKS5 proxy.
#[derive(Clone, Eq, PartialEq)]
pub struct Socks5Proxy {
    pub host: String,
    pub port: u16,

    /// Username and password, percent-decoded.
    pub credentials: Option<(String, String)>,
}

impl Socks5Proxy {
    /// Driver options tunnelling connections through this proxy.
    pub fn driver_options(&self) -> mongodb::options::Socks5Proxy {
        mongodb::options::Socks5Proxy::builder()
            .host(self.host.clone())
            .port(self.port)
            .authentication(self.credentials.clone())
            .build()
    }
}

impl fmt::Debug for Socks5Proxy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let username = self.credentials.as_ref().map(|(username, _)| username);
        f.debug_struct("Socks5Proxy")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &username)
            .finish()
    }
}

/// Hosts to dial directly even when a proxy is configured.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bypass {
    rules: Vec<BypassRule>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum BypassRule {
    All,
    Cidr(IpAddr, u8),
    Host(String),
    Ip(IpAddr),
    Zone(String),
}

impl Bypass {
    /// Parse a `NO_PROXY` style list of hosts, IPs, CIDRs and domain zones.
    pub fn parse(list: &str) -> Bypass {
        let rules = list
            .split(',')
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .map(|entry| BypassRule::parse(&entry))
            .collect();
        Bypass { rules }
    }

    /// Check if connections to `host` should skip the proxy.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        let ip = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .ok();
        self.rules.iter().any(|rule| match (rule, ip) {
            (BypassRule::All, _) => true,
            (BypassRule::Ip(expected), Some(ip)) => *expected == ip,
            (BypassRule::Cidr(network, prefix), Some(ip)) => cidr_contains(*network, *prefix, ip),
            (BypassRule::Zone(zone), None) => host.ends_with(zone.as_str()) || host == zone[1..],
            (BypassRule::Host(expected), None) => *expected == host,
            _ => false,
        })
    }
}

impl BypassRule {
    fn parse(entry: &str) -> BypassRule {
        if entry == "*" {
            return BypassRule::All;
        }
        if let Ok(ip) = entry.parse::<IpAddr>() {
            return BypassRule::Ip(ip);
        }
        if let Some((network, prefix)) = entry.split_once('/') {
            let network = network.parse::<IpAddr>().ok();
            let prefix = prefix.parse::<u8>().ok();
            match (network, prefix) {
                (Some(network @ IpAddr::V4(_)), Some(prefix)) if prefix <= 32 => {
                    return BypassRule::Cidr(network, prefix)
                }
                (Some(network @ IpAddr::V6(_)), Some(prefix)) if prefix <= 128 => {
                    return BypassRule::Cidr(network, prefix)
                }
                _ => (),
            }
        }
        if let Some(zone) = entry.strip_prefix("*.") {
            return BypassRule::Zone(format!(".{}", zone));
        }
        if entry.starts_with('.') {
            return BypassRule::Zone(entry.to_string());
        }
        BypassRule::Host(entry.trim_end_matches('.').to_string())
    }
}

/// Check if `ip` belongs to the `network/prefix` range.
fn cidr_contains(network: IpAddr, prefix: u8, ip: IpAddr) -> bool {
    match (network, ip) {
        (IpAddr::V4(network), IpAddr::V4(ip)) => {
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            u32::from(network) & mask == u32::from(ip) & mask
        }
        (IpAddr::V6(network), IpAddr::V6(ip)) => {
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            u128::from(network) & mask == u128::from(ip) & mask
        }
        _ => false,
    }
}

/// Resolve the [`Dialer`] for cluster connections.
///
/// The process environment is always evaluated, even when an explicit proxy overrides it.
pub fn resolve(context: &Context, proxy: Option<&str>, env: &ProxyEnv) -> Result<Dialer> {
    let from_env = from_env(context, env);
    let proxy = match proxy.filter(|proxy| !proxy.is_empty()) {
        None => return Ok(from_env),
        Some(proxy) => proxy,
    };
    let proxy = parse_socks5(proxy)?;
    slog::debug!(
        context.logger, "Dialing through configured proxy";
        "proxy_host" => &proxy.host, "proxy_port" => proxy.port
    );
    Ok(Dialer::Socks5 {
        proxy,
        bypass: Bypass::default(),
    })
}

/// Dialer configured by the process proxy environment, direct if unusable.
fn from_env(context: &Context, env: &ProxyEnv) -> Dialer {
    let all_proxy = match env.all_proxy.as_deref() {
        None | Some("") => return Dialer::Direct,
        Some(all_proxy) => all_proxy,
    };
    let proxy = match parse_socks5(all_proxy) {
        Ok(proxy) => proxy,
        Err(error) => {
            slog::warn!(
                context.logger, "Ignoring unusable proxy from the environment";
                "error" => %error
            );
            return Dialer::Direct;
        }
    };
    let bypass = env
        .no_proxy
        .as_deref()
        .map(Bypass::parse)
        .unwrap_or_default();
    Dialer::Socks5 { proxy, bypass }
}

/// Parse a SOCKS5 proxy URL.
fn parse_socks5(raw: &str) -> std::result::Result<Socks5Proxy, ProxyURLError> {
    let url = Url::parse(raw).map_err(|_| ProxyURLError::Parse)?;
    match url.scheme() {
        "socks5" | "socks5h" => (),
        scheme => return Err(ProxyURLError::UnsupportedScheme(scheme.to_string())),
    }
    let host = match url.host() {
        None => return Err(ProxyURLError::MissingHost),
        Some(Host::Ipv6(address)) => address.to_string(),
        Some(host) => host.to_string(),
    };
    if host.is_empty() {
        return Err(ProxyURLError::MissingHost);
    }
    let credentials = match url.username() {
        "" => None,
        username => Some((
            decode_userinfo(username)?,
            decode_userinfo(url.password().unwrap_or_default())?,
        )),
    };
    Ok(Socks5Proxy {
        host,
        port: url.port().unwrap_or(DEFAULT_SOCKS5_PORT),
        credentials,
    })
}

/// Decode a percent-encoded URL user or password.
fn decode_userinfo(raw: &str) -> std::result::Result<String, ProxyURLError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|value| value.into_owned())
        .map_err(|_| ProxyURLError::Parse)
}
