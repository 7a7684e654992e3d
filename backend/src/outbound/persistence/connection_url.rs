//! Connection string preparation for PostgreSQL.
//!
//! The driver's options are expressed as libpq-style URL parameters:
//! `connect_timeout` and `tcp_user_timeout` (both in seconds) and, for
//! IPv4-only operation, a `hostaddr` pinned to the host's first IPv4
//! address so the client never dials an IPv6 endpoint.

use std::net::{IpAddr, Ipv4Addr};

use url::{Host, Url};

use crate::domain::ports::{AddressFamily, ConnectOptions, DatabaseDriverError};

const DEFAULT_PG_PORT: u16 = 5432;
const CONNECT_TIMEOUT_PARAM: &str = "connect_timeout";
const TCP_USER_TIMEOUT_PARAM: &str = "tcp_user_timeout";
const HOSTADDR_PARAM: &str = "hostaddr";
const MANAGED_PARAMS: [&str; 3] = [CONNECT_TIMEOUT_PARAM, TCP_USER_TIMEOUT_PARAM, HOSTADDR_PARAM];

/// Parse and validate a PostgreSQL connection URI.
///
/// # Errors
/// Returns [`DatabaseDriverError::InvalidUri`] when the URI does not parse,
/// uses another scheme or names no host.
pub fn parse(uri: &str) -> Result<Url, DatabaseDriverError> {
    let url = Url::parse(uri).map_err(|err| DatabaseDriverError::invalid_uri(err.to_string()))?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(DatabaseDriverError::invalid_uri(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host().is_none() {
        return Err(DatabaseDriverError::invalid_uri("missing host"));
    }
    Ok(url)
}

/// Database name from the URI path, if any.
///
/// # Examples
/// ```
/// use starter_backend::outbound::persistence::connection_url::{database_name, parse};
///
/// let url = parse("postgres://localhost:5432/shop").expect("valid uri");
/// assert_eq!(database_name(&url).as_deref(), Some("shop"));
/// ```
#[must_use]
pub fn database_name(url: &Url) -> Option<String> {
    let name = url.path().trim_start_matches('/');
    (!name.is_empty()).then(|| name.to_owned())
}

/// Apply timeouts and an optional pinned address to `url`.
///
/// Parameters already present in the URI are replaced; all others are kept.
#[must_use]
pub fn with_options(mut url: Url, options: &ConnectOptions, hostaddr: Option<Ipv4Addr>) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !MANAGED_PARAMS.iter().any(|managed| key == managed))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(retained);
        query.append_pair(
            CONNECT_TIMEOUT_PARAM,
            &options.server_selection_timeout.as_secs().max(1).to_string(),
        );
        query.append_pair(
            TCP_USER_TIMEOUT_PARAM,
            &options.socket_timeout.as_secs().to_string(),
        );
        if let Some(addr) = hostaddr {
            query.append_pair(HOSTADDR_PARAM, &addr.to_string());
        }
    }
    url
}

/// Resolve the address the client should dial when IPv4 is required.
///
/// Returns `None` when no pinning is needed: any address family is allowed
/// or the host is already an IPv4 literal.
///
/// # Errors
/// Returns [`DatabaseDriverError::Connect`] when resolution fails or yields
/// no IPv4 address.
pub async fn resolve_hostaddr(
    url: &Url,
    family: AddressFamily,
) -> Result<Option<Ipv4Addr>, DatabaseDriverError> {
    if family == AddressFamily::Any {
        return Ok(None);
    }
    let host = match url.host() {
        Some(Host::Ipv4(_)) => return Ok(None),
        Some(Host::Ipv6(addr)) => {
            return Err(DatabaseDriverError::connect(format!(
                "host {addr} is IPv6 but IPv4 is required"
            )));
        }
        // Non-special schemes keep IP literals as opaque hosts.
        Some(Host::Domain(domain)) if domain.parse::<Ipv4Addr>().is_ok() => return Ok(None),
        Some(Host::Domain(domain)) => domain.to_owned(),
        None => return Err(DatabaseDriverError::invalid_uri("missing host")),
    };
    let port = url.port().unwrap_or(DEFAULT_PG_PORT);
    let addrs = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|err| DatabaseDriverError::connect(format!("resolve {host}: {err}")))?;
    first_ipv4(addrs.map(|addr| addr.ip()))
        .map(Some)
        .ok_or_else(|| DatabaseDriverError::connect(format!("no IPv4 address for {host}")))
}

fn first_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Option<Ipv4Addr> {
    addrs.into_iter().find_map(|addr| match addr {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    })
}

/// Parse `options.uri`, resolve the pinned address and apply every option.
///
/// # Errors
/// Propagates [`parse`] and [`resolve_hostaddr`] failures.
pub async fn prepare(options: &ConnectOptions) -> Result<Url, DatabaseDriverError> {
    let url = parse(&options.uri)?;
    let hostaddr = resolve_hostaddr(&url, options.address_family).await?;
    Ok(with_options(url, options, hostaddr))
}

#[cfg(test)]
mod tests;
