//! Exporter configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables. The binary applies CLI flags last.
//!
//! ```toml
//! [database]
//! user = "acore"
//! password = "acore"
//! host = "127.0.0.1"
//! port = 3306
//!
//! [server]
//! port = 7000
//!
//! [collection]
//! group_timeout_secs = 10
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub collection: CollectionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Full connection string. When set it overrides user, password, host
    /// and port. A `mysql://` URL is passed to the driver unchanged; the
    /// `user:pass@tcp(host:port)/db` form is folded into the fields above.
    pub dsn: Option<String>,
    pub characters_db: String,
    pub auth_db: String,
    pub world_db: String,
    /// Pool size per logical database.
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            host: "127.0.0.1".to_string(),
            port: 3306,
            dsn: None,
            characters_db: "acore_characters".to_string(),
            auth_db: "acore_auth".to_string(),
            world_db: "acore_world".to_string(),
            max_connections: 5,
            connect_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// The configured DSN when it is a `mysql://` URL.
    pub fn dsn_url(&self) -> Option<&str> {
        self.dsn
            .as_deref()
            .map(str::trim)
            .filter(|dsn| dsn.starts_with("mysql://"))
    }

    /// Fold a driver-form `dsn` into the individual connection fields.
    /// URLs are left for the driver to interpret.
    pub fn resolve_dsn(&mut self) -> ConfigResult<()> {
        if self.dsn_url().is_some() {
            return Ok(());
        }
        let Some(raw) = self.dsn.as_deref() else {
            return Ok(());
        };
        let dsn = Dsn::parse(raw)?;
        self.user = dsn.user;
        self.password = dsn.password;
        self.host = dsn.host;
        if let Some(port) = dsn.port {
            self.port = port;
        }
        if let Some(db) = dsn.database {
            self.characters_db = db;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 7000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Budget for one metric group within a scrape.
    pub group_timeout_secs: u64,
    pub realm_id: i64,
    /// Level cap counted by `wow_max_level_characters`.
    pub max_level: i64,
    pub high_latency_ms: i64,
    /// Number of addresses exported by `wow_network_activity_by_ip`.
    pub top_ip_limit: i64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            group_timeout_secs: 10,
            realm_id: 1,
            max_level: 80,
            high_latency_ms: 200,
            top_ip_limit: 10,
        }
    }
}

impl CollectionConfig {
    pub fn group_timeout(&self) -> Duration {
        Duration::from_secs(self.group_timeout_secs)
    }
}

impl Config {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load defaults, overlay `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.database.resolve_dsn()?;
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`. Empty values are
    /// treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("WOW_DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = get("WOW_DB_PASS") {
            self.database.password = v;
        }
        if let Some(v) = get("WOW_DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = get("WOW_DB_PORT") {
            self.database.port = parse_env("WOW_DB_PORT", &v)?;
        }
        if let Some(v) = get("WOW_DB_DSN") {
            self.database.dsn = Some(v);
        }
        if let Some(v) = get("WOW_DB_CHARACTERS") {
            self.database.characters_db = v;
        }
        if let Some(v) = get("WOW_DB_AUTH") {
            self.database.auth_db = v;
        }
        if let Some(v) = get("WOW_DB_WORLD") {
            self.database.world_db = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Connection fields extracted from a driver-form DSN,
/// `user:pass@tcp(host:port)/db?params`.
///
/// Trailing driver parameters are ignored. URLs go through
/// [`DatabaseConfig::dsn_url`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: Option<u16>,
    pub database: Option<String>,
}

impl Dsn {
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let raw = raw.trim();
        if raw.contains("://") {
            return Err(ConfigError::Dsn(format!(
                "{raw:?} is a URL, only mysql:// URLs are supported"
            )));
        }
        let (userinfo, rest) = split_userinfo(raw);
        let (user, password) = split_credentials(userinfo);

        let (address, path) = match rest.find('/') {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };

        let hostport = if let Some(inner) = address.strip_prefix("tcp(") {
            inner
                .strip_suffix(')')
                .ok_or_else(|| ConfigError::Dsn(format!("unterminated address in {raw:?}")))?
        } else if address.contains('(') {
            return Err(ConfigError::Dsn(format!(
                "unsupported protocol in {raw:?}, only tcp is supported"
            )));
        } else {
            address
        };
        let (host, port) = split_host_port(hostport)?;

        Ok(Self {
            user: user.to_string(),
            password: password.to_string(),
            host,
            port,
            database: path.and_then(database_name),
        })
    }
}

/// Splits at the last `@` so passwords may contain one.
fn split_userinfo(s: &str) -> (&str, &str) {
    match s.rfind('@') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => ("", s),
    }
}

fn split_credentials(userinfo: &str) -> (&str, &str) {
    match userinfo.find(':') {
        Some(i) => (&userinfo[..i], &userinfo[i + 1..]),
        None => (userinfo, ""),
    }
}

fn split_host_port(s: &str) -> ConfigResult<(String, Option<u16>)> {
    let (host, port) = match s.rfind(':') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let port = match port {
        Some(p) if !p.is_empty() => Some(
            p.parse::<u16>()
                .map_err(|_| ConfigError::Dsn(format!("invalid port {p:?}")))?,
        ),
        _ => None,
    };
    let host = if host.is_empty() { "127.0.0.1" } else { host };
    Ok((host.to_string(), port))
}

fn database_name(path: &str) -> Option<String> {
    let name = path.split('?').next().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.characters_db, "acore_characters");
        assert_eq!(config.database.auth_db, "acore_auth");
        assert_eq!(config.database.world_db, "acore_world");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.collection.max_level, 80);
        assert_eq!(config.collection.group_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("WOW_DB_USER", "acore"),
                ("WOW_DB_PASS", "secret"),
                ("WOW_DB_HOST", "db.internal"),
                ("WOW_DB_PORT", "3307"),
                ("PORT", "9100"),
            ]))
            .unwrap();
        assert_eq!(config.database.user, "acore");
        assert_eq!(config.database.password, "secret");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("WOW_DB_PORT", ""), ("PORT", "")]))
            .unwrap();
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "seven")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn driver_dsn() {
        let dsn = Dsn::parse("acore:p@ss@tcp(10.0.0.5:3310)/acore_characters?parseTime=true").unwrap();
        assert_eq!(dsn.user, "acore");
        assert_eq!(dsn.password, "p@ss");
        assert_eq!(dsn.host, "10.0.0.5");
        assert_eq!(dsn.port, Some(3310));
        assert_eq!(dsn.database.as_deref(), Some("acore_characters"));
    }

    #[test]
    fn driver_dsn_with_empty_host() {
        let dsn = Dsn::parse("root:@tcp(:3306)/").unwrap();
        assert_eq!(dsn.user, "root");
        assert_eq!(dsn.password, "");
        assert_eq!(dsn.host, "127.0.0.1");
        assert_eq!(dsn.database, None);
    }

    #[test]
    fn url_dsn_is_left_to_the_driver() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("WOW_DB_USER", "acore"),
                ("WOW_DB_DSN", " mysql://root:s%40cret@db:3306/chars?ssl-mode=required"),
            ]))
            .unwrap();
        config.database.resolve_dsn().unwrap();

        assert_eq!(
            config.database.dsn_url(),
            Some("mysql://root:s%40cret@db:3306/chars?ssl-mode=required")
        );
        assert_eq!(config.database.user, "acore");
        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.characters_db, "acore_characters");
    }

    #[test]
    fn driver_dsn_has_no_url() {
        let config = DatabaseConfig {
            dsn: Some("acore:acore@tcp(mysql:3306)/acore_characters".into()),
            ..Default::default()
        };
        assert_eq!(config.dsn_url(), None);
    }

    #[test]
    fn other_url_schemes_are_rejected() {
        let err = Dsn::parse("postgres://acore@db/chars").unwrap_err();
        assert!(matches!(err, ConfigError::Dsn(_)));
    }

    #[test]
    fn unix_socket_dsn_is_rejected() {
        assert!(Dsn::parse("root@unix(/tmp/mysql.sock)/acore_characters").is_err());
    }

    #[test]
    fn dsn_overrides_components() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("WOW_DB_USER", "ignored"),
                ("WOW_DB_DSN", "acore:acore@tcp(mysql:3306)/acore_characters?parseTime=true"),
            ]))
            .unwrap();
        config.database.resolve_dsn().unwrap();
        assert_eq!(config.database.user, "acore");
        assert_eq!(config.database.host, "mysql");
        assert_eq!(config.database.auth_db, "acore_auth");
    }

    #[test]
    fn parse_partial_toml() {
        let config = Config::from_toml(
            r#"
[database]
user = "acore"
max_connections = 2

[collection]
max_level = 60
"#,
        )
        .unwrap();
        assert_eq!(config.database.user, "acore");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.collection.max_level, 60);
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9200\nbind = \"127.0.0.1\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::from_file(Path::new("/nonexistent/wowmon.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
