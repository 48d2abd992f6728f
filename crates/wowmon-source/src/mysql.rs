//! MySQL-backed data source.
//!
//! One sqlx pool per schema. All three pools are opened at startup; a server
//! that refuses any of them is a fatal configuration error.
//!
//! A `mysql://` URL in the configuration is handed to sqlx as is, so its
//! percent-encoded credentials and query options (`ssl-mode`, `charset`, ...)
//! apply to every pool. Otherwise the pools are built from the individual
//! connection fields.

use std::str::FromStr;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use tracing::{debug, info};
use wowmon_core::DatabaseConfig;

use crate::error::{SourceError, SourceResult};
use crate::query::{Database, Param, Query};
use crate::row::{Row, Value};
use crate::{DataSource, QueryFuture};

pub struct MySqlSource {
    characters: MySqlPool,
    auth: MySqlPool,
    world: MySqlPool,
}

impl MySqlSource {
    /// Open and verify a pool for each of the three schemas.
    pub async fn connect(cfg: &DatabaseConfig) -> SourceResult<Self> {
        let base = base_options(cfg)?;
        let characters_db = base.get_database().unwrap_or(cfg.characters_db.as_str()).to_string();

        let characters = open_pool(cfg, &base, Database::Characters, &characters_db).await?;
        let auth = match open_pool(cfg, &base, Database::Auth, &cfg.auth_db).await {
            Ok(pool) => pool,
            Err(e) => {
                characters.close().await;
                return Err(e);
            }
        };
        let world = match open_pool(cfg, &base, Database::World, &cfg.world_db).await {
            Ok(pool) => pool,
            Err(e) => {
                characters.close().await;
                auth.close().await;
                return Err(e);
            }
        };
        Ok(Self {
            characters,
            auth,
            world,
        })
    }

    pub fn pool(&self, database: Database) -> &MySqlPool {
        match database {
            Database::Characters => &self.characters,
            Database::Auth => &self.auth,
            Database::World => &self.world,
        }
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        for database in Database::ALL {
            self.pool(database).close().await;
        }
        info!("database pools closed");
    }
}

/// Connection settings shared by the three pools, without a schema.
fn base_options(cfg: &DatabaseConfig) -> SourceResult<MySqlConnectOptions> {
    match cfg.dsn_url() {
        Some(url) => MySqlConnectOptions::from_str(url).map_err(SourceError::Url),
        None => Ok(MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.user)
            .password(&cfg.password)),
    }
}

async fn open_pool(
    cfg: &DatabaseConfig,
    base: &MySqlConnectOptions,
    database: Database,
    schema: &str,
) -> SourceResult<MySqlPool> {
    let options = base.clone().database(schema);
    let pool = MySqlPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.connect_timeout())
        .connect_with(options)
        .await
        .map_err(|source| SourceError::Connect { database, source })?;
    info!(
        %database,
        schema,
        host = base.get_host(),
        port = base.get_port(),
        "database pool ready"
    );
    Ok(pool)
}

impl DataSource for MySqlSource {
    fn fetch_all<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Vec<Row>> {
        Box::pin(async move {
            let mut stmt = sqlx::query(&query.sql);
            for param in &query.params {
                stmt = match param {
                    Param::Int(v) => stmt.bind(*v),
                    Param::Text(s) => stmt.bind(s.as_str()),
                };
            }
            let wrap = |source| SourceError::Query {
                query: query.name,
                source,
            };
            let raw = stmt.fetch_all(self.pool(query.database)).await.map_err(wrap)?;
            let rows = raw
                .iter()
                .map(decode_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(wrap)?;
            debug!(query = query.name, database = %query.database, rows = rows.len(), "query complete");
            Ok(rows)
        })
    }
}

/// Decode a row by the column types the server reports.
///
/// DECIMAL is read through its text form and parsed as a float, so `SUM()`
/// and `AVG()` results need no special handling downstream.
fn decode_row(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    let mut values = Vec::with_capacity(row.columns().len());
    for idx in 0..row.columns().len() {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            values.push(Value::Null);
            continue;
        }
        let type_name = raw.type_info().name().to_string();
        let value = match type_name.as_str() {
            name if name.ends_with("UNSIGNED") => Value::UInt(row.try_get_unchecked::<u64, _>(idx)?),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" | "BOOLEAN" => {
                Value::Int(row.try_get_unchecked::<i64, _>(idx)?)
            }
            "FLOAT" => Value::Float(row.try_get_unchecked::<f32, _>(idx)?.into()),
            "DOUBLE" => Value::Float(row.try_get_unchecked::<f64, _>(idx)?),
            "DECIMAL" => {
                let text = row.try_get_unchecked::<String, _>(idx)?;
                let parsed = text.trim().parse::<f64>().map_err(|e| sqlx::Error::ColumnDecode {
                    index: idx.to_string(),
                    source: Box::new(e),
                })?;
                Value::Float(parsed)
            }
            name if name.contains("BLOB") || name.contains("BINARY") => {
                let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
                Value::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Value::Text(row.try_get_unchecked::<String, _>(idx)?),
        };
        values.push(value);
    }
    Ok(Row::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    use sqlx::mysql::MySqlSslMode;

    #[test]
    fn options_from_individual_fields() {
        let cfg = DatabaseConfig {
            user: "acore".into(),
            password: "secret".into(),
            host: "db.internal".into(),
            port: 3307,
            ..Default::default()
        };
        let opts = base_options(&cfg).unwrap().database(&cfg.auth_db);
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 3307);
        assert_eq!(opts.get_username(), "acore");
        assert_eq!(opts.get_database(), Some("acore_auth"));
    }

    #[test]
    fn url_is_handed_to_the_driver() {
        let cfg = DatabaseConfig {
            user: "ignored".into(),
            dsn: Some("mysql://acore:s%40cret@db:3310/chars?ssl-mode=disabled".into()),
            ..Default::default()
        };
        let opts = base_options(&cfg).unwrap();
        assert_eq!(opts.get_host(), "db");
        assert_eq!(opts.get_port(), 3310);
        assert_eq!(opts.get_username(), "acore");
        assert_eq!(opts.get_database(), Some("chars"));
        assert!(matches!(opts.get_ssl_mode(), MySqlSslMode::Disabled));

        let world = opts.database(&cfg.world_db);
        assert_eq!(world.get_database(), Some("acore_world"));
        assert!(matches!(world.get_ssl_mode(), MySqlSslMode::Disabled));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let cfg = DatabaseConfig {
            dsn: Some("mysql://acore@db:notaport/chars".into()),
            ..Default::default()
        };
        assert!(matches!(base_options(&cfg), Err(SourceError::Url(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connect_error() {
        let cfg = DatabaseConfig {
            user: "acore".into(),
            host: "127.0.0.1".into(),
            port: 1,
            connect_timeout_secs: 1,
            ..Default::default()
        };
        let err = match MySqlSource::connect(&cfg).await {
            Ok(_) => panic!("connect to port 1 should fail"),
            Err(e) => e,
        };
        assert!(matches!(
            err,
            SourceError::Connect {
                database: Database::Characters,
                ..
            }
        ));
    }
}
