// src/provider/mysql.rs
// =============================================================================
// Reads URL resources straight out of a Moodle MySQL database.
//
// Moodle stores them in `mdl_url` (prefix may differ per install):
//   id          -> record id
//   course      -> owning course id
//   name        -> label shown to students
//   externalurl -> the link we check
//
// One connection is opened per run and closed when the rows are in.
// =============================================================================

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use std::time::Duration;
use tracing::{debug, info};

use super::{ProviderError, RecordProvider};
use crate::record::RawRow;

/// Connection parameters. `Debug` leaves the password out.
#[derive(Clone)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub table: String,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("table", &self.table)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

pub struct MySqlProvider {
    conn: Option<MySqlConnection>,
    table: String,
}

impl MySqlProvider {
    /// Connects to the database. Fails fast on a bad table name.
    pub async fn open(settings: &MySqlSettings) -> Result<Self, ProviderError> {
        validate_table(&settings.table)?;

        info!("Connecting to MySQL database...");
        info!("Database address: {}:{}", settings.host, settings.port);
        info!("Database name: {}", settings.database);
        info!("Database username: {}", settings.user);

        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.database);

        let conn = tokio::time::timeout(
            settings.connect_timeout,
            MySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|_| ProviderError::Timeout(settings.connect_timeout))?
        .map_err(ProviderError::Connect)?;

        Ok(Self {
            conn: Some(conn),
            table: settings.table.clone(),
        })
    }
}

#[async_trait]
impl RecordProvider for MySqlProvider {
    async fn next_records(&mut self) -> Result<Vec<RawRow>, ProviderError> {
        let conn = self.conn.as_mut().ok_or(ProviderError::Closed)?;

        // The table name was checked in open(), so formatting it in is safe
        let sql = format!("SELECT id, course, name, externalurl FROM {}", self.table);
        debug!("Running query: {}", sql);

        let rows = sqlx::query_as::<_, (i64, i64, Option<String>, Option<String>)>(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(ProviderError::Query)?;

        info!("Fetched {} row(s) from {}", rows.len(), self.table);

        Ok(rows
            .into_iter()
            .map(|(id, owner_id, name, url)| RawRow {
                id,
                owner_id,
                name,
                url,
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), ProviderError> {
        if let Some(conn) = self.conn.take() {
            info!("Closing database connection");
            conn.close().await.map_err(ProviderError::Connect)?;
        }
        Ok(())
    }
}

// Table names end up inside the SQL text, so only allow plain identifiers
fn validate_table(table: &str) -> Result<(), ProviderError> {
    let valid = !table.is_empty()
        && table.len() <= 64
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ProviderError::InvalidTable(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(port: u16, table: &str) -> MySqlSettings {
        MySqlSettings {
            host: "127.0.0.1".to_string(),
            port,
            database: "moodle".to_string(),
            user: "root".to_string(),
            password: "hunter2".to_string(),
            table: table.to_string(),
            connect_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_table_names() {
        assert!(validate_table("mdl_url").is_ok());
        assert!(validate_table("moodle2_url").is_ok());
        assert!(validate_table("").is_err());
        assert!(validate_table("mdl_url; DROP TABLE mdl_user").is_err());
        assert!(validate_table("db.mdl_url").is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let text = format!("{:?}", settings(3306, "mdl_url"));
        assert!(text.contains("moodle"));
        assert!(!text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_open_rejects_bad_table_before_connecting() {
        let result = MySqlProvider::open(&settings(3306, "x y")).await;
        assert!(matches!(result, Err(ProviderError::InvalidTable(_))));
    }

    #[tokio::test]
    async fn test_open_fails_when_nothing_listens() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = MySqlProvider::open(&settings(port, "mdl_url")).await;
        assert!(matches!(
            result,
            Err(ProviderError::Connect(_)) | Err(ProviderError::Timeout(_))
        ));
    }
}
