// pgbackup/src/restore/db_restore.rs
use async_trait::async_trait;
use sqlx::{Connection, Executor, PgConnection};
use std::sync::Arc;

use crate::errors::{AppError, Result};
use crate::utils::connection::ConnectionTarget;
use crate::utils::journal::Journal;

#[cfg(test)]
use mockall::automock;

const COMPONENT: &str = "provisioner";

/// Maintenance database the administrative session connects to.
pub const MAINTENANCE_DATABASE: &str = "postgres";

/// Recreates a database from scratch on the server `admin` points at.
///
/// DESTRUCTIVE: runs `DROP DATABASE` on `database` before creating it again.
/// Statements run one by one in autocommit mode, so nothing is rolled back if
/// a later statement fails and any data the dropped database held is gone.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DatabaseProvisioner: Send + Sync {
    /// Drops `database` if present, creates it, grants `owner` all privileges
    /// on it and returns its name.
    ///
    /// A failing drop is logged and ignored. A failing connection, `CREATE`
    /// or `GRANT` is returned as an error.
    async fn provision(
        &self,
        admin: &ConnectionTarget,
        database: &str,
        owner: &str,
    ) -> Result<String>;
}

pub struct PgProvisioner {
    journal: Arc<dyn Journal>,
}

impl PgProvisioner {
    pub fn new(journal: Arc<dyn Journal>) -> Self {
        Self { journal }
    }

    async fn recreate(
        &self,
        conn: &mut PgConnection,
        database: &str,
        owner: &str,
    ) -> Result<String> {
        match (&mut *conn)
            .execute(drop_database_sql(database).as_str())
            .await
        {
            Ok(_) => self
                .journal
                .info(COMPONENT, &format!("Dropped existing database {}", database)),
            Err(e) => self.journal.info(
                COMPONENT,
                &format!("DB {} does not exist, nothing to drop ({})", database, e),
            ),
        }

        (&mut *conn)
            .execute(create_database_sql(database).as_str())
            .await
            .map_err(|source| AppError::Provisioning {
                statement: "CREATE DATABASE",
                database: database.to_string(),
                source,
            })?;
        self.journal
            .info(COMPONENT, &format!("Created database {}", database));

        (&mut *conn)
            .execute(grant_all_sql(database, owner).as_str())
            .await
            .map_err(|source| AppError::Provisioning {
                statement: "GRANT",
                database: database.to_string(),
                source,
            })?;
        self.journal.info(
            COMPONENT,
            &format!("Granted all privileges on {} to {}", database, owner),
        );

        Ok(database.to_string())
    }
}

#[async_trait]
impl DatabaseProvisioner for PgProvisioner {
    async fn provision(
        &self,
        admin: &ConnectionTarget,
        database: &str,
        owner: &str,
    ) -> Result<String> {
        let admin = admin.with_database(MAINTENANCE_DATABASE);
        let mut conn = PgConnection::connect(admin.uri()?.as_str())
            .await
            .map_err(|source| AppError::Connectivity {
                endpoint: admin.redacted_uri(),
                source,
            })?;

        let outcome = self.recreate(&mut conn, database, owner).await;

        if let Err(e) = conn.close().await {
            self.journal.warn(
                COMPONENT,
                &format!("Failed to close administrative connection cleanly: {}", e),
            );
        }
        outcome
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn drop_database_sql(database: &str) -> String {
    format!("DROP DATABASE {}", quote_ident(database))
}

pub fn create_database_sql(database: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(database))
}

pub fn grant_all_sql(database: &str, owner: &str) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON DATABASE {} TO {}",
        quote_ident(database),
        quote_ident(owner)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_quotes_identifiers() {
        assert_eq!(
            drop_database_sql("orders_restore"),
            r#"DROP DATABASE "orders_restore""#
        );
        assert_eq!(
            create_database_sql("orders_restore"),
            r#"CREATE DATABASE "orders_restore""#
        );
        assert_eq!(
            grant_all_sql("orders_restore", "app"),
            r#"GRANT ALL PRIVILEGES ON DATABASE "orders_restore" TO "app""#
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connectivity_error() {
        use crate::utils::journal::testing::MemoryJournal;

        let journal = Arc::new(MemoryJournal::default());
        let provisioner = PgProvisioner::new(journal.clone());
        // Port 1 on loopback is never a PostgreSQL server.
        let admin = ConnectionTarget::new("127.0.0.1", 1, "orders", "app", "secret");

        let err = provisioner
            .provision(&admin, "orders_restore", "app")
            .await
            .unwrap_err();

        match err {
            AppError::Connectivity { endpoint, .. } => {
                assert!(endpoint.ends_with("/postgres"));
                assert!(!endpoint.contains("secret"));
            }
            other => panic!("expected connectivity error, got {other:?}"),
        }
        assert!(journal.lines().is_empty());
    }
}
