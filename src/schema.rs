//! Create-if-missing bootstrap for the tables the API relies on.
//!
//! Errors are logged and swallowed: a table that could not be created shows up
//! again as a query failure on the request that needs it.

use sqlx::PgConnection;

/// Tables ensured on every call. `config` shares the user layout and is not
/// read or written anywhere else.
pub const TABLE_NAMES: &[&str] = &["users", "config"];

pub fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            user_id       INT PRIMARY KEY NOT NULL,
            user_name     VARCHAR(50) NOT NULL,
            creation_date TIMESTAMPTZ
        )
        "#
    )
}

async fn table_exists(conn: &mut PgConnection, table: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1
              FROM information_schema.tables
             WHERE table_schema = current_schema()
               AND table_name = $1
        )
        "#,
    )
    .bind(table)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

/// Idempotent; returns the tables it actually created.
pub async fn ensure_tables(conn: &mut PgConnection) -> Vec<&'static str> {
    let mut created = Vec::new();
    for &table in TABLE_NAMES {
        match table_exists(conn, table).await {
            Ok(true) => {
                tracing::trace!(table, "table already exists");
            }
            Ok(false) => match sqlx::query(&create_table_sql(table))
                .execute(&mut *conn)
                .await
            {
                Ok(_) => {
                    tracing::info!(table, "table created");
                    created.push(table);
                }
                Err(e) => tracing::error!(table, error = %e, "error creating table"),
            },
            Err(e) => tracing::error!(table, error = %e, "error checking table"),
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_is_create_if_missing_with_user_layout() {
        for table in TABLE_NAMES {
            let sql = create_table_sql(table);
            assert!(sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")));
            assert!(sql.contains("user_id       INT PRIMARY KEY NOT NULL"));
            assert!(sql.contains("user_name     VARCHAR(50) NOT NULL"));
            assert!(sql.contains("creation_date TIMESTAMPTZ"));
        }
    }

    #[test]
    fn users_and_config_are_ensured() {
        assert_eq!(TABLE_NAMES, &["users", "config"]);
    }
}
