// PostgreSQL bootstrap and helpers shared by the repository adapters

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::repositories::RepositoryError;

/// Opens the connection pool
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        max_connections = config.max_connections,
        "Connecting to database..."
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;
    tracing::info!("Database connected successfully");
    Ok(pool)
}

/// Applies pending migrations from `migrations/`
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Maps a driver error, turning unique violations into `Conflict`
pub fn map_sqlx_error(context: &str, error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let constraint = db_error.constraint().unwrap_or("unique constraint");
            return RepositoryError::Conflict(constraint.to_string());
        }
        if db_error.is_foreign_key_violation() {
            let constraint = db_error.constraint().unwrap_or("foreign key");
            return RepositoryError::NotFound(constraint.to_string());
        }
    }
    tracing::error!(error = %error, "{}", context);
    RepositoryError::Database(format!("{}: {}", context, error))
}

/// Builds an `ILIKE` pattern matching `search` anywhere, escaping wildcards
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_search() {
        assert_eq!(like_pattern("dupont"), "%dupont%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn non_database_errors_are_database_errors() {
        let error = map_sqlx_error("Failed to load client", sqlx::Error::RowNotFound);
        assert!(matches!(error, RepositoryError::Database(message) if message.starts_with("Failed to load client")));
    }
}
