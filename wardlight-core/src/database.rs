// Connection pool, schema bootstrap and SQL script execution

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, error, info};

const SCHEMA_SQL: &str = include_str!("../migrations/001_initial_schema.sql");

const REQUIRED_TABLES: [&str; 2] = ["notifications", "heartbeats"];

/// Initialize database connection pool with WAL mode enabled
pub async fn create_pool<P: AsRef<Path>>(database_path: P) -> Result<SqlitePool> {
    let path_str = database_path
        .as_ref()
        .to_str()
        .context("Invalid database path")?;

    info!("Creating database connection pool for: {}", path_str);

    let connect_options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path_str))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .context("Failed to create database connection pool")?;

    debug!("Database connection pool created successfully");
    Ok(pool)
}

/// Split a SQL script into individual statements.
///
/// Blank lines and comment-only lines are dropped, inline `--` comments are
/// stripped, and a statement ends at a line terminated by `;`. A trailing
/// statement without a terminating semicolon is kept.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current_statement = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || (trimmed.starts_with("--") && current_statement.is_empty()) {
            continue;
        }

        let code = match trimmed.find("--") {
            Some(pos) => trimmed[..pos].trim_end(),
            None => trimmed,
        };
        current_statement.push_str(code);
        current_statement.push(' ');

        if code.ends_with(';') {
            push_statement(&mut statements, &current_statement);
            current_statement.clear();
        }
    }

    push_statement(&mut statements, &current_statement);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim().trim_end_matches(';').trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}

/// Execute every statement of a script in order.
///
/// Returns the rows-affected count of each executed statement. The first
/// failing statement aborts the script.
pub async fn execute_script(pool: &SqlitePool, sql: &str) -> Result<Vec<u64>> {
    let mut results = Vec::new();

    for statement in split_statements(sql) {
        debug!("Executing: {}", preview(&statement, 80));
        let outcome = sqlx::query(&statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute statement: {}", preview(&statement, 200)))?;
        results.push(outcome.rows_affected());
    }

    Ok(results)
}

fn preview(statement: &str, max_chars: usize) -> String {
    statement.chars().take(max_chars).collect()
}

/// Create database schema from the bundled migration SQL
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    info!("Creating database schema");
    execute_script(pool, SCHEMA_SQL)
        .await
        .context("Failed to create database schema")?;
    info!("Database schema created successfully");
    Ok(())
}

/// Verify database schema is correctly initialized
pub async fn verify_schema(pool: &SqlitePool) -> Result<bool> {
    debug!("Verifying database schema");

    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('notifications', 'heartbeats')",
    )
    .fetch_all(pool)
    .await
    .context("Failed to query table existence")?;

    let has_all_tables = tables.len() == REQUIRED_TABLES.len();

    if has_all_tables {
        debug!("All required tables exist");
    } else {
        error!("Missing required tables. Found: {:?}", tables);
    }

    Ok(has_all_tables)
}

/// Open (or create) the database file and make sure the schema is in place
pub async fn initialize_database<P: AsRef<Path>>(database_path: P) -> Result<SqlitePool> {
    if let Some(parent) = database_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let pool = create_pool(&database_path).await?;
    create_schema(&pool).await?;

    if !verify_schema(&pool).await? {
        anyhow::bail!("Database schema verification failed");
    }

    info!("Database initialized successfully at: {:?}", database_path.as_ref());
    Ok(pool)
}
