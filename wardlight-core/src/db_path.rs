use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the database location.
pub const DATABASE_PATH_ENV: &str = "WARDLIGHT_DATABASE_PATH";

/// Get the global Wardlight data directory (~/.wardlight/data)
fn get_global_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wardlight")
        .join("data")
}

/// Get the Wardlight database path
///
/// The web server and the `db-exec` command must agree on a single file,
/// so both resolve it here.
///
/// Priority:
/// 1. WARDLIGHT_DATABASE_PATH env var (absolute path override)
/// 2. Global: ~/.wardlight/data/wardlight.db
pub fn get_database_path() -> PathBuf {
    if let Ok(db_path) = env::var(DATABASE_PATH_ENV) {
        return PathBuf::from(db_path);
    }

    get_global_data_dir().join("wardlight.db")
}

/// SQLite connection URL for the resolved database path
pub fn get_database_url() -> String {
    format!("sqlite://{}", get_database_path().to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env var is never observed half-set by a sibling test.
    #[test]
    fn test_database_path_env_override() {
        std::env::set_var(DATABASE_PATH_ENV, "/custom/path/ward.db");

        assert_eq!(get_database_path(), PathBuf::from("/custom/path/ward.db"));
        assert_eq!(get_database_url(), "sqlite:///custom/path/ward.db");

        std::env::remove_var(DATABASE_PATH_ENV);

        let default_path = get_database_path();
        assert!(default_path.ends_with(".wardlight/data/wardlight.db"));
    }
}
