//! Application-wide constants

// ============================================================================
// Application identity
// ============================================================================

pub const APP_NAME: &str = "PaceCrew";
pub const APP_NAME_LOWER: &str = "pacecrew";
pub const APP_DOT_FOLDER: &str = ".pacecrew";

// ============================================================================
// Environment variables
// ============================================================================

pub const ENV_LOG: &str = "PACECREW_LOG";
pub const ENV_DATA_DIR: &str = "PACECREW_DATA_DIR";
pub const ENV_CONFIG: &str = "PACECREW_CONFIG";
pub const ENV_HOST: &str = "PACECREW_HOST";
pub const ENV_PORT: &str = "PACECREW_PORT";
pub const ENV_DEBUG: &str = "PACECREW_DEBUG";
pub const ENV_UPLOADS_ENABLED: &str = "PACECREW_UPLOADS_ENABLED";

// ============================================================================
// Server defaults
// ============================================================================

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4800;
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Default request body limit (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
/// Auth endpoints accept small bodies only
pub const AUTH_BODY_LIMIT: usize = 16 * 1024;
/// Upload endpoint body limit: max image size plus multipart overhead
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

// ============================================================================
// SQLite tuning
// ============================================================================

pub const SQLITE_DB_FILENAME: &str = "pacecrew.db";
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;
pub const SQLITE_CACHE_SIZE: &str = "-8000";
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// ============================================================================
// Auth
// ============================================================================

pub const SESSION_COOKIE_NAME: &str = "pacecrew_session";
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 7;
pub const DEFAULT_USER_ID: &str = "local";
pub const SIGNING_KEY_FILENAME: &str = "signing.key";

/// Minimum password length for registration and password change
pub const MIN_PASSWORD_LEN: usize = 8;
/// PBKDF2-HMAC-SHA256 iteration count
pub const PBKDF2_ITERATIONS: u32 = 600_000;

// ============================================================================
// Uploads
// ============================================================================

/// Maximum upload size (5 MB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Allowed image extensions (lowercase, without dot)
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

// ============================================================================
// Domain limits
// ============================================================================

/// Default leaderboard size
pub const DEFAULT_LEADERBOARD_TOP_N: u32 = 25;
/// Maximum leaderboard size
pub const MAX_LEADERBOARD_TOP_N: u32 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_limit_fits_body_limit() {
        assert!(UPLOAD_BODY_LIMIT > MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_leaderboard_defaults_within_max() {
        assert!(DEFAULT_LEADERBOARD_TOP_N <= MAX_LEADERBOARD_TOP_N);
    }
}
