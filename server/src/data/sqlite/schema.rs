//! SQLite schema definitions
//!
//! Initial schema with all tables. Uniqueness invariants (one membership
//! per (group, user), one attendance per (run, user), one progress row per
//! (challenge, user), unique email) live here as constraints - the
//! application layer never does check-then-insert for them.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3 AND length(email) <= 254),
    display_name TEXT CHECK(display_name IS NULL OR length(display_name) <= 100),
    avatar_url TEXT,
    -- NULL only for the seeded local user (--no-auth mode)
    password_hash TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

-- =============================================================================
-- 2. Groups (owner fixed at creation; owner deletion restricted)
-- =============================================================================
CREATE TABLE IF NOT EXISTS groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    description TEXT,
    location TEXT,
    avatar_url TEXT,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_groups_owner ON groups(owner_id);

-- =============================================================================
-- 3. Group Members (owner is implicit, never gets a row)
-- =============================================================================
CREATE TABLE IF NOT EXISTS group_members (
    group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (group_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id);

-- =============================================================================
-- 4. Scheduled Runs (owner-only create, author-only mutate)
-- =============================================================================
CREATE TABLE IF NOT EXISTS scheduled_runs (
    id TEXT PRIMARY KEY,
    group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    author_id TEXT NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    title TEXT NOT NULL CHECK(length(title) >= 1 AND length(title) <= 200),
    starts_at INTEGER,
    location TEXT,
    pace TEXT,
    distance_km REAL CHECK(distance_km IS NULL OR distance_km > 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_scheduled_runs_group ON scheduled_runs(group_id, starts_at);

-- =============================================================================
-- 5. Attendance (one RSVP per (run, user))
-- =============================================================================
CREATE TABLE IF NOT EXISTS attendance (
    id TEXT PRIMARY KEY,
    run_id TEXT NOT NULL REFERENCES scheduled_runs(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status TEXT NOT NULL CHECK(status IN ('going', 'maybe', 'not_going')),
    notes TEXT CHECK(notes IS NULL OR length(notes) <= 500),
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    UNIQUE(run_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_attendance_run ON attendance(run_id);
CREATE INDEX IF NOT EXISTS idx_attendance_user ON attendance(user_id);

-- =============================================================================
-- 6. Run Comments
-- =============================================================================
CREATE TABLE IF NOT EXISTS run_comments (
    id TEXT PRIMARY KEY,
    run_id TEXT NOT NULL REFERENCES scheduled_runs(id) ON DELETE CASCADE,
    author_id TEXT NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    body TEXT NOT NULL CHECK(length(body) >= 1 AND length(body) <= 2000),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_run_comments_run ON run_comments(run_id, created_at);

-- =============================================================================
-- 7. Shoes (mileage is derived, never stored)
-- =============================================================================
CREATE TABLE IF NOT EXISTS shoes (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    brand TEXT,
    base_distance_km REAL NOT NULL DEFAULT 0 CHECK(base_distance_km >= 0),
    retired INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_shoes_user ON shoes(user_id);

-- =============================================================================
-- 8. Activities (individual logged runs)
-- =============================================================================
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    shoe_id TEXT REFERENCES shoes(id) ON DELETE SET NULL,
    title TEXT CHECK(title IS NULL OR length(title) <= 200),
    distance_km REAL NOT NULL CHECK(distance_km > 0),
    duration_secs INTEGER CHECK(duration_secs IS NULL OR duration_secs > 0),
    run_date TEXT NOT NULL,
    notes TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activities_user_date ON activities(user_id, run_date);
CREATE INDEX IF NOT EXISTS idx_activities_shoe ON activities(shoe_id);

-- =============================================================================
-- 9. Challenges
-- =============================================================================
CREATE TABLE IF NOT EXISTS challenges (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK(length(title) >= 1 AND length(title) <= 200),
    description TEXT,
    kind TEXT NOT NULL CHECK(kind IN ('daily_distance', 'total_distance', 'run_streak', 'custom')),
    required_km_per_day REAL CHECK(required_km_per_day IS NULL OR required_km_per_day > 0),
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL CHECK(end_date > start_date),
    is_public INTEGER NOT NULL DEFAULT 1,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_by TEXT NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_challenges_active ON challenges(is_active, end_date);

-- =============================================================================
-- 10. Challenge Progress (one row per (challenge, user))
-- =============================================================================
CREATE TABLE IF NOT EXISTS challenge_progress (
    id TEXT PRIMARY KEY,
    challenge_id TEXT NOT NULL REFERENCES challenges(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    days_completed INTEGER NOT NULL DEFAULT 0,
    total_distance_km REAL NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_run_date TEXT,
    last_streak_date TEXT,
    is_complete INTEGER NOT NULL DEFAULT 0,
    joined_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(challenge_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_progress_user ON challenge_progress(user_id);
CREATE INDEX IF NOT EXISTS idx_progress_leaderboard
    ON challenge_progress(challenge_id, total_distance_km DESC, current_streak DESC, joined_at ASC);

-- =============================================================================
-- 11. Group Messages (chat history)
-- =============================================================================
CREATE TABLE IF NOT EXISTS group_messages (
    id TEXT PRIMARY KEY,
    group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    author_id TEXT NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    body TEXT NOT NULL CHECK(length(body) >= 1 AND length(body) <= 2000),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_group_messages_group ON group_messages(group_id, created_at);

-- =============================================================================
-- Default Data (inserted in dependency order)
-- =============================================================================

-- 1. Default local user (--no-auth mode)
INSERT OR IGNORE INTO users (id, email, display_name, created_at, updated_at)
VALUES ('local', 'local@pacecrew.local', 'Local Runner', strftime('%s', 'now'), strftime('%s', 'now'));

-- 2. Default group (owned by the local user)
INSERT OR IGNORE INTO groups (id, name, description, owner_id, created_at, updated_at)
VALUES ('default', 'Default Crew', 'Your first running group', 'local', strftime('%s', 'now'), strftime('%s', 'now'));
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn test_schema_contains_required_tables() {
        let required_tables = [
            "schema_version",
            "schema_migrations",
            "users",
            "groups",
            "group_members",
            "scheduled_runs",
            "attendance",
            "run_comments",
            "shoes",
            "activities",
            "challenges",
            "challenge_progress",
            "group_messages",
        ];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_enforces_uniqueness_invariants() {
        // These constraints are load-bearing: concurrent duplicate requests
        // must be rejected by the storage layer, not application checks.
        assert!(SCHEMA.contains("PRIMARY KEY (group_id, user_id)"));
        assert!(SCHEMA.contains("UNIQUE(run_id, user_id)"));
        assert!(SCHEMA.contains("UNIQUE(challenge_id, user_id)"));
        assert!(SCHEMA.contains("email TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn test_schema_contains_default_data() {
        assert!(
            SCHEMA.contains("INSERT OR IGNORE INTO users"),
            "Schema missing default user"
        );
        assert!(
            SCHEMA.contains("INSERT OR IGNORE INTO groups"),
            "Schema missing default group"
        );
    }
}
