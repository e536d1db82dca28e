//! Database schema definitions for liftlog.
//!
//! Version 1 holds the owned training graph, version 2 adds the social tables.
//! Parent references whose children are removed by the cascade managers carry
//! foreign keys; snapshot references (`sessions.template_id`,
//! `personal_bests.set_log_id`) deliberately do not, because those rows
//! outlive their source.

/// SQL schema for creating the training tables.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Exercises table
CREATE TABLE IF NOT EXISTS exercises (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    -- Unicode-lowercased name, written by the application
    name_key TEXT NOT NULL,
    muscle_group TEXT NOT NULL DEFAULT '',
    exercise_type TEXT NOT NULL DEFAULT '',
    equipment TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT ''
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_owner_name
    ON exercises(owner_id, name_key);

-- Programs table
CREATE TABLE IF NOT EXISTS programs (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    start_date TEXT NOT NULL DEFAULT '',
    end_date TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'active',
    version INTEGER NOT NULL DEFAULT 1,
    visibility TEXT NOT NULL DEFAULT 'private',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_programs_owner_id ON programs(owner_id);

-- Workout templates table
CREATE TABLE IF NOT EXISTS workout_templates (
    id TEXT PRIMARY KEY,
    program_id TEXT NOT NULL REFERENCES programs(id),
    owner_id TEXT NOT NULL REFERENCES users(id),
    name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workout_templates_program_id ON workout_templates(program_id);
CREATE INDEX IF NOT EXISTS idx_workout_templates_owner_id ON workout_templates(owner_id);

-- Template rows table
CREATE TABLE IF NOT EXISTS template_rows (
    id TEXT PRIMARY KEY,
    template_id TEXT NOT NULL REFERENCES workout_templates(id),
    exercise_id TEXT NOT NULL REFERENCES exercises(id),
    planned_sets TEXT NOT NULL DEFAULT '',
    reps TEXT NOT NULL DEFAULT '',
    planned_weight TEXT NOT NULL DEFAULT '',
    rpe TEXT NOT NULL DEFAULT '',
    rest TEXT NOT NULL DEFAULT '',
    comment TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_template_rows_template_id ON template_rows(template_id);
CREATE INDEX IF NOT EXISTS idx_template_rows_exercise_id ON template_rows(exercise_id);

-- Sessions table
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    template_id TEXT NOT NULL,
    program_id TEXT NOT NULL REFERENCES programs(id),
    template_name TEXT NOT NULL DEFAULT '',
    program_name TEXT NOT NULL DEFAULT '',
    date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'in_progress'
);

CREATE INDEX IF NOT EXISTS idx_sessions_owner_id ON sessions(owner_id);
CREATE INDEX IF NOT EXISTS idx_sessions_program_id ON sessions(program_id);
CREATE INDEX IF NOT EXISTS idx_sessions_template_id ON sessions(template_id);

-- Set logs table (rowid order is logging order)
CREATE TABLE IF NOT EXISTS set_logs (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    exercise_id TEXT NOT NULL REFERENCES exercises(id),
    set_number INTEGER NOT NULL DEFAULT 1,
    weight REAL NOT NULL DEFAULT 0,
    reps INTEGER NOT NULL DEFAULT 0,
    rpe REAL NOT NULL DEFAULT 0,
    comment TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_set_logs_session_id ON set_logs(session_id);
CREATE INDEX IF NOT EXISTS idx_set_logs_exercise_id ON set_logs(exercise_id);

-- Personal bests table
CREATE TABLE IF NOT EXISTS personal_bests (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    exercise_id TEXT NOT NULL REFERENCES exercises(id),
    kind TEXT NOT NULL,
    rep_key INTEGER NOT NULL,
    label TEXT NOT NULL,
    value REAL NOT NULL,
    reps INTEGER NOT NULL,
    date TEXT NOT NULL,
    set_log_id TEXT NOT NULL,
    is_public INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_personal_bests_key
    ON personal_bests(owner_id, exercise_id, kind, rep_key);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for migration from v1 to v2 (social tables)
pub const MIGRATION_V1_TO_V2: &str = r#"
-- Friend requests table
CREATE TABLE IF NOT EXISTS friend_requests (
    id TEXT PRIMARY KEY,
    from_user_id TEXT NOT NULL REFERENCES users(id),
    to_user_id TEXT NOT NULL REFERENCES users(id),
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    CHECK(from_user_id <> to_user_id)
);

CREATE INDEX IF NOT EXISTS idx_friend_requests_from ON friend_requests(from_user_id, status);
CREATE INDEX IF NOT EXISTS idx_friend_requests_to ON friend_requests(to_user_id, status);

-- Friendships table, one canonical row per unordered pair
CREATE TABLE IF NOT EXISTS friendships (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    friend_id TEXT NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL,
    UNIQUE(user_id, friend_id),
    CHECK(user_id < friend_id)
);

CREATE INDEX IF NOT EXISTS idx_friendships_friend_id ON friendships(friend_id);
"#;
