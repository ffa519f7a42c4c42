/// Inline SQL migrations for the mealweek database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: plans table
    r#"
CREATE TABLE IF NOT EXISTS plans (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    settings_json TEXT NOT NULL DEFAULT '{}',
    share_id      TEXT UNIQUE,
    created_at    TEXT NOT NULL
);
"#,
    // Migration 2: recipes table, cascade-deleted with their plan
    r#"
CREATE TABLE IF NOT EXISTS recipes (
    id                TEXT PRIMARY KEY,
    plan_id           TEXT NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
    day_of_week       INTEGER NOT NULL,
    title             TEXT NOT NULL,
    category          TEXT NOT NULL,
    ingredients_json  TEXT NOT NULL DEFAULT '[]',
    instructions_json TEXT NOT NULL DEFAULT '[]',
    calories          INTEGER NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_recipes_plan ON recipes(plan_id);
"#,
    // Migration 3: jobs table. related_plan_id cascades so a deleted
    // plan never leaves a dangling share job behind.
    r#"
CREATE TABLE IF NOT EXISTS jobs (
    id              TEXT PRIMARY KEY,
    job_type        TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'pending',
    payload_json    TEXT NOT NULL,
    progress_text   TEXT,
    result_json     TEXT,
    error_message   TEXT,
    related_plan_id TEXT REFERENCES plans(id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_jobs_related_plan ON jobs(related_plan_id);
"#,
];
