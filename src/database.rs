// src/database.rs

use crate::constants::{META_LAST_SYNC, META_TOTAL_PROBLEMS, META_TOTAL_SOLUTIONS};
use log::debug;
use rusqlite::{Connection, Result};

pub fn init_db(conn: &Connection) -> Result<()> {
    debug!("init_db: checking database schema...");

    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS problems (
            problem_id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            title_slug TEXT NOT NULL,
            difficulty TEXT NOT NULL CHECK (difficulty IN ('Easy','Medium','Hard')),
            acceptance_rate REAL,
            is_premium INTEGER NOT NULL DEFAULT 0,
            problem_url TEXT,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS topics (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );
        CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );
        CREATE TABLE IF NOT EXISTS problem_topics (
            problem_id INTEGER NOT NULL REFERENCES problems(problem_id) ON DELETE CASCADE,
            topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            PRIMARY KEY (problem_id, topic_id)
        );
        CREATE TABLE IF NOT EXISTS problem_companies (
            problem_id INTEGER NOT NULL REFERENCES problems(problem_id) ON DELETE CASCADE,
            company_id INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
            PRIMARY KEY (problem_id, company_id)
        );
        CREATE TABLE IF NOT EXISTS solutions (
            id INTEGER PRIMARY KEY,
            problem_id INTEGER NOT NULL REFERENCES problems(problem_id) ON DELETE CASCADE,
            language TEXT NOT NULL,
            code TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'community',
            contributor TEXT,
            runtime TEXT,
            memory TEXT,
            contributed_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS roadmaps (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            display_name TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            total_problems INTEGER NOT NULL,
            problem_ids TEXT NOT NULL,
            difficulty_distribution TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS user_progress (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            problem_id INTEGER NOT NULL REFERENCES problems(problem_id) ON DELETE CASCADE,
            language TEXT NOT NULL,
            solved_at TEXT NOT NULL,
            runtime TEXT,
            memory TEXT,
            solution_code TEXT,
            notes TEXT,
            github_synced INTEGER NOT NULL DEFAULT 0,
            github_url TEXT,
            UNIQUE (user_id, problem_id, language)
        );
        CREATE TABLE IF NOT EXISTS user_roadmaps (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            roadmap_name TEXT NOT NULL,
            started_at TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_activity TEXT NOT NULL,
            UNIQUE (user_id, roadmap_name)
        );
        CREATE TABLE IF NOT EXISTS database_metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_problems_difficulty ON problems(difficulty);
        CREATE INDEX IF NOT EXISTS idx_solutions_problem_id ON solutions(problem_id);
        CREATE INDEX IF NOT EXISTS idx_progress_user_id ON user_progress(user_id);
        CREATE INDEX IF NOT EXISTS idx_progress_problem_id ON user_progress(problem_id);
        CREATE INDEX IF NOT EXISTS idx_user_roadmaps_user_id ON user_roadmaps(user_id);
        ",
    )?;

    seed_metadata(conn)?;

    Ok(())
}

/// The importer updates these keys in place, so they must exist on a fresh
/// store.
fn seed_metadata(conn: &Connection) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO database_metadata (key, value, updated_at) VALUES (?, '', ?)",
    )?;
    for key in [META_TOTAL_PROBLEMS, META_TOTAL_SOLUTIONS, META_LAST_SYNC] {
        stmt.execute(rusqlite::params![key, now])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_db_is_idempotent_and_seeds_metadata() {
        let conn = Connection::open_in_memory().expect("open in-memory sqlite");
        init_db(&conn).expect("first init");
        init_db(&conn).expect("second init");

        let keys: i64 = conn
            .query_row("SELECT count(*) FROM database_metadata", [], |r| r.get(0))
            .unwrap();
        assert_eq!(keys, 3);
    }

    #[test]
    fn difficulty_check_constraint_rejects_unknown_values() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO problems (problem_id, title, title_slug, difficulty, created_at)
             VALUES (1, 'X', 'x', 'Impossible', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
