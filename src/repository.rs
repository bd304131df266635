// src/repository.rs

use crate::error::Result;
use crate::models::{
    Difficulty, NewSolution, Problem, ProgressRecord, Roadmap, SaveProgress, Solution, StoreStats,
    UserRoadmap,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

// --- Problems ---

pub fn problem_exists(conn: &Connection, problem_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT problem_id FROM problems WHERE problem_id = ?",
            [problem_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_problem(conn: &Connection, problem: &Problem) -> Result<()> {
    conn.execute(
        "INSERT INTO problems
         (problem_id, title, title_slug, difficulty, acceptance_rate, is_premium, problem_url, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            problem.problem_id,
            problem.title,
            problem.title_slug,
            problem.difficulty.as_str(),
            problem.acceptance_rate,
            problem.is_premium,
            problem.problem_url,
            problem.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_problem(conn: &Connection, problem_id: i64) -> Result<Option<Problem>> {
    let problem = conn
        .query_row(
            "SELECT problem_id, title, title_slug, difficulty, acceptance_rate,
                    is_premium, problem_url, created_at
             FROM problems WHERE problem_id = ?",
            [problem_id],
            row_to_problem,
        )
        .optional()?;
    Ok(problem)
}

pub fn get_topic_names_for_problem(conn: &Connection, problem_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM topics t
         JOIN problem_topics pt ON t.id = pt.topic_id
         WHERE pt.problem_id = ?
         ORDER BY t.name",
    )?;

    let topics = stmt
        .query_map([problem_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(topics)
}

fn row_to_problem(row: &Row) -> rusqlite::Result<Problem> {
    let difficulty: String = row.get(3)?;
    Ok(Problem {
        problem_id: row.get(0)?,
        title: row.get(1)?,
        title_slug: row.get(2)?,
        // FromStr falls back to Medium, never errors
        difficulty: Difficulty::from_str(&difficulty).unwrap_or(Difficulty::Medium),
        acceptance_rate: row.get(4)?,
        is_premium: row.get(5)?,
        problem_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// --- Topics & Companies ---

pub fn load_topic_ids(conn: &Connection) -> Result<HashMap<String, i64>> {
    load_name_ids(conn, "SELECT name, id FROM topics")
}

pub fn load_company_ids(conn: &Connection) -> Result<HashMap<String, i64>> {
    load_name_ids(conn, "SELECT name, id FROM companies")
}

fn load_name_ids(conn: &Connection, sql: &str) -> Result<HashMap<String, i64>> {
    let mut stmt = conn.prepare(sql)?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;
    Ok(pairs)
}

pub fn insert_topic(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO topics (name) VALUES (?)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_company(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO companies (name) VALUES (?)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn link_topic(conn: &Connection, problem_id: i64, topic_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO problem_topics (problem_id, topic_id) VALUES (?, ?)",
        params![problem_id, topic_id],
    )?;
    Ok(())
}

pub fn link_company(conn: &Connection, problem_id: i64, company_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO problem_companies (problem_id, company_id) VALUES (?, ?)",
        params![problem_id, company_id],
    )?;
    Ok(())
}

/// Distinct topic names with the live count of problems tagged with each,
/// in store iteration order (alphabetical).
pub fn topic_problem_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT t.name, count(pt.problem_id)
         FROM topics t
         JOIN problem_topics pt ON t.id = pt.topic_id
         GROUP BY t.name
         ORDER BY t.name",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(counts)
}

pub fn problem_ids_for_topic(conn: &Connection, topic_name: &str) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT pt.problem_id
         FROM problem_topics pt
         JOIN topics t ON t.id = pt.topic_id
         WHERE t.name = ?
         ORDER BY pt.problem_id",
    )?;
    let ids = stmt
        .query_map([topic_name], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

// --- Solutions ---

pub fn insert_solution(
    conn: &Connection,
    solution: &NewSolution,
    contributed_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO solutions
         (problem_id, language, code, source, contributor, runtime, memory, contributed_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            solution.problem_id,
            solution.language,
            solution.code,
            solution.source,
            solution.contributor,
            solution.runtime,
            solution.memory,
            contributed_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn solutions_for_problem(conn: &Connection, problem_id: i64) -> Result<Vec<Solution>> {
    let mut stmt = conn.prepare(
        "SELECT id, problem_id, language, code, source, contributor, runtime, memory, contributed_at
         FROM solutions WHERE problem_id = ? ORDER BY id",
    )?;
    let solutions = stmt
        .query_map([problem_id], |row| {
            Ok(Solution {
                id: row.get(0)?,
                problem_id: row.get(1)?,
                language: row.get(2)?,
                code: row.get(3)?,
                source: row.get(4)?,
                contributor: row.get(5)?,
                runtime: row.get(6)?,
                memory: row.get(7)?,
                contributed_at: row.get(8)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(solutions)
}

// --- Roadmaps ---

pub fn roadmap_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM roadmaps WHERE name = ?", [name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_roadmap(conn: &Connection, roadmap: &Roadmap) -> Result<i64> {
    conn.execute(
        "INSERT INTO roadmaps
         (name, display_name, description, category, total_problems,
          problem_ids, difficulty_distribution, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            roadmap.name,
            roadmap.display_name,
            roadmap.description,
            roadmap.category,
            roadmap.total_problems,
            serde_json::to_string(&roadmap.problem_ids)?,
            serde_json::to_string(&roadmap.difficulty_distribution)?,
            roadmap.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_roadmap(conn: &Connection, name: &str) -> Result<Option<Roadmap>> {
    let raw = conn
        .query_row(
            "SELECT id, name, display_name, description, category, total_problems,
                    problem_ids, difficulty_distribution, created_at
             FROM roadmaps WHERE name = ?",
            [name],
            row_to_raw_roadmap,
        )
        .optional()?;
    raw.map(RawRoadmap::parse).transpose()
}

pub fn curated_roadmaps(conn: &Connection) -> Result<Vec<Roadmap>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, display_name, description, category, total_problems,
                problem_ids, difficulty_distribution, created_at
         FROM roadmaps WHERE category = 'curated' ORDER BY id",
    )?;
    let raw = stmt
        .query_map([], row_to_raw_roadmap)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raw.into_iter().map(RawRoadmap::parse).collect()
}

/// Roadmap row before its JSON-in-TEXT columns have been decoded.
struct RawRoadmap {
    roadmap: Roadmap,
    problem_ids: String,
    distribution: String,
}

impl RawRoadmap {
    fn parse(mut self) -> Result<Roadmap> {
        self.roadmap.problem_ids = serde_json::from_str(&self.problem_ids)?;
        self.roadmap.difficulty_distribution = serde_json::from_str(&self.distribution)?;
        Ok(self.roadmap)
    }
}

fn row_to_raw_roadmap(row: &Row) -> rusqlite::Result<RawRoadmap> {
    Ok(RawRoadmap {
        roadmap: Roadmap {
            id: row.get(0)?,
            name: row.get(1)?,
            display_name: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            total_problems: row.get(5)?,
            problem_ids: Vec::new(),
            difficulty_distribution: BTreeMap::new(),
            created_at: row.get(8)?,
        },
        problem_ids: row.get(6)?,
        distribution: row.get(7)?,
    })
}

/// Counts the given problems grouped by difficulty. Used to snapshot a
/// curated roadmap's distribution at creation time.
pub fn difficulty_counts(conn: &Connection, problem_ids: &[i64]) -> Result<BTreeMap<String, i64>> {
    if problem_ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let placeholders = problem_ids
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "SELECT difficulty, count(*)
         FROM problems
         WHERE problem_id IN ({})
         GROUP BY difficulty",
        placeholders
    );

    let query_params: Vec<Box<dyn rusqlite::ToSql>> = problem_ids
        .iter()
        .map(|id| Box::new(*id) as Box<dyn rusqlite::ToSql>)
        .collect();

    let mut stmt = conn.prepare(&sql)?;
    let counts = stmt
        .query_map(rusqlite::params_from_iter(query_params.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
    Ok(counts)
}

// --- User Progress ---

/// Upserts on (user_id, problem_id, language) and returns the row id.
/// Last write wins; the row id is stable across updates.
pub fn upsert_progress(
    conn: &Connection,
    request: &SaveProgress,
    solved_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO user_progress
         (user_id, problem_id, language, solved_at, runtime, memory,
          solution_code, notes, github_synced, github_url)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(user_id, problem_id, language) DO UPDATE SET
             solved_at = excluded.solved_at,
             runtime = excluded.runtime,
             memory = excluded.memory,
             solution_code = excluded.solution_code,
             notes = excluded.notes,
             github_synced = excluded.github_synced,
             github_url = excluded.github_url",
        params![
            request.user_id,
            request.problem_id,
            request.language,
            solved_at,
            request.runtime,
            request.memory,
            request.solution_code,
            request.notes,
            request.github_synced,
            request.github_url,
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM user_progress WHERE user_id = ? AND problem_id = ? AND language = ?",
        params![request.user_id, request.problem_id, request.language],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn progress_for_problem(
    conn: &Connection,
    user_id: &str,
    problem_id: i64,
) -> Result<Vec<ProgressRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, problem_id, language, solved_at, runtime, memory,
                solution_code, notes, github_synced, github_url
         FROM user_progress
         WHERE user_id = ? AND problem_id = ?
         ORDER BY solved_at DESC",
    )?;
    let records = stmt
        .query_map(params![user_id, problem_id], row_to_progress)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

fn row_to_progress(row: &Row) -> rusqlite::Result<ProgressRecord> {
    Ok(ProgressRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        problem_id: row.get(2)?,
        language: row.get(3)?,
        solved_at: row.get(4)?,
        runtime: row.get(5)?,
        memory: row.get(6)?,
        solution_code: row.get(7)?,
        notes: row.get(8)?,
        github_synced: row.get(9)?,
        github_url: row.get(10)?,
    })
}

/// Distinct solved problems within the given member set, grouped by the
/// problem's difficulty. A problem solved in several languages counts once.
pub fn completed_by_difficulty(
    conn: &Connection,
    user_id: &str,
    problem_ids: &[i64],
) -> Result<BTreeMap<String, i64>> {
    if problem_ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let placeholders = problem_ids
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "SELECT p.difficulty, count(DISTINCT up.problem_id)
         FROM user_progress up
         JOIN problems p ON up.problem_id = p.problem_id
         WHERE up.user_id = ?
         AND up.problem_id IN ({})
         GROUP BY p.difficulty",
        placeholders
    );

    let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    query_params.push(Box::new(user_id.to_string()));
    for id in problem_ids {
        query_params.push(Box::new(*id));
    }

    let mut stmt = conn.prepare(&sql)?;
    let counts = stmt
        .query_map(rusqlite::params_from_iter(query_params.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
    Ok(counts)
}

/// Most recent solve across ALL of the user's progress rows, not filtered
/// to any roadmap.
pub fn last_activity(conn: &Connection, user_id: &str) -> Result<Option<DateTime<Utc>>> {
    let ts = conn.query_row(
        "SELECT max(solved_at) FROM user_progress WHERE user_id = ?",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(ts)
}

// --- User Roadmaps ---

pub fn upsert_user_roadmap(
    conn: &Connection,
    user_id: &str,
    roadmap_name: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO user_roadmaps (user_id, roadmap_name, started_at, is_active, last_activity)
         VALUES (?, ?, ?, 1, ?)
         ON CONFLICT(user_id, roadmap_name) DO UPDATE SET
             is_active = 1,
             last_activity = excluded.last_activity",
        params![user_id, roadmap_name, now, now],
    )?;
    Ok(())
}

pub fn active_user_roadmaps(conn: &Connection, user_id: &str) -> Result<Vec<UserRoadmap>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, roadmap_name, started_at, is_active, last_activity
         FROM user_roadmaps
         WHERE user_id = ? AND is_active = 1
         ORDER BY started_at",
    )?;
    let roadmaps = stmt
        .query_map([user_id], |row| {
            Ok(UserRoadmap {
                id: row.get(0)?,
                user_id: row.get(1)?,
                roadmap_name: row.get(2)?,
                started_at: row.get(3)?,
                is_active: row.get(4)?,
                last_activity: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(roadmaps)
}

// --- Metadata & Counts ---

pub fn set_metadata(conn: &Connection, key: &str, value: &str, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO database_metadata (key, value, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

pub fn get_metadata(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM database_metadata WHERE key = ?",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn count_problems(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM problems", [], |r| r.get(0))?)
}

pub fn count_solutions(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM solutions", [], |r| r.get(0))?)
}

pub fn count_topics(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM topics", [], |r| r.get(0))?)
}

pub fn count_companies(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM companies", [], |r| r.get(0))?)
}

pub fn count_roadmaps(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM roadmaps", [], |r| r.get(0))?)
}

pub fn store_stats(conn: &Connection) -> Result<StoreStats> {
    Ok(StoreStats {
        total_problems: count_problems(conn)?,
        total_solutions: count_solutions(conn)?,
        total_topics: count_topics(conn)?,
        total_companies: count_companies(conn)?,
        last_sync: get_metadata(conn, crate::constants::META_LAST_SYNC)?
            .filter(|v| !v.is_empty()),
    })
}
