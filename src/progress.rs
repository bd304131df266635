// src/progress.rs

use crate::error::{Error, Result};
use crate::models::{NewSolution, ProgressRecord, SaveProgress};
use crate::repository;
use chrono::Utc;
use log::info;
use rusqlite::Connection;

// --- Public Interface ---

/// Records a submission. One row per (user, problem, language); a repeat
/// submission overwrites the previous one. Returns the row id.
pub fn save_progress(conn: &Connection, request: &SaveProgress) -> Result<i64> {
    if !repository::problem_exists(conn, request.problem_id)? {
        return Err(Error::ProblemNotFound(request.problem_id));
    }

    let id = repository::upsert_progress(conn, request, Utc::now())?;
    info!(
        "Progress saved: user {} problem #{} ({})",
        request.user_id, request.problem_id, request.language
    );
    Ok(id)
}

/// All of the user's progress entries for one problem, newest first.
pub fn problem_progress(
    conn: &Connection,
    user_id: &str,
    problem_id: i64,
) -> Result<Vec<ProgressRecord>> {
    repository::progress_for_problem(conn, user_id, problem_id)
}

// --- Contribution ---

/// Appends an accepted community solution to an existing problem. The
/// contribution workflow re-imports it into the snapshot separately; the
/// store only guarantees the problem reference is valid.
pub fn contribute_solution(conn: &Connection, solution: &NewSolution) -> Result<i64> {
    if !repository::problem_exists(conn, solution.problem_id)? {
        return Err(Error::ProblemNotFound(solution.problem_id));
    }

    let id = repository::insert_solution(conn, solution, Utc::now())?;
    info!(
        "Solution contributed for problem #{} ({}, {})",
        solution.problem_id, solution.language, solution.source
    );
    Ok(id)
}
