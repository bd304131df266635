// src/roadmaps.rs

use crate::constants::{CATEGORY_TOPIC, LEARNING_ORDER, TOPIC_ROADMAP_PREFIX};
use crate::error::{Error, Result};
use crate::models::{ActiveRoadmap, ProgressReport, RoadmapInfo};
use crate::repository;
use chrono::Utc;
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::HashMap;

// --- Public Interface ---

/// All learning paths a user may follow: curated roadmaps read from the
/// store, then one synthesized roadmap per topic in the fixed learning
/// order. Topic counts are live; curated counts are import-time snapshots.
pub fn catalog(conn: &Connection) -> Result<Vec<RoadmapInfo>> {
    let mut roadmaps = Vec::new();

    for roadmap in repository::curated_roadmaps(conn)? {
        roadmaps.push(RoadmapInfo {
            name: roadmap.name,
            display_name: roadmap.display_name,
            category: roadmap.category,
            total_problems: roadmap.total_problems,
            description: roadmap.description,
            difficulty_distribution: Some(roadmap.difficulty_distribution),
        });
    }

    let topic_counts = repository::topic_problem_counts(conn)?;
    let by_name: HashMap<&str, i64> = topic_counts
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();

    for &topic in LEARNING_ORDER {
        if let Some(&count) = by_name.get(topic) {
            roadmaps.push(topic_roadmap_info(topic, count));
        }
    }

    // Topics the learning order does not know about go last, in store
    // iteration order.
    for (topic, count) in &topic_counts {
        if !LEARNING_ORDER.contains(&topic.as_str()) {
            roadmaps.push(topic_roadmap_info(topic, *count));
        }
    }

    debug!("Catalog assembled: {} roadmaps", roadmaps.len());
    Ok(roadmaps)
}

/// Resolves a roadmap's member-problem set. Topic roadmaps recompute from
/// live topic membership; curated roadmaps use the stored id list.
pub fn roadmap_problem_ids(conn: &Connection, roadmap_name: &str) -> Result<Vec<i64>> {
    if let Some(topic) = topic_from_roadmap_name(roadmap_name) {
        return repository::problem_ids_for_topic(conn, &topic);
    }
    match repository::get_roadmap(conn, roadmap_name)? {
        Some(roadmap) => Ok(roadmap.problem_ids),
        None => Err(Error::RoadmapNotFound(roadmap_name.to_string())),
    }
}

/// Completion percentage and per-difficulty breakdown for one user on one
/// roadmap. An empty roadmap reports 0%, never a division by zero.
pub fn roadmap_progress(
    conn: &Connection,
    roadmap_name: &str,
    user_id: &str,
) -> Result<ProgressReport> {
    let member_ids = roadmap_problem_ids(conn, roadmap_name)?;
    let total_problems = member_ids.len() as i64;

    let by_difficulty = repository::completed_by_difficulty(conn, user_id, &member_ids)?;
    let completed_problems: i64 = by_difficulty.values().sum();

    let progress_percentage = if total_problems > 0 {
        round2(completed_problems as f64 / total_problems as f64 * 100.0)
    } else {
        0.0
    };

    // Across all of the user's records, not just this roadmap.
    let last_activity = repository::last_activity(conn, user_id)?;

    Ok(ProgressReport {
        user_id: user_id.to_string(),
        roadmap_name: roadmap_name.to_string(),
        total_problems,
        completed_problems,
        progress_percentage,
        by_difficulty,
        last_activity,
    })
}

/// Marks a roadmap active for the user, refreshing the activity timestamp
/// if it was already tracked.
pub fn activate(conn: &Connection, roadmap_name: &str, user_id: &str) -> Result<()> {
    repository::upsert_user_roadmap(conn, user_id, roadmap_name, Utc::now())?;
    info!("Roadmap '{}' activated for user {}", roadmap_name, user_id);
    Ok(())
}

/// The user's active roadmaps, each with an embedded progress report.
pub fn active_roadmaps(conn: &Connection, user_id: &str) -> Result<Vec<ActiveRoadmap>> {
    let mut result = Vec::new();
    for tracked in repository::active_user_roadmaps(conn, user_id)? {
        match roadmap_progress(conn, &tracked.roadmap_name, user_id) {
            Ok(progress) => result.push(ActiveRoadmap {
                roadmap_name: tracked.roadmap_name,
                started_at: tracked.started_at,
                last_activity: tracked.last_activity,
                progress,
            }),
            // Activation never validated the name; a stale entry must not
            // take the whole listing down.
            Err(Error::RoadmapNotFound(name)) => {
                warn!("Skipping unknown activated roadmap '{}'", name);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(result)
}

// --- Naming ---

pub fn topic_roadmap_name(topic: &str) -> String {
    format!("{}{}", TOPIC_ROADMAP_PREFIX, topic.replace(' ', "_"))
}

/// Inverse of [`topic_roadmap_name`]: strips the prefix, restores spaces
/// and title-cases the result, so lowercased names from clients still
/// resolve. Returns `None` for curated names.
pub fn topic_from_roadmap_name(roadmap_name: &str) -> Option<String> {
    roadmap_name
        .strip_prefix(TOPIC_ROADMAP_PREFIX)
        .map(|rest| title_case(&rest.replace('_', " ")))
}

/// Uppercases each letter that follows a non-letter and lowercases the
/// rest, matching the transformation the extension applies on its side.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

fn topic_roadmap_info(topic: &str, count: i64) -> RoadmapInfo {
    RoadmapInfo {
        name: topic_roadmap_name(topic),
        display_name: format!("{} Mastery", topic),
        category: CATEGORY_TOPIC.to_string(),
        total_problems: count,
        description: Some(format!("Master {} from basics to advanced", topic)),
        difficulty_distribution: None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_db;
    use crate::importer;
    use crate::models::SaveProgress;
    use serde_json::json;

    fn seeded_store() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory sqlite");
        init_db(&conn).expect("init schema");

        let data = serde_json::from_value(json!({
            "problems": [
                {
                    "id": 1, "title": "Two Sum", "title_slug": "two-sum",
                    "difficulty": "Easy", "topics": ["Array", "Hash Table"],
                    "roadmaps": ["blind_75"]
                },
                {
                    "id": 2, "title": "3Sum", "title_slug": "3sum",
                    "difficulty": "Medium", "topics": ["Array", "Two Pointers"]
                },
                {
                    "id": 3, "title": "Word Ladder", "title_slug": "word-ladder",
                    "difficulty": "Hard", "topics": ["Array", "Zzz Custom"],
                    "roadmaps": ["blind_75"]
                }
            ]
        }))
        .unwrap();
        importer::run(&mut conn, data).unwrap();
        conn
    }

    fn solve(conn: &Connection, user: &str, problem_id: i64, language: &str) {
        let request = SaveProgress {
            user_id: user.into(),
            problem_id,
            language: language.into(),
            solution_code: "pass".into(),
            runtime: None,
            memory: None,
            notes: None,
            github_synced: false,
            github_url: None,
        };
        repository::upsert_progress(conn, &request, Utc::now()).unwrap();
    }

    #[test]
    fn catalog_lists_curated_then_topics_in_learning_order() {
        let conn = seeded_store();
        let roadmaps = catalog(&conn).unwrap();

        let names: Vec<&str> = roadmaps.iter().map(|r| r.name.as_str()).collect();
        let first_topic = names
            .iter()
            .position(|n| n.starts_with(TOPIC_ROADMAP_PREFIX))
            .unwrap();

        // Everything before the first topic roadmap is curated.
        assert!(roadmaps[..first_topic].iter().all(|r| r.category == "curated"));

        let topic_names: Vec<&str> = names[first_topic..].to_vec();
        // Learning order: Array < Hash Table < Two Pointers; unknown topic last.
        assert_eq!(
            topic_names,
            vec![
                "topic_Array",
                "topic_Hash_Table",
                "topic_Two_Pointers",
                "topic_Zzz_Custom"
            ]
        );
    }

    #[test]
    fn topic_counts_are_live() {
        let conn = seeded_store();
        let roadmaps = catalog(&conn).unwrap();
        let array = roadmaps.iter().find(|r| r.name == "topic_Array").unwrap();
        assert_eq!(array.total_problems, 3);
        assert!(array.difficulty_distribution.is_none());
    }

    #[test]
    fn topic_name_round_trips_through_lowercase() {
        assert_eq!(topic_roadmap_name("Hash Table"), "topic_Hash_Table");
        assert_eq!(
            topic_from_roadmap_name("topic_hash_table").as_deref(),
            Some("Hash Table")
        );
        assert_eq!(
            topic_from_roadmap_name("topic_3sum").as_deref(),
            Some("3Sum")
        );
        assert_eq!(topic_from_roadmap_name("blind_75"), None);
    }

    #[test]
    fn progress_counts_multi_language_solves_once() {
        let conn = seeded_store();
        solve(&conn, "u1", 1, "python");
        solve(&conn, "u1", 1, "java");

        let report = roadmap_progress(&conn, "topic_Array", "u1").unwrap();
        assert_eq!(report.total_problems, 3);
        assert_eq!(report.completed_problems, 1);
        assert_eq!(report.progress_percentage, 33.33);
        assert_eq!(report.by_difficulty.get("Easy"), Some(&1));
    }

    #[test]
    fn progress_stays_within_bounds() {
        let conn = seeded_store();
        for id in [1, 2, 3] {
            solve(&conn, "u1", id, "python");
        }
        let report = roadmap_progress(&conn, "topic_Array", "u1").unwrap();
        assert_eq!(report.progress_percentage, 100.0);
        assert_eq!(report.completed_problems, 3);
    }

    #[test]
    fn empty_topic_roadmap_reports_zero_percent() {
        let conn = seeded_store();
        let report = roadmap_progress(&conn, "topic_Dynamic_Programming", "u1").unwrap();
        assert_eq!(report.total_problems, 0);
        assert_eq!(report.completed_problems, 0);
        assert_eq!(report.progress_percentage, 0.0);
    }

    #[test]
    fn unknown_curated_roadmap_is_not_found() {
        let conn = seeded_store();
        let err = roadmap_progress(&conn, "grind_999", "u1").unwrap_err();
        assert!(matches!(err, Error::RoadmapNotFound(name) if name == "grind_999"));
    }

    #[test]
    fn last_activity_ignores_roadmap_filter() {
        let conn = seeded_store();
        // Problem 2 is not in blind_75, yet its solve moves last_activity.
        solve(&conn, "u1", 2, "python");

        let report = roadmap_progress(&conn, "blind_75", "u1").unwrap();
        assert_eq!(report.completed_problems, 0);
        assert!(report.last_activity.is_some());
    }

    #[test]
    fn activation_is_idempotent_and_embeds_progress() {
        let conn = seeded_store();
        solve(&conn, "u1", 1, "python");
        activate(&conn, "blind_75", "u1").unwrap();
        activate(&conn, "blind_75", "u1").unwrap();

        let active = active_roadmaps(&conn, "u1").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].roadmap_name, "blind_75");
        assert_eq!(active[0].progress.completed_problems, 1);
        assert_eq!(active[0].progress.total_problems, 2);
        assert_eq!(active[0].progress.progress_percentage, 50.0);
    }

    #[test]
    fn stale_activation_is_skipped_not_fatal() {
        let conn = seeded_store();
        activate(&conn, "deleted_roadmap", "u1").unwrap();
        activate(&conn, "blind_75", "u1").unwrap();

        let active = active_roadmaps(&conn, "u1").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].roadmap_name, "blind_75");
    }
}
