// src/importer.rs
//
// One-shot migration of the JSON snapshot into the relational store.
// The whole run executes inside a single transaction: any failure rolls
// everything back and the operator re-runs after fixing the cause.

use crate::constants::{
    CATEGORY_CURATED, CURATED_SHEETS, CURATOR_ROADMAPS, META_LAST_SYNC, META_TOTAL_PROBLEMS,
    META_TOTAL_SOLUTIONS, SOURCE_DEFAULT,
};
use crate::error::Result;
use crate::models::{
    Difficulty, JsonDatabase, MigrationReport, NewSolution, Problem, Roadmap,
};
use crate::repository;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Reads and parses the snapshot document fully into memory. A missing or
/// malformed file is fatal for the run.
pub fn load_snapshot(path: &Path) -> Result<JsonDatabase> {
    info!("Loading snapshot from {}...", path.display());
    let raw = std::fs::read_to_string(path)?;
    let data: JsonDatabase = serde_json::from_str(&raw)?;
    info!("Loaded {} problems", data.problems.len());
    Ok(data)
}

/// Membership being collected for one named roadmap during the pass over
/// the problem records.
struct RoadmapAccumulator {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    /// Source tag that enrolls a problem, for curator roadmaps.
    curator_tag: Option<&'static str>,
    members: Vec<i64>,
}

impl RoadmapAccumulator {
    fn enroll(&mut self, problem_id: i64) {
        if !self.members.contains(&problem_id) {
            self.members.push(problem_id);
        }
    }
}

fn accumulators() -> Vec<RoadmapAccumulator> {
    let sheets = CURATED_SHEETS
        .iter()
        .map(|&(name, display_name, description)| RoadmapAccumulator {
            name,
            display_name,
            description,
            curator_tag: None,
            members: Vec::new(),
        });
    let curators =
        CURATOR_ROADMAPS
            .iter()
            .map(|&(tag, name, display_name, description)| RoadmapAccumulator {
                name,
                display_name,
                description,
                curator_tag: Some(tag),
                members: Vec::new(),
            });
    sheets.chain(curators).collect()
}

/// Runs the migration. Idempotent at the Problem granularity: records whose
/// identifier is already present are skipped whole, and existing roadmap
/// rows are left untouched, so a re-run changes no counts.
pub fn run(conn: &mut Connection, data: JsonDatabase) -> Result<MigrationReport> {
    let now = Utc::now();
    let tx = conn.transaction()?;
    let report = import_all(&tx, data, now)?;
    tx.commit()?;
    Ok(report)
}

fn import_all(
    conn: &Connection,
    data: JsonDatabase,
    now: DateTime<Utc>,
) -> Result<MigrationReport> {
    // Name -> id caches, pre-populated so a resumed import reuses rows
    // created by an earlier run.
    let mut topics: HashMap<String, i64> = repository::load_topic_ids(conn)?;
    let mut companies: HashMap<String, i64> = repository::load_company_ids(conn)?;
    let mut roadmap_sets = accumulators();

    let total = data.problems.len();
    let mut imported: i64 = 0;
    let mut skipped: i64 = 0;

    info!("Processing problems and solutions...");

    for (idx, record) in data.problems.into_iter().enumerate() {
        if (idx + 1) % 100 == 0 {
            info!("Processed {}/{} problems...", idx + 1, total);
        }

        // Idempotence: a known identifier skips the whole record.
        if repository::problem_exists(conn, record.id)? {
            debug!("Problem #{} already present, skipping", record.id);
            skipped += 1;
            continue;
        }

        let problem = Problem {
            problem_id: record.id,
            title: record.title,
            title_slug: record.title_slug,
            difficulty: Difficulty::from_str(&record.difficulty).unwrap_or(Difficulty::Medium),
            acceptance_rate: record.acceptance_rate,
            is_premium: record.is_premium,
            problem_url: record.url,
            created_at: now,
        };
        // The problem row must exist before association and solution rows.
        repository::insert_problem(conn, &problem)?;

        for topic_name in &record.topics {
            let topic_id = match topics.get(topic_name) {
                Some(&id) => id,
                None => {
                    let id = repository::insert_topic(conn, topic_name)?;
                    topics.insert(topic_name.clone(), id);
                    id
                }
            };
            repository::link_topic(conn, record.id, topic_id)?;
        }

        for company_name in &record.companies {
            let company_id = match companies.get(company_name) {
                Some(&id) => id,
                None => {
                    let id = repository::insert_company(conn, company_name)?;
                    companies.insert(company_name.clone(), id);
                    id
                }
            };
            repository::link_company(conn, record.id, company_id)?;
        }

        if let Some(sheets) = &record.roadmaps {
            for acc in roadmap_sets.iter_mut().filter(|a| a.curator_tag.is_none()) {
                if sheets.contains(acc.name) {
                    acc.enroll(record.id);
                }
            }
        }

        if let Some(solutions) = record.solutions {
            for entry in solutions.into_entries() {
                let Some(language) = entry.language else {
                    warn!("Solution for problem #{} has no language, skipping", record.id);
                    continue;
                };
                let source = entry.source.unwrap_or_else(|| SOURCE_DEFAULT.to_string());

                for acc in roadmap_sets.iter_mut() {
                    if acc.curator_tag == Some(source.as_str()) {
                        acc.enroll(record.id);
                    }
                }

                let solution = NewSolution {
                    problem_id: record.id,
                    language,
                    code: entry.code,
                    source,
                    contributor: entry.contributor,
                    runtime: entry.runtime,
                    memory: entry.memory,
                };
                repository::insert_solution(conn, &solution, now)?;
            }
        }

        imported += 1;
    }

    info!("Creating curated roadmaps...");
    let mut roadmaps_created = 0;
    for acc in roadmap_sets {
        if repository::roadmap_exists(conn, acc.name)? {
            debug!("Roadmap '{}' already present, skipping", acc.name);
            continue;
        }
        let distribution = repository::difficulty_counts(conn, &acc.members)?;
        let roadmap = Roadmap {
            id: 0,
            name: acc.name.to_string(),
            display_name: acc.display_name.to_string(),
            description: Some(acc.description.to_string()),
            category: CATEGORY_CURATED.to_string(),
            total_problems: acc.members.len() as i64,
            problem_ids: acc.members,
            difficulty_distribution: distribution,
            created_at: now,
        };
        repository::insert_roadmap(conn, &roadmap)?;
        roadmaps_created += 1;
    }
    debug!("Created {} roadmap rows", roadmaps_created);

    let report = MigrationReport {
        problems_imported: imported,
        problems_skipped: skipped,
        solutions: repository::count_solutions(conn)?,
        topics: repository::count_topics(conn)?,
        companies: repository::count_companies(conn)?,
        roadmaps: repository::count_roadmaps(conn)?,
    };

    info!("Updating metadata...");
    let total_problems = repository::count_problems(conn)?;
    repository::set_metadata(conn, META_TOTAL_PROBLEMS, &total_problems.to_string(), now)?;
    repository::set_metadata(conn, META_TOTAL_SOLUTIONS, &report.solutions.to_string(), now)?;
    repository::set_metadata(conn, META_LAST_SYNC, &now.to_rfc3339(), now)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_db;
    use serde_json::json;

    fn store() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory sqlite");
        init_db(&conn).expect("init schema");
        conn
    }

    /// Two problems sharing the "Array" topic; A carries a NeetCode-tagged
    /// solution and sheet membership, B uses the per-language map shape.
    fn snapshot() -> JsonDatabase {
        serde_json::from_value(json!({
            "problems": [
                {
                    "id": 1,
                    "title": "Two Sum",
                    "title_slug": "two-sum",
                    "difficulty": "Easy",
                    "acceptance_rate": 49.1,
                    "topics": ["Array", "Hash Table"],
                    "companies": ["Google", "Amazon"],
                    "roadmaps": ["grind_250", "blind_75"],
                    "solutions": [
                        { "language": "python", "code": "pass", "source": "NeetCode" },
                        { "language": "java", "code": "{}" }
                    ]
                },
                {
                    "id": 2,
                    "title": "3Sum",
                    "title_slug": "3sum",
                    "difficulty": "Medium",
                    "topics": ["Array"],
                    "companies": ["Google"],
                    "roadmaps": { "grind_250": { "order": 7 } },
                    "solutions": {
                        "rust": [ { "code": "fn main() {}" } ]
                    }
                }
            ]
        }))
        .expect("valid fixture")
    }

    #[test]
    fn import_deduplicates_topics_and_companies() {
        let mut conn = store();
        let report = run(&mut conn, snapshot()).unwrap();

        assert_eq!(report.problems_imported, 2);
        assert_eq!(report.topics, 2); // "Array" shared, "Hash Table" distinct
        assert_eq!(report.companies, 2);

        let shared: i64 = conn
            .query_row(
                "SELECT count(*) FROM problem_topics pt
                 JOIN topics t ON t.id = pt.topic_id WHERE t.name = 'Array'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(shared, 2);
    }

    #[test]
    fn reimport_changes_no_counts() {
        let mut conn = store();
        let first = run(&mut conn, snapshot()).unwrap();
        let second = run(&mut conn, snapshot()).unwrap();

        assert_eq!(second.problems_imported, 0);
        assert_eq!(second.problems_skipped, 2);
        assert_eq!(first.solutions, second.solutions);
        assert_eq!(first.topics, second.topics);
        assert_eq!(first.companies, second.companies);
        assert_eq!(first.roadmaps, second.roadmaps);
    }

    #[test]
    fn solutions_accept_both_shapes_and_reference_their_problem() {
        let mut conn = store();
        let report = run(&mut conn, snapshot()).unwrap();
        assert_eq!(report.solutions, 3);

        // Every solution row resolves to an existing problem.
        let orphans: i64 = conn
            .query_row(
                "SELECT count(*) FROM solutions s
                 LEFT JOIN problems p ON s.problem_id = p.problem_id
                 WHERE p.problem_id IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);

        // Map-shape entry inherited its language from the key.
        let lang: String = conn
            .query_row(
                "SELECT language FROM solutions WHERE problem_id = 2",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(lang, "rust");
    }

    #[test]
    fn missing_source_defaults_to_community() {
        let mut conn = store();
        run(&mut conn, snapshot()).unwrap();

        let source: String = conn
            .query_row(
                "SELECT source FROM solutions WHERE problem_id = 1 AND language = 'java'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(source, "community");
    }

    #[test]
    fn sheet_membership_accepts_both_roadmaps_shapes() {
        let mut conn = store();
        run(&mut conn, snapshot()).unwrap();

        let grind = repository::get_roadmap(&conn, "grind_250").unwrap().unwrap();
        assert_eq!(grind.problem_ids, vec![1, 2]); // list shape and map shape
        let blind = repository::get_roadmap(&conn, "blind_75").unwrap().unwrap();
        assert_eq!(blind.problem_ids, vec![1]);
    }

    #[test]
    fn curator_source_enrolls_problem_in_curator_roadmap() {
        let mut conn = store();
        run(&mut conn, snapshot()).unwrap();

        let neetcode = repository::get_roadmap(&conn, "neetcode").unwrap().unwrap();
        assert_eq!(neetcode.problem_ids, vec![1]);
        assert_eq!(neetcode.category, "curated");

        let striver = repository::get_roadmap(&conn, "striver").unwrap().unwrap();
        assert!(striver.problem_ids.is_empty());
        assert_eq!(striver.total_problems, 0);
    }

    #[test]
    fn distribution_sum_equals_total_for_every_curated_roadmap() {
        let mut conn = store();
        run(&mut conn, snapshot()).unwrap();

        for roadmap in repository::curated_roadmaps(&conn).unwrap() {
            let sum: i64 = roadmap.difficulty_distribution.values().sum();
            assert_eq!(sum, roadmap.total_problems, "roadmap {}", roadmap.name);
            assert_eq!(roadmap.total_problems, roadmap.problem_ids.len() as i64);
        }
    }

    #[test]
    fn metadata_reflects_store_totals() {
        let mut conn = store();
        run(&mut conn, snapshot()).unwrap();

        assert_eq!(
            repository::get_metadata(&conn, META_TOTAL_PROBLEMS)
                .unwrap()
                .as_deref(),
            Some("2")
        );
        assert_eq!(
            repository::get_metadata(&conn, META_TOTAL_SOLUTIONS)
                .unwrap()
                .as_deref(),
            Some("3")
        );
        let last_sync = repository::get_metadata(&conn, META_LAST_SYNC).unwrap().unwrap();
        assert!(!last_sync.is_empty());
    }

    #[test]
    fn failure_rolls_back_the_whole_run() {
        let mut conn = store();
        // Sabotage the schema so solution writes fail mid-import.
        conn.execute_batch("DROP TABLE solutions").unwrap();

        assert!(run(&mut conn, snapshot()).is_err());

        let problems: i64 = conn
            .query_row("SELECT count(*) FROM problems", [], |r| r.get(0))
            .unwrap();
        assert_eq!(problems, 0);
    }
}
