// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// --- Data Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            _ => Ok(Difficulty::Medium), // Default fallback
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Problem {
    pub problem_id: i64,
    pub title: String,
    pub title_slug: String,
    pub difficulty: Difficulty,
    pub acceptance_rate: Option<f64>,
    pub is_premium: bool,
    pub problem_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    pub id: i64,
    pub problem_id: i64,
    pub language: String,
    pub code: String,
    pub source: String,
    pub contributor: Option<String>,
    pub runtime: Option<String>,
    pub memory: Option<String>,
    pub contributed_at: DateTime<Utc>,
}

/// A contributed solution that has not been persisted yet.
#[derive(Deserialize, Debug, Clone)]
pub struct NewSolution {
    pub problem_id: i64,
    pub language: String,
    pub code: String,
    pub source: String,
    pub contributor: Option<String>,
    pub runtime: Option<String>,
    pub memory: Option<String>,
}

/// A curated roadmap row. `total_problems` and `difficulty_distribution`
/// are snapshotted at import time and never refreshed; topic roadmaps
/// (never stored) recompute their counts on every catalog call instead.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Roadmap {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: String,
    pub total_problems: i64,
    pub problem_ids: Vec<i64>,
    pub difficulty_distribution: BTreeMap<String, i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProgressRecord {
    pub id: i64,
    pub user_id: String,
    pub problem_id: i64,
    pub language: String,
    pub solved_at: DateTime<Utc>,
    pub runtime: Option<String>,
    pub memory: Option<String>,
    pub solution_code: Option<String>,
    pub notes: Option<String>,
    pub github_synced: bool,
    pub github_url: Option<String>,
}

/// Incoming submission from the (external) API layer. Upserted on
/// (user_id, problem_id, language).
#[derive(Deserialize, Debug, Clone)]
pub struct SaveProgress {
    pub user_id: String,
    pub problem_id: i64,
    pub language: String,
    pub solution_code: String,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub github_synced: bool,
    #[serde(default)]
    pub github_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRoadmap {
    pub id: i64,
    pub user_id: String,
    pub roadmap_name: String,
    pub started_at: DateTime<Utc>,
    pub is_active: bool,
    pub last_activity: DateTime<Utc>,
}

// --- View Models ---

#[derive(Serialize, Debug, Clone)]
pub struct RoadmapInfo {
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub total_problems: i64,
    pub description: Option<String>,
    pub difficulty_distribution: Option<BTreeMap<String, i64>>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ProgressReport {
    pub user_id: String,
    pub roadmap_name: String,
    pub total_problems: i64,
    pub completed_problems: i64,
    pub progress_percentage: f64,
    pub by_difficulty: BTreeMap<String, i64>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ActiveRoadmap {
    pub roadmap_name: String,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub progress: ProgressReport,
}

#[derive(Serialize, Debug, Clone)]
pub struct StoreStats {
    pub total_problems: i64,
    pub total_solutions: i64,
    pub total_topics: i64,
    pub total_companies: i64,
    pub last_sync: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub problems_imported: i64,
    pub problems_skipped: i64,
    pub solutions: i64,
    pub topics: i64,
    pub companies: i64,
    pub roadmaps: i64,
}

// --- Snapshot Records (used by the importer) ---

#[derive(Deserialize, Debug)]
pub struct JsonDatabase {
    pub problems: Vec<JsonProblem>,
}

#[derive(Deserialize, Debug)]
pub struct JsonProblem {
    #[serde(alias = "problem_id")]
    pub id: i64,
    pub title: String,
    pub title_slug: String,
    pub difficulty: String,
    #[serde(default)]
    pub acceptance_rate: Option<f64>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default, alias = "problem_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub roadmaps: Option<RoadmapsField>,
    #[serde(default)]
    pub solutions: Option<SolutionsField>,
}

#[derive(Deserialize, Debug)]
pub struct JsonSolution {
    #[serde(default)]
    pub language: Option<String>,
    pub code: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "contributor_github")]
    pub contributor: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
}

/// The snapshot's `solutions` field appears both as a flat list and as a
/// mapping from language name to entries. Both normalize through
/// [`SolutionsField::into_entries`].
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum SolutionsField {
    List(Vec<JsonSolution>),
    ByLanguage(BTreeMap<String, Vec<JsonSolution>>),
}

impl SolutionsField {
    /// Flattens either shape into one list. In the per-language shape an
    /// entry without an explicit language inherits the map key.
    pub fn into_entries(self) -> Vec<JsonSolution> {
        match self {
            SolutionsField::List(entries) => entries,
            SolutionsField::ByLanguage(by_lang) => by_lang
                .into_iter()
                .flat_map(|(lang, entries)| {
                    entries.into_iter().map(move |mut entry| {
                        if entry.language.is_none() {
                            entry.language = Some(lang.clone());
                        }
                        entry
                    })
                })
                .collect(),
        }
    }
}

/// The `roadmaps` field drifted between a list of sheet names and a map
/// keyed by sheet name; membership only cares about the names.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RoadmapsField {
    List(Vec<String>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl RoadmapsField {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            RoadmapsField::List(names) => names.iter().any(|n| n == name),
            RoadmapsField::Map(map) => map.contains_key(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn solutions_field_accepts_flat_list() {
        let field: SolutionsField = serde_json::from_value(json!([
            { "language": "python", "code": "pass" },
            { "language": "java", "code": "{}" }
        ]))
        .unwrap();

        let entries = field.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].language.as_deref(), Some("python"));
    }

    #[test]
    fn solutions_field_accepts_language_map() {
        let field: SolutionsField = serde_json::from_value(json!({
            "python": [ { "code": "pass" }, { "code": "return 0" } ],
            "rust": [ { "language": "rust", "code": "fn main() {}" } ]
        }))
        .unwrap();

        let entries = field.into_entries();
        assert_eq!(entries.len(), 3);
        // Inherited from the map key when absent on the entry.
        assert!(entries
            .iter()
            .all(|e| matches!(e.language.as_deref(), Some("python") | Some("rust"))));
    }

    #[test]
    fn roadmaps_field_accepts_both_shapes() {
        let list: RoadmapsField =
            serde_json::from_value(json!(["grind_250", "blind_75"])).unwrap();
        assert!(list.contains("blind_75"));
        assert!(!list.contains("leetcode_280"));

        let map: RoadmapsField =
            serde_json::from_value(json!({ "grind_250": { "order": 17 } })).unwrap();
        assert!(map.contains("grind_250"));
    }

    #[test]
    fn difficulty_round_trip_and_fallback() {
        assert_eq!(Difficulty::from_str("Hard").unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::from_str("???").unwrap(), Difficulty::Medium);
        assert_eq!(Difficulty::Easy.as_str(), "Easy");
    }

    #[test]
    fn json_problem_defaults_optional_fields() {
        let p: JsonProblem = serde_json::from_value(json!({
            "id": 1,
            "title": "Two Sum",
            "title_slug": "two-sum",
            "difficulty": "Easy"
        }))
        .unwrap();

        assert!(p.acceptance_rate.is_none());
        assert!(!p.is_premium);
        assert!(p.url.is_none());
        assert!(p.topics.is_empty());
        assert!(p.solutions.is_none());
    }
}
