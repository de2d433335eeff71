//! # Content Classifier
//!
//! Maps free text to a [`Category`], a set of interest tags and a set of
//! department tags using static keyword tables.
//!
//! - Matching is a case-insensitive substring search (text is lower-cased,
//!   keywords are stored lowercase).
//! - Category is exclusive and resolved by fixed precedence.
//! - Interests may come back empty.
//! - Departments never come back empty: no match means every department.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of announcement categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Academics,
    CampusEvents,
    CareerServices,
    StudentLife,
    #[default]
    GeneralAnnouncements,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Academics,
        Category::CampusEvents,
        Category::CareerServices,
        Category::StudentLife,
        Category::GeneralAnnouncements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Academics => "academics",
            Category::CampusEvents => "campus-events",
            Category::CareerServices => "career-services",
            Category::StudentLife => "student-life",
            Category::GeneralAnnouncements => "general-announcements",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown category: {s}"))
    }
}

/// Tag → lowercase trigger substrings. Order is the output order.
pub type KeywordTable = &'static [(&'static str, &'static [&'static str])];

/// Category triggers in precedence order; first match wins.
const CATEGORY_TRIGGERS: &[(Category, &[&str])] = &[
    (Category::Academics, &["academic", "class", "exam"]),
    (Category::CampusEvents, &["event", "activity", "program"]),
    (Category::CareerServices, &["career", "job", "internship"]),
    (Category::StudentLife, &["student", "organization", "club"]),
];

pub const INTEREST_KEYWORDS: KeywordTable = &[
    (
        "technology",
        &[
            "tech",
            "programming",
            "coding",
            "computer",
            "software",
            "digital",
            "data",
            "cyber",
        ],
    ),
    (
        "business",
        &[
            "business",
            "entrepreneurship",
            "startup",
            "finance",
            "marketing",
            "economics",
            "trade",
        ],
    ),
    (
        "arts",
        &[
            "art",
            "creative",
            "design",
            "culture",
            "music",
            "theater",
            "literature",
            "gallery",
        ],
    ),
    (
        "science",
        &[
            "science",
            "research",
            "laboratory",
            "experiment",
            "biology",
            "chemistry",
            "physics",
        ],
    ),
    (
        "sports",
        &[
            "sports",
            "athletic",
            "tournament",
            "competition",
            "game",
            "fitness",
            "training",
        ],
    ),
    (
        "social-events",
        &[
            "event",
            "party",
            "gathering",
            "celebration",
            "festival",
            "meeting",
            "seminar",
            "workshop",
        ],
    ),
];

pub const DEPARTMENT_KEYWORDS: KeywordTable = &[
    (
        "rvrcob",
        &[
            "business",
            "management",
            "finance",
            "marketing",
            "accounting",
            "economics",
        ],
    ),
    (
        "gcoe",
        &[
            "engineering",
            "civil",
            "mechanical",
            "electrical",
            "chemical",
            "industrial",
        ],
    ),
    (
        "cla",
        &[
            "liberal arts",
            "literature",
            "philosophy",
            "history",
            "languages",
            "communication",
        ],
    ),
    (
        "ccs",
        &[
            "computer",
            "programming",
            "software",
            "technology",
            "coding",
            "data",
        ],
    ),
    (
        "cos",
        &[
            "science",
            "biology",
            "chemistry",
            "physics",
            "mathematics",
            "research",
        ],
    ),
    (
        "bagced",
        &["education", "teaching", "pedagogy", "curriculum", "learning"],
    ),
    ("soe", &["economics", "economic", "policy", "market", "trade"]),
    (
        "tdsol",
        &["law", "legal", "justice", "court", "legislation", "rights"],
    ),
];

/// Output of a full classification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: Category,
    pub relevant_interests: Vec<String>,
    pub relevant_majors: Vec<String>,
}

pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    Classification {
        category: category_of_lower(&lower),
        relevant_interests: matching_tags(&lower, INTEREST_KEYWORDS),
        relevant_majors: departments_of_lower(&lower),
    }
}

pub fn classify_category(text: &str) -> Category {
    category_of_lower(&text.to_lowercase())
}

pub fn classify_interests(text: &str) -> Vec<String> {
    matching_tags(&text.to_lowercase(), INTEREST_KEYWORDS)
}

/// Department tags for `text`; falls back to [`all_departments`] when
/// nothing matches.
pub fn classify_departments(text: &str) -> Vec<String> {
    departments_of_lower(&text.to_lowercase())
}

pub fn all_departments() -> Vec<String> {
    DEPARTMENT_KEYWORDS
        .iter()
        .map(|(tag, _)| tag.to_string())
        .collect()
}

pub fn all_interests() -> Vec<String> {
    INTEREST_KEYWORDS
        .iter()
        .map(|(tag, _)| tag.to_string())
        .collect()
}

fn category_of_lower(lower: &str) -> Category {
    CATEGORY_TRIGGERS
        .iter()
        .find(|(_, triggers)| contains_any(lower, triggers))
        .map(|(cat, _)| *cat)
        .unwrap_or_default()
}

fn departments_of_lower(lower: &str) -> Vec<String> {
    let found = matching_tags(lower, DEPARTMENT_KEYWORDS);
    if found.is_empty() {
        all_departments()
    } else {
        found
    }
}

fn matching_tags(lower: &str, table: KeywordTable) -> Vec<String> {
    table
        .iter()
        .filter(|(_, keywords)| contains_any(lower, keywords))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

#[inline]
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_hold_only_lowercase_keywords() {
        for (tag, kws) in INTEREST_KEYWORDS.iter().chain(DEPARTMENT_KEYWORDS) {
            for kw in kws.iter() {
                assert_eq!(*kw, kw.to_lowercase(), "{tag}: keyword '{kw}'");
            }
        }
        for (_, kws) in CATEGORY_TRIGGERS {
            assert!(kws.iter().all(|k| *k == k.to_lowercase()));
        }
    }

    #[test]
    fn academics_wins_over_events() {
        // "class" (academics) and "program" (events) both present
        let c = classify_category("Orientation program for the incoming class");
        assert_eq!(c, Category::Academics);
    }

    #[test]
    fn events_win_over_career() {
        let c = classify_category("Career fair event this Thursday");
        assert_eq!(c, Category::CampusEvents);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "Career-Services".parse::<Category>().unwrap(),
            Category::CareerServices
        );
        assert!("sports".parse::<Category>().is_err());
    }

    #[test]
    fn unmatched_text_defaults_to_general() {
        assert_eq!(Category::default(), Category::GeneralAnnouncements);
        assert_eq!(classify_category("Lost umbrella at the gate"), Category::default());
    }

    #[test]
    fn category_serializes_kebab_case() {
        let s = serde_json::to_string(&Category::StudentLife).unwrap();
        assert_eq!(s, r#""student-life""#);
    }
}
