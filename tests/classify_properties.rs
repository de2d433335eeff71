// tests/classify_properties.rs
// Properties and hand-picked scenarios for the keyword classifier.

use campus_feed::classify::{
    all_departments, all_interests, classify, classify_category, classify_departments,
    classify_interests, Category,
};

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "Join our coding workshop on AI and software",
    "INTERNSHIP opportunities for marketing majors",
    "Final exam schedule for all Engineering classes",
    "Student organization fair: join a club!",
    "Campus blood drive this Friday",
    "Philosophy and history lecture series on legal rights",
    "¡Fiesta! 音楽 festival at the quad",
];

#[test]
fn category_is_always_one_of_the_closed_set() {
    for s in SAMPLES {
        let c = classify_category(s);
        assert!(Category::ALL.contains(&c), "{s:?} -> {c:?}");
    }
}

#[test]
fn departments_are_never_empty() {
    for s in SAMPLES {
        assert!(!classify_departments(s).is_empty(), "{s:?}");
    }
}

#[test]
fn classification_is_deterministic() {
    for s in SAMPLES {
        assert_eq!(classify(s), classify(s));
    }
}

#[test]
fn classification_ignores_case() {
    for s in SAMPLES {
        assert_eq!(classify(&s.to_uppercase()), classify(&s.to_lowercase()), "{s:?}");
    }
    assert_eq!(classify_category("INTERNSHIP"), Category::CareerServices);
    assert_eq!(classify_category("internship"), Category::CareerServices);
}

#[test]
fn classify_bundles_the_three_passes() {
    let text = "Finance seminar for business students";
    let c = classify(text);
    assert_eq!(c.category, classify_category(text));
    assert_eq!(c.relevant_interests, classify_interests(text));
    assert_eq!(c.relevant_majors, classify_departments(text));
}

#[test]
fn coding_workshop_scenario() {
    let text = "Join our coding workshop on AI and software";
    assert_eq!(classify_category(text), Category::GeneralAnnouncements);
    // "coding"/"software" → technology; "workshop" → social-events
    assert_eq!(
        classify_interests(text),
        vec!["technology".to_string(), "social-events".to_string()]
    );
    assert_eq!(classify_departments(text), vec!["ccs".to_string()]);
}

#[test]
fn empty_text_gets_every_fallback() {
    assert_eq!(classify_category(""), Category::GeneralAnnouncements);
    assert!(classify_interests("").is_empty());
    assert_eq!(classify_departments(""), all_departments());
    assert_eq!(all_departments().len(), 8);
}

#[test]
fn uppercase_ai_and_it_do_not_match_on_their_own() {
    // Neither "ai" nor "it" is a keyword; "IT crowd" must not pull in ccs.
    assert!(classify_interests("AI").is_empty());
    assert_eq!(classify_departments("IT crowd"), all_departments());
}

#[test]
fn interests_can_match_many_tags() {
    let got = classify_interests("Music festival and sports tournament with research booths");
    assert_eq!(
        got,
        vec![
            "arts".to_string(),
            "science".to_string(),
            "sports".to_string(),
            "social-events".to_string()
        ]
    );
}

#[test]
fn departments_follow_table_order() {
    let got = classify_departments("Economics and law policy forum");
    assert_eq!(
        got,
        vec!["rvrcob".to_string(), "soe".to_string(), "tdsol".to_string()]
    );
}

#[test]
fn interests_are_drawn_from_the_closed_tag_set_in_table_order() {
    let tags = all_interests();
    assert_eq!(
        tags,
        ["technology", "business", "arts", "science", "sports", "social-events"]
    );
    for text in SAMPLES {
        let got = classify_interests(text);
        let positions: Vec<usize> = got
            .iter()
            .map(|t| tags.iter().position(|k| k == t).expect("known interest tag"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}: {got:?}");
    }
}
