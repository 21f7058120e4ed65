//! Education-history extraction.
//!
//! Rescans the raw text for education blocks and pulls institution,
//! degree, field of study, years, GPA, and honors out of each block.
//! Degree matching works off a literal taxonomy; the abbreviation
//! variants ("B.S.", "Ph.D.") end in punctuation, so word boundaries are
//! only anchored where the variant itself starts or ends alphanumeric.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sections::scan_blocks;

const BASE_CONFIDENCE: f64 = 0.5;
const DOMAIN_KEYWORD_BONUS: f64 = 0.3;
const YEAR_BONUS: f64 = 0.2;

/// One education entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution_name: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub gpa: Option<f64>,
    pub honors: Vec<String>,
    pub confidence: f64,
}

static EDUCATION_HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)education", r"(?i)academic", r"(?i)qualifications", r"(?i)degrees"]
        .iter()
        .map(|p| Regex::new(p).expect("education header pattern"))
        .collect()
});

static EDUCATION_BOUNDARIES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)experience", r"(?i)skills", r"(?i)projects", r"(?i)work"]
        .iter()
        .map(|p| Regex::new(p).expect("education boundary pattern"))
        .collect()
});

static INSTITUTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"([A-Z][a-zA-Z\s&]+)\s+(?:University|College|Institute|School)",
        r"([A-Z][a-zA-Z\s&]+)\s+(?:State|National)\s+(?:University|College)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("institution pattern"))
    .collect()
});

/// Degree variants in descending level order; the first matching
/// variant within a level is the reported degree.
const DEGREE_LEVELS: &[(&str, &[&str])] = &[
    ("phd", &["Ph.D.", "PhD", "Doctorate", "Doctor of Philosophy"]),
    ("master", &["Master", "M.S.", "M.A.", "M.Eng", "M.Tech", "M.Sc", "M.B.A"]),
    ("bachelor", &["Bachelor", "B.S.", "B.A.", "B.Eng", "B.Tech", "B.Sc"]),
    ("associate", &["Associate", "A.S.", "A.A."]),
    ("diploma", &["Diploma", "Certificate", "Certification"]),
];

const FIELDS_OF_STUDY: &[&str] = &[
    "Computer Science",
    "Computer Engineering",
    "Software Engineering",
    "Information Technology",
    "Data Science",
    "Machine Learning",
    "Business Administration",
    "Economics",
    "Mathematics",
    "Statistics",
];

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("year pattern"));

static GPA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)GPA[:\s]*(\d+\.\d+)").expect("gpa pattern"));

const HONORS: &[&str] = &[
    "Summa Cum Laude",
    "Magna Cum Laude",
    "Cum Laude",
    "Dean's List",
    "Honor Roll",
    "Phi Beta Kappa",
];

static DOMAIN_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(education|university|college|degree)\b").expect("domain keyword pattern")
});

static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}").expect("year presence pattern"));

/// Extracts education entries from resume text, in document order. A
/// block yielding neither an institution nor a degree is dropped.
pub fn extract_education(text: &str) -> Vec<EducationEntry> {
    let blocks = scan_blocks(text, &EDUCATION_HEADERS, &EDUCATION_BOUNDARIES);
    let entries: Vec<EducationEntry> = blocks.iter().filter_map(|b| parse_block(b)).collect();
    info!(count = entries.len(), "education extraction complete");
    entries
}

fn parse_block(block: &str) -> Option<EducationEntry> {
    if block.trim().is_empty() {
        return None;
    }

    let institution_name = extract_institution(block);
    let degree = extract_degree(block).map(str::to_string);
    if institution_name.is_none() && degree.is_none() {
        return None;
    }

    let (start_date, end_date) = extract_years(block);

    Some(EducationEntry {
        field_of_study: extract_field(block).map(str::to_string),
        gpa: extract_gpa(block),
        honors: extract_honors(block),
        confidence: block_confidence(block),
        institution_name,
        degree,
        start_date,
        end_date,
    })
}

fn extract_institution(block: &str) -> Option<String> {
    // per line; the patterns' character classes admit whitespace
    block.lines().find_map(|line| {
        INSTITUTION_PATTERNS
            .iter()
            .find_map(|p| p.captures(line))
            .map(|c| c[1].trim().to_string())
    })
}

/// Builds a case-insensitive literal matcher, anchoring a word boundary
/// only at ends where the literal starts or ends alphanumeric.
fn literal_pattern(literal: &str) -> Regex {
    let mut pattern = String::from("(?i)");
    if literal.starts_with(|c: char| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(literal));
    if literal.ends_with(|c: char| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    Regex::new(&pattern).expect("literal pattern")
}

fn extract_degree(block: &str) -> Option<&'static str> {
    for (_, variants) in DEGREE_LEVELS {
        for variant in *variants {
            if literal_pattern(variant).is_match(block) {
                return Some(variant);
            }
        }
    }
    None
}

fn extract_field(block: &str) -> Option<&'static str> {
    FIELDS_OF_STUDY
        .iter()
        .find(|field| literal_pattern(field).is_match(block))
        .copied()
}

/// One year reads as a start, two as a start and end. Start pins to
/// January 1, end to December 31.
fn extract_years(block: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut years = YEAR
        .captures_iter(block)
        .filter_map(|caps| caps[1].parse::<i32>().ok());

    let start = years.next().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    let end = years.next().and_then(|y| NaiveDate::from_ymd_opt(y, 12, 31));
    (start, end)
}

/// A GPA outside the 0.0 to 4.0 scale is treated as not found.
fn extract_gpa(block: &str) -> Option<f64> {
    let gpa: f64 = GPA.captures(block)?[1].parse().ok()?;
    (0.0..=4.0).contains(&gpa).then_some(gpa)
}

/// Honors in canonical casing, deduplicated, in taxonomy order. The
/// taxonomy lists the Laude variants longest first, so a match already
/// covered by a longer honor ("Cum Laude" inside "Magna Cum Laude") is
/// not reported twice.
fn extract_honors(block: &str) -> Vec<String> {
    let mut honors: Vec<String> = Vec::new();
    for honor in HONORS {
        if !literal_pattern(honor).is_match(block) {
            continue;
        }
        let lowered = honor.to_lowercase();
        if honors.iter().any(|h| h.to_lowercase().contains(&lowered)) {
            continue;
        }
        honors.push(honor.to_string());
    }
    honors
}

fn block_confidence(block: &str) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if DOMAIN_KEYWORD.is_match(block) {
        confidence += DOMAIN_KEYWORD_BONUS;
    }
    if FOUR_DIGIT_YEAR.is_match(block) {
        confidence += YEAR_BONUS;
    }
    confidence.min(1.0)
}

/// Aggregate view over extracted entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationStatistics {
    pub total_education: usize,
    pub institutions: Vec<String>,
    pub degrees: Vec<String>,
    pub fields_of_study: Vec<String>,
    /// Level name of the highest degree found, if any.
    pub highest_degree: Option<String>,
}

pub fn education_statistics(entries: &[EducationEntry]) -> EducationStatistics {
    if entries.is_empty() {
        return EducationStatistics::default();
    }

    let mut institutions = BTreeSet::new();
    let mut degrees = BTreeSet::new();
    let mut fields_of_study = BTreeSet::new();

    for entry in entries {
        if let Some(institution) = &entry.institution_name {
            institutions.insert(institution.clone());
        }
        if let Some(degree) = &entry.degree {
            degrees.insert(degree.clone());
        }
        if let Some(field) = &entry.field_of_study {
            fields_of_study.insert(field.clone());
        }
    }

    let highest_degree = DEGREE_LEVELS
        .iter()
        .find(|(_, variants)| {
            degrees
                .iter()
                .any(|d| variants.iter().any(|v| v.eq_ignore_ascii_case(d)))
        })
        .map(|(level, _)| level.to_string());

    EducationStatistics {
        total_education: entries.len(),
        institutions: institutions.into_iter().collect(),
        degrees: degrees.into_iter().collect(),
        fields_of_study: fields_of_study.into_iter().collect(),
        highest_degree,
    }
}
