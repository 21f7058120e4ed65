//! Work-history extraction.
//!
//! Rescans the raw text for experience blocks, then pulls company,
//! title, date range, location, bullet achievements, and mentioned
//! technologies out of each block with regex heuristics. Date parsing
//! is deterministic: explicit range forms are tried from most to least
//! specific, and single-date forms only fill in what a range left open.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sections::scan_blocks;

const BASE_CONFIDENCE: f64 = 0.5;
const DOMAIN_KEYWORD_BONUS: f64 = 0.2;
const YEAR_BONUS: f64 = 0.2;
const COMPANY_SUFFIX_BONUS: f64 = 0.1;
const BULLET_BONUS: f64 = 0.1;

/// One employment entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub location: Option<String>,
    pub description: Option<String>,
    pub achievements: Vec<String>,
    pub technologies_used: Vec<String>,
    pub duration_months: Option<u32>,
    pub confidence: f64,
}

static EXPERIENCE_HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)work\s+experience",
        r"(?i)employment\s+history",
        r"(?i)professional\s+experience",
        r"(?i)career\s+history",
        r"(?i)job\s+history",
        r"(?i)experience",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("experience header pattern"))
    .collect()
});

static EXPERIENCE_BOUNDARIES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)education",
        r"(?i)skills",
        r"(?i)projects",
        r"(?i)certifications",
        r"(?i)languages",
        r"(?i)interests",
        r"(?i)achievements",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("experience boundary pattern"))
    .collect()
});

static COMPANY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"([A-Z][a-zA-Z\s&]+)\s+(?:Inc|Corp|LLC|Ltd|Company|Co)\.?",
        r"([A-Z][a-zA-Z\s&]+)\s+(?:Technologies|Systems|Solutions|Group|Partners)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("company pattern"))
    .collect()
});

/// Known job titles, grouped by family. Matching is substring-based and
/// case-insensitive; the containing line is taken as the title.
const JOB_TITLES: &[&[&str]] = &[
    &[
        "Software Engineer",
        "Software Developer",
        "Programmer",
        "Developer",
        "Full Stack Developer",
        "Frontend Developer",
        "Backend Developer",
        "Web Developer",
        "Mobile Developer",
        "iOS Developer",
        "Android Developer",
    ],
    &[
        "Data Scientist",
        "Machine Learning Engineer",
        "ML Engineer",
        "Data Analyst",
        "Data Engineer",
        "Business Intelligence Analyst",
    ],
    &[
        "Manager",
        "Team Lead",
        "Project Manager",
        "Product Manager",
        "Engineering Manager",
        "Technical Lead",
        "Senior Manager",
    ],
    &[
        "UX Designer",
        "UI Designer",
        "Product Designer",
        "Graphic Designer",
        "Web Designer",
        "Interaction Designer",
    ],
];

const MONTH_NAMES: &str = r"(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)";

static DATE_RANGE_MONTHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_NAMES})\.?\s+(\d{{4}})\s*-\s*({MONTH_NAMES})\.?\s+(\d{{4}})"
    ))
    .expect("month range pattern")
});

static DATE_RANGE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{4})\s*-\s*(\d{4}|Present|Current)\b").expect("year range pattern")
});

static DATE_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").expect("slash date pattern"));

static DATE_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})-(\d{1,2})-(\d{2,4})\b").expect("dash date pattern"));

static DATE_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTH_NAMES})\.?\s+(\d{{4}})\b")).expect("month-year pattern")
});

static PRESENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(present|current)\b").expect("present pattern"));

static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"([A-Z][a-zA-Z\s]+),\s*([A-Z]{2})\b",
        r"([A-Z][a-zA-Z\s]+),\s*([A-Z][a-zA-Z\s]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("location pattern"))
    .collect()
});

static TECH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(Python|JavaScript|Java|React|Angular|Django|Flask|AWS|Docker|Kubernetes|MySQL|PostgreSQL|MongoDB)\b",
        r"(?i)\b(TensorFlow|PyTorch|Scikit-learn|Pandas|NumPy|Git|Jenkins|Ansible|Terraform)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("technology pattern"))
    .collect()
});

static COMPANY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Inc|Corp|LLC|Ltd|Company|Technologies|Systems)\b")
        .expect("company suffix pattern")
});

static DOMAIN_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(experience|work|employment|career)\b").expect("domain keyword pattern")
});

static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}").expect("year pattern"));

const BULLET_GLYPHS: &[char] = &['•', '-', '*', '→', '▶'];
const BULLET_PREFIXES: &[&str] = &["o ", "○ ", "▪ "];

/// Extracts work experience entries from resume text, most recent
/// first. A block yielding neither a company nor a title is dropped.
pub fn extract_experience(text: &str) -> Vec<ExperienceEntry> {
    let blocks = scan_blocks(text, &EXPERIENCE_HEADERS, &EXPERIENCE_BOUNDARIES);

    let mut entries: Vec<ExperienceEntry> =
        blocks.iter().filter_map(|b| parse_block(b)).collect();

    entries.sort_by(|a, b| match (a.start_date, b.start_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    info!(count = entries.len(), "work experience extraction complete");
    entries
}

fn parse_block(block: &str) -> Option<ExperienceEntry> {
    if block.trim().is_empty() {
        return None;
    }

    let company_name = extract_company(block);
    let job_title = extract_title(block);
    if company_name.is_none() && job_title.is_none() {
        return None;
    }

    let (start_date, end_date, is_current) = extract_dates(block);
    let (description, achievements) = split_description(block);

    Some(ExperienceEntry {
        duration_months: duration_months(start_date, end_date),
        confidence: block_confidence(block),
        location: extract_location(block),
        technologies_used: extract_technologies(block),
        company_name,
        job_title,
        start_date,
        end_date,
        is_current,
        description,
        achievements,
    })
}

// Company and location patterns run per line; their character classes
// admit whitespace, and a whole-block search would greedily swallow the
// preceding lines.
fn extract_company(block: &str) -> Option<String> {
    block.lines().find_map(|line| {
        COMPANY_PATTERNS
            .iter()
            .find_map(|p| p.captures(line))
            .map(|c| c[1].trim().to_string())
    })
}

fn extract_title(block: &str) -> Option<String> {
    let known = |line: &str| {
        let lowered = line.to_lowercase();
        JOB_TITLES
            .iter()
            .flat_map(|family| family.iter())
            .any(|title| lowered.contains(&title.to_lowercase()))
    };
    block
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && known(line))
        .map(str::to_string)
}

/// Date extraction, most specific form first. An open-ended range
/// ("2019 - Present") pins the end date to today.
fn extract_dates(block: &str) -> (Option<NaiveDate>, Option<NaiveDate>, bool) {
    if let Some(caps) = DATE_RANGE_MONTHS.captures(block) {
        let start = month_year_date(&caps[1], &caps[2]);
        let end = month_year_date(&caps[3], &caps[4]);
        return (start, end, false);
    }

    if let Some(caps) = DATE_RANGE_YEARS.captures(block) {
        let start = year_date(&caps[1]);
        let tail = &caps[2];
        if PRESENT.is_match(tail) {
            return (start, Some(today()), true);
        }
        return (start, year_date(tail), false);
    }

    for pattern in [&DATE_SLASH, &DATE_DASH] {
        let mut dates = pattern
            .captures_iter(block)
            .filter_map(|caps| numeric_date(&caps[1], &caps[2], &caps[3]));
        if let Some(start) = dates.next() {
            let end = dates.next();
            let is_current = end.is_none() && PRESENT.is_match(block);
            let end = if is_current { Some(today()) } else { end };
            return (Some(start), end, is_current);
        }
    }

    let mut month_dates = DATE_MONTH_YEAR
        .captures_iter(block)
        .filter_map(|caps| month_year_date(&caps[1], &caps[2]));
    if let Some(start) = month_dates.next() {
        let end = month_dates.next();
        let is_current = end.is_none() && PRESENT.is_match(block);
        let end = if is_current { Some(today()) } else { end };
        return (Some(start), end, is_current);
    }

    (None, None, false)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn year_date(year: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)
}

fn month_year_date(month: &str, year: &str) -> Option<NaiveDate> {
    let month = match month.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}

fn numeric_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += if year < 50 { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn extract_location(block: &str) -> Option<String> {
    block.lines().find_map(|line| {
        LOCATION_PATTERNS
            .iter()
            .find_map(|p| p.find(line))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Splits block lines into bullet achievements and free description
/// text. Header-looking lines contribute to neither.
fn split_description(block: &str) -> (Option<String>, Vec<String>) {
    let mut achievements = Vec::new();
    let mut description_lines = Vec::new();

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() || is_header_like(line) {
            continue;
        }
        if let Some(stripped) = strip_bullet(line) {
            if !stripped.is_empty() {
                achievements.push(stripped.to_string());
            }
        } else {
            description_lines.push(line);
        }
    }

    let description = if description_lines.is_empty() {
        None
    } else {
        Some(description_lines.join(" "))
    };
    (description, achievements)
}

fn strip_bullet(line: &str) -> Option<&str> {
    for prefix in BULLET_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }
    let mut chars = line.chars();
    let first = chars.next()?;
    if BULLET_GLYPHS.contains(&first) {
        return Some(chars.as_str().trim());
    }
    None
}

/// All-caps or Title Case single lines read as headers.
fn is_header_like(line: &str) -> bool {
    static ALL_CAPS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s]+$").expect("caps pattern"));
    static TITLE_CASE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*$").expect("title pattern"));
    ALL_CAPS.is_match(line) || TITLE_CASE.is_match(line)
}

/// Technology mentions in first-appearance order, deduplicated
/// case-insensitively.
fn extract_technologies(block: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut techs = Vec::new();
    for pattern in TECH_PATTERNS.iter() {
        for found in pattern.find_iter(block) {
            let tech = found.as_str();
            if seen.insert(tech.to_lowercase()) {
                techs.push(tech.to_string());
            }
        }
    }
    techs
}

/// Whole months between two dates; a not-yet-reached day of month
/// subtracts one. An open start yields `None`, an open end counts to
/// today.
pub fn duration_months(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<u32> {
    let start = start?;
    let end = end.unwrap_or_else(today);

    let mut months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    if end.day() < start.day() {
        months -= 1;
    }
    Some(months.max(0) as u32)
}

fn block_confidence(block: &str) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if DOMAIN_KEYWORD.is_match(block) {
        confidence += DOMAIN_KEYWORD_BONUS;
    }
    if FOUR_DIGIT_YEAR.is_match(block) {
        confidence += YEAR_BONUS;
    }
    if COMPANY_SUFFIX.is_match(block) {
        confidence += COMPANY_SUFFIX_BONUS;
    }
    if block.contains(['•', '-', '*']) {
        confidence += BULLET_BONUS;
    }
    confidence.min(1.0)
}

/// Aggregate view over extracted entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceStatistics {
    pub total_experience: usize,
    pub total_duration_months: u32,
    pub average_duration_months: f64,
    pub current_positions: usize,
    pub companies: Vec<String>,
    pub job_titles: Vec<String>,
    pub locations: Vec<String>,
    pub technologies: Vec<String>,
}

pub fn experience_statistics(entries: &[ExperienceEntry]) -> ExperienceStatistics {
    if entries.is_empty() {
        return ExperienceStatistics::default();
    }

    let mut companies = BTreeSet::new();
    let mut job_titles = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut technologies = BTreeSet::new();
    let mut total_duration_months = 0u32;
    let mut current_positions = 0usize;

    for entry in entries {
        if let Some(months) = entry.duration_months {
            total_duration_months += months;
        }
        if entry.is_current {
            current_positions += 1;
        }
        if let Some(company) = &entry.company_name {
            companies.insert(company.clone());
        }
        if let Some(title) = &entry.job_title {
            job_titles.insert(title.clone());
        }
        if let Some(location) = &entry.location {
            locations.insert(location.clone());
        }
        for tech in &entry.technologies_used {
            technologies.insert(tech.clone());
        }
    }

    ExperienceStatistics {
        total_experience: entries.len(),
        total_duration_months,
        average_duration_months: total_duration_months as f64 / entries.len() as f64,
        current_positions,
        companies: companies.into_iter().collect(),
        job_titles: job_titles.into_iter().collect(),
        locations: locations.into_iter().collect(),
        technologies: technologies.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "\
WORK EXPERIENCE
Senior Software Engineer
Acme Corp
San Francisco, CA
January 2020 - March 2022
• Built data pipelines in Python
• Deployed services on Kubernetes
Responsible for platform reliability.";

    #[test]
    fn test_parse_full_block() {
        let entries = extract_experience(BLOCK);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.company_name.as_deref(), Some("Acme"));
        assert_eq!(
            entry.job_title.as_deref(),
            Some("Senior Software Engineer")
        );
        assert_eq!(
            entry.start_date,
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert_eq!(entry.end_date, NaiveDate::from_ymd_opt(2022, 3, 1));
        assert!(!entry.is_current);
        assert_eq!(entry.location.as_deref(), Some("San Francisco, CA"));
        assert_eq!(entry.achievements.len(), 2);
        assert!(entry
            .technologies_used
            .iter()
            .any(|t| t.eq_ignore_ascii_case("python")));
        assert_eq!(entry.duration_months, Some(26));
    }

    #[test]
    fn test_present_range_is_current() {
        let entries =
            extract_experience("EXPERIENCE\nDeveloper at Globex Inc\n2019 - Present");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert!(entry.is_current);
        assert_eq!(entry.start_date, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(entry.end_date, Some(Utc::now().date_naive()));
    }

    #[test]
    fn test_block_without_company_or_title_dropped() {
        let entries = extract_experience("EXPERIENCE\nassorted text with no employer");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_sorted_most_recent_first() {
        let text = "\
EXPERIENCE
Developer
Oldest Corp
2015 - 2017
Work Experience
Developer
Newer Corp
2019 - 2021";
        let entries = extract_experience(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].company_name.as_deref(), Some("Newer"));
        assert_eq!(entries[1].company_name.as_deref(), Some("Oldest"));
    }

    #[test]
    fn test_numeric_date_pair() {
        let entries = extract_experience("EXPERIENCE\nDeveloper\n01/15/2020 - 03/20/2022");
        let entry = &entries[0];
        assert_eq!(entry.start_date, NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(entry.end_date, NaiveDate::from_ymd_opt(2022, 3, 20));
        assert!(!entry.is_current);

        let dashed = extract_experience("EXPERIENCE\nDeveloper\n01-15-98");
        assert_eq!(dashed[0].start_date, NaiveDate::from_ymd_opt(1998, 1, 15));
    }

    #[test]
    fn test_duration_day_adjustment() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 15);
        let end = NaiveDate::from_ymd_opt(2021, 7, 1);
        assert_eq!(duration_months(start, end), Some(17));

        let start = NaiveDate::from_ymd_opt(2020, 1, 1);
        let end = NaiveDate::from_ymd_opt(2021, 7, 1);
        assert_eq!(duration_months(start, end), Some(18));
    }

    #[test]
    fn test_duration_open_start_is_none() {
        assert_eq!(
            duration_months(None, NaiveDate::from_ymd_opt(2021, 1, 1)),
            None
        );
    }

    #[test]
    fn test_confidence_accumulates() {
        // keyword, year, suffix, bullets all present
        let full = block_confidence("Work Experience at Acme Inc 2020\n• shipped");
        assert_eq!(full, 1.0);
        let bare = block_confidence("plain text");
        assert_eq!(bare, BASE_CONFIDENCE);
    }

    #[test]
    fn test_statistics() {
        let entries = extract_experience(
            "EXPERIENCE\nDeveloper\nAcme Corp\n2019 - Present\nUsed Python and Docker",
        );
        let stats = experience_statistics(&entries);
        assert_eq!(stats.total_experience, 1);
        assert_eq!(stats.current_positions, 1);
        assert_eq!(stats.companies, vec!["Acme".to_string()]);
        assert!(stats.technologies.contains(&"Python".to_string()));
        assert!(stats.total_duration_months > 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_experience("").is_empty());
        assert_eq!(experience_statistics(&[]).total_experience, 0);
    }
}
