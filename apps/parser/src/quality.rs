//! Resume quality assessment.
//!
//! Scores five weighted criteria over the parsed profile and derives a
//! letter grade plus improvement suggestions. Token-level checks run on
//! the cleaned text; line and formatting checks run on the raw text,
//! since cleaning collapses the line structure they look at.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::education::EducationEntry;
use crate::experience::ExperienceEntry;
use crate::sections::{SectionLabel, SectionMap};
use crate::skills::SkillsByCategory;

const WEIGHT_COMPLETENESS: f64 = 0.25;
const WEIGHT_STRUCTURE: f64 = 0.20;
const WEIGHT_CONTENT_QUALITY: f64 = 0.25;
const WEIGHT_ATS_COMPATIBILITY: f64 = 0.15;
const WEIGHT_PROFESSIONALISM: f64 = 0.15;

const REQUIRED_SECTIONS: &[SectionLabel] = &[
    SectionLabel::Contact,
    SectionLabel::Summary,
    SectionLabel::Experience,
    SectionLabel::Education,
    SectionLabel::Skills,
];

const STANDARD_SECTIONS: &[SectionLabel] = &[
    SectionLabel::Contact,
    SectionLabel::Summary,
    SectionLabel::Experience,
    SectionLabel::Education,
    SectionLabel::Skills,
];

const ATS_KEYWORDS: &[&str] = &[
    "experience",
    "skills",
    "education",
    "work",
    "job",
    "position",
    "responsibilities",
    "achievements",
    "leadership",
    "management",
    "project",
    "team",
    "development",
    "analysis",
    "design",
];

const ACTION_VERBS: &[&str] = &[
    "developed",
    "implemented",
    "managed",
    "led",
    "created",
    "designed",
    "built",
    "maintained",
    "improved",
    "increased",
    "decreased",
    "achieved",
    "coordinated",
    "organized",
    "planned",
    "executed",
    "delivered",
    "launched",
    "established",
    "grew",
    "expanded",
    "optimized",
    "streamlined",
    "enhanced",
];

const RELEVANT_FIELDS: &[&str] = &[
    "computer",
    "engineering",
    "science",
    "technology",
    "business",
    "management",
    "administration",
    "mathematics",
    "statistics",
];

// The writing-quality word lists match on word boundaries; a substring
// check would flag "Shell" for containing "hell".
static MISSPELLINGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(teh|recieve|seperate|occured|definately)\b").expect("misspelling pattern")
});
static UNPROFESSIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(awesome|cool|stuff|things|guy|dude)\b").expect("tone pattern")
});
static INAPPROPRIATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(fuck|shit|damn|hell)\b").expect("language pattern")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("phone pattern"));

static QUANTIFIABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d+%",
        r"\$\d+",
        r"(?i)\d+\s+(?:people|employees|users|customers)",
        r"(?i)\d+\s+(?:years|months|weeks)",
        r"(?i)increased\s+by\s+\d+",
        r"(?i)decreased\s+by\s+\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("quantifiable pattern"))
    .collect()
});

/// Borrowed view over the parsed profile pieces the assessment reads.
pub struct ProfileView<'a> {
    pub cleaned_text: &'a str,
    pub raw_text: &'a str,
    pub sections: &'a SectionMap,
    pub skills: &'a SkillsByCategory,
    pub experience: &'a [ExperienceEntry],
    pub education: &'a [EducationEntry],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    pub completeness: f64,
    pub structure: f64,
    pub content_quality: f64,
    pub ats_compatibility: f64,
    pub professionalism: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub overall_score: f64,
    pub scores: ComponentScores,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub grade: String,
}

pub fn assess_quality(view: &ProfileView<'_>) -> QualityAssessment {
    let scores = ComponentScores {
        completeness: round2(assess_completeness(view)),
        structure: round2(assess_structure(view)),
        content_quality: round2(assess_content(view)),
        ats_compatibility: round2(assess_ats(view)),
        professionalism: round2(assess_professionalism(view.cleaned_text)),
    };

    let overall_score = round2(
        scores.completeness * WEIGHT_COMPLETENESS
            + scores.structure * WEIGHT_STRUCTURE
            + scores.content_quality * WEIGHT_CONTENT_QUALITY
            + scores.ats_compatibility * WEIGHT_ATS_COMPATIBILITY
            + scores.professionalism * WEIGHT_PROFESSIONALISM,
    );

    let assessment = QualityAssessment {
        suggestions: suggestions(&scores, view),
        strengths: strengths(view),
        weaknesses: weaknesses(view),
        grade: grade(overall_score).to_string(),
        overall_score,
        scores,
    };
    info!(
        overall_score = assessment.overall_score,
        grade = %assessment.grade,
        "resume quality assessment complete"
    );
    assessment
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn has_skills(skills: &SkillsByCategory) -> bool {
    skills.values().any(|mentions| !mentions.is_empty())
}

fn section_present(sections: &SectionMap, label: SectionLabel) -> bool {
    sections
        .get(label)
        .is_some_and(|content| !content.trim().is_empty())
}

/// Nine equally weighted presence checks.
fn assess_completeness(view: &ProfileView<'_>) -> f64 {
    let mut score = 0.0;

    for label in REQUIRED_SECTIONS {
        if section_present(view.sections, *label) {
            score += 1.0;
        }
    }
    if has_skills(view.skills) {
        score += 1.0;
    }
    if !view.experience.is_empty() {
        score += 1.0;
    }
    if !view.education.is_empty() {
        score += 1.0;
    }
    if view
        .sections
        .get(SectionLabel::Contact)
        .is_some_and(has_contact_info)
    {
        score += 1.0;
    }

    score / 9.0
}

fn has_contact_info(contact: &str) -> bool {
    EMAIL.is_match(contact) || PHONE.is_match(contact)
}

fn assess_structure(view: &ProfileView<'_>) -> f64 {
    let mut score = 0.0;

    if view.sections.len() >= 3 {
        score += 1.0;
    }
    if has_consistent_formatting(view.raw_text) {
        score += 1.0;
    }
    if has_logical_flow(view.sections) {
        score += 1.0;
    }

    let word_count = view.cleaned_text.split_whitespace().count();
    score += match word_count {
        200..=800 => 1.0,
        100..=1200 => 0.7,
        w if w > 1200 => 0.3,
        _ => 0.0,
    };

    score / 4.0
}

/// Bullets are used, but not on nearly every line.
fn has_consistent_formatting(raw_text: &str) -> bool {
    let lines: Vec<&str> = raw_text.lines().collect();
    let bullets = lines
        .iter()
        .filter(|line| line.trim_start().starts_with(['•', '-', '*']))
        .count();
    bullets > 0 && (bullets as f64) < lines.len() as f64 * 0.8
}

/// Experience before education is the expected order; a missing section
/// does not count against the flow.
fn has_logical_flow(sections: &SectionMap) -> bool {
    match (
        sections.position(SectionLabel::Experience),
        sections.position(SectionLabel::Education),
    ) {
        (Some(exp), Some(edu)) => exp < edu,
        _ => true,
    }
}

fn assess_content(view: &ProfileView<'_>) -> f64 {
    let mut score = 0.0;
    let text_lower = view.cleaned_text.to_lowercase();

    let verbs = ACTION_VERBS
        .iter()
        .filter(|verb| text_lower.contains(*verb))
        .count();
    score += match verbs {
        v if v >= 5 => 1.0,
        v if v >= 3 => 0.7,
        v if v >= 1 => 0.4,
        _ => 0.0,
    };

    let quantifiable: usize = QUANTIFIABLE_PATTERNS
        .iter()
        .map(|p| p.find_iter(view.cleaned_text).count())
        .sum();
    score += match quantifiable {
        q if q >= 3 => 1.0,
        q if q >= 1 => 0.6,
        _ => 0.0,
    };

    if has_recent_experience(view.experience) {
        score += 1.0;
    }
    if has_relevant_education(view.education) {
        score += 1.0;
    }

    score / 4.0
}

fn has_recent_experience(experience: &[ExperienceEntry]) -> bool {
    let cutoff = Utc::now().year() - 2;
    experience
        .iter()
        .filter_map(|e| e.end_date)
        .any(|end| end.year() >= cutoff)
}

fn has_relevant_education(education: &[EducationEntry]) -> bool {
    education
        .iter()
        .filter_map(|e| e.field_of_study.as_deref())
        .any(|field| {
            let field = field.to_lowercase();
            RELEVANT_FIELDS.iter().any(|relevant| field.contains(relevant))
        })
}

fn assess_ats(view: &ProfileView<'_>) -> f64 {
    let mut score = 0.0;
    let text_lower = view.cleaned_text.to_lowercase();

    let keywords = ATS_KEYWORDS
        .iter()
        .filter(|keyword| text_lower.contains(*keyword))
        .count();
    score += match keywords {
        k if k >= 8 => 1.0,
        k if k >= 5 => 0.7,
        k if k >= 3 => 0.4,
        _ => 0.0,
    };

    if has_simple_formatting(view.raw_text) {
        score += 1.0;
    }

    let standard = STANDARD_SECTIONS
        .iter()
        .filter(|label| view.sections.contains(**label))
        .count();
    score += match standard {
        s if s >= 3 => 1.0,
        s if s >= 2 => 0.7,
        _ => 0.0,
    };

    score / 3.0
}

/// Decorative markup density below 5% of the text.
fn has_simple_formatting(raw_text: &str) -> bool {
    let formatting_chars = raw_text
        .chars()
        .filter(|c| matches!(c, '*' | '_' | '`'))
        .count();
    (formatting_chars as f64) < raw_text.len() as f64 * 0.05
}

/// Three equally weighted absence checks over the word lists.
fn assess_professionalism(text: &str) -> f64 {
    let mut score = 0.0;
    if !MISSPELLINGS.is_match(text) {
        score += 1.0;
    }
    if !UNPROFESSIONAL.is_match(text) {
        score += 1.0;
    }
    if !INAPPROPRIATE.is_match(text) {
        score += 1.0;
    }
    score / 3.0
}

fn suggestions(scores: &ComponentScores, view: &ProfileView<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if scores.completeness < 0.7 {
        out.push(
            "Add missing required sections (contact, summary, experience, education, skills)"
                .to_string(),
        );
    }
    if scores.structure < 0.7 {
        out.push(
            "Improve resume structure with clear section headers and consistent formatting"
                .to_string(),
        );
    }
    if scores.content_quality < 0.7 {
        out.push(
            "Add more action verbs and quantifiable achievements to make your experience stand out"
                .to_string(),
        );
    }
    if scores.ats_compatibility < 0.7 {
        out.push(
            "Include more industry-specific keywords to improve ATS compatibility".to_string(),
        );
    }
    if scores.professionalism < 0.7 {
        out.push("Review and improve writing quality and professional tone".to_string());
    }

    if !has_skills(view.skills) {
        out.push("Add a comprehensive skills section with technical and soft skills".to_string());
    }
    if view.experience.is_empty() {
        out.push("Include relevant work experience with specific achievements".to_string());
    }
    if view.education.is_empty() {
        out.push("Add your educational background and relevant certifications".to_string());
    }

    out
}

fn strengths(view: &ProfileView<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if view.sections.len() >= 4 {
        out.push("Well-organized with multiple relevant sections".to_string());
    }
    if view.skills.values().any(|mentions| mentions.len() > 5) {
        out.push("Comprehensive skills section".to_string());
    }
    if view.experience.len() >= 2 {
        out.push("Multiple work experiences showing career progression".to_string());
    }
    if !view.education.is_empty() {
        out.push("Strong educational background".to_string());
    }

    out
}

fn weaknesses(view: &ProfileView<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if view.sections.len() < 3 {
        out.push("Missing important resume sections".to_string());
    }
    if !has_skills(view.skills) {
        out.push("No skills section or insufficient skills listed".to_string());
    }
    if view.experience.is_empty() {
        out.push("No work experience listed".to_string());
    }
    if view.education.is_empty() {
        out.push("No educational background provided".to_string());
    }

    out
}

fn grade(score: f64) -> &'static str {
    if score >= 0.9 {
        "A+"
    } else if score >= 0.85 {
        "A"
    } else if score >= 0.8 {
        "A-"
    } else if score >= 0.75 {
        "B+"
    } else if score >= 0.7 {
        "B"
    } else if score >= 0.65 {
        "B-"
    } else if score >= 0.6 {
        "C+"
    } else if score >= 0.55 {
        "C"
    } else if score >= 0.5 {
        "C-"
    } else {
        "D"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::clean_text;
    use crate::sections::segment;
    use crate::skills::SkillExtractor;
    use crate::skills::vocabulary::SkillVocabulary;
    use std::collections::BTreeMap;

    fn assess(raw_text: &str) -> QualityAssessment {
        let cleaned = clean_text(raw_text);
        let sections = segment(raw_text);
        let skills = SkillExtractor::new(SkillVocabulary::defaults()).extract(&cleaned);
        let experience = crate::experience::extract_experience(raw_text);
        let education = crate::education::extract_education(raw_text);
        assess_quality(&ProfileView {
            cleaned_text: &cleaned,
            raw_text,
            sections: &sections,
            skills: &skills,
            experience: &experience,
            education: &education,
        })
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade(0.90), "A+");
        assert_eq!(grade(0.89), "A");
        assert_eq!(grade(0.80), "A-");
        assert_eq!(grade(0.70), "B");
        assert_eq!(grade(0.55), "C");
        assert_eq!(grade(0.49), "D");
    }

    #[test]
    fn test_empty_profile_scores_low() {
        let assessment = assess("");
        assert!(assessment.overall_score < 0.5);
        assert_eq!(assessment.grade, "D");
        assert!(!assessment.suggestions.is_empty());
        assert!(assessment
            .weaknesses
            .contains(&"No work experience listed".to_string()));
    }

    #[test]
    fn test_rich_resume_outscores_sparse_one() {
        let rich = "\
CONTACT
jane@example.com 555-123-4567
SUMMARY
Engineer who developed, implemented, and led initiatives.
EXPERIENCE
Software Engineer
Acme Corp
2020 - Present
• Increased throughput by 40%
• Managed a team of 5 people
EDUCATION
Bachelor of Science in Computer Science, State University, 2016 - 2020
SKILLS
Python, Rust, Docker, Leadership";
        let rich_score = assess(rich).overall_score;
        let sparse_score = assess("just a line of text").overall_score;
        assert!(rich_score > sparse_score);
        assert!(rich_score > 0.7);
    }

    #[test]
    fn test_word_boundary_keeps_shell_professional() {
        assert_eq!(assess_professionalism("Expert in Shell scripting"), 1.0);
        assert!(assess_professionalism("this part was hell") < 1.0);
        assert!(assess_professionalism("built awesome stuff") < 1.0);
    }

    #[test]
    fn test_contact_info_detection() {
        assert!(has_contact_info("reach me at jane@example.com"));
        assert!(has_contact_info("call 555-123-4567"));
        assert!(!has_contact_info("no details provided"));
    }

    #[test]
    fn test_logical_flow() {
        let ordered = segment("EXPERIENCE\njob x\nEDUCATION\nschool y");
        assert!(has_logical_flow(&ordered));
        let reversed = segment("EDUCATION\nschool y\nEXPERIENCE\njob x");
        assert!(!has_logical_flow(&reversed));
        let missing = segment("EDUCATION\nschool y");
        assert!(has_logical_flow(&missing));
    }

    #[test]
    fn test_empty_skills_map_flagged() {
        let sections = SectionMap::default();
        let skills: SkillsByCategory = BTreeMap::new();
        let view = ProfileView {
            cleaned_text: "",
            raw_text: "",
            sections: &sections,
            skills: &skills,
            experience: &[],
            education: &[],
        };
        assert!(weaknesses(&view)
            .contains(&"No skills section or insufficient skills listed".to_string()));
    }
}
