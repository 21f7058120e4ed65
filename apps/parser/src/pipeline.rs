//! Pipeline orchestrator: wires extraction, segmentation, the skill,
//! experience, and education extractors, and quality assessment into
//! one pass over a document.
//!
//! Stage split: section segmentation and the experience/education
//! rescans read the raw text (they are line-oriented), skill extraction
//! and quality token checks read the cleaned text.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ParserConfig;
use crate::education::{self, EducationEntry, EducationStatistics};
use crate::errors::ParseError;
use crate::experience::{self, ExperienceEntry, ExperienceStatistics};
use crate::extract::{DocumentFormat, LayoutInfo, NormalizedDocument, TextExtractor};
use crate::quality::{self, ProfileView, QualityAssessment};
use crate::sections::{self, SectionMap};
use crate::skills::strategies::NerModel;
use crate::skills::vocabulary::{SkillCategory, SkillVocabulary};
use crate::skills::{skill_statistics, SkillExtractor, SkillStatistics, SkillsByCategory};

/// Provenance of the parse run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub extraction_method: String,
    pub extraction_confidence: f64,
    pub parsed_at: DateTime<Utc>,
    pub total_characters: usize,
    pub word_count: usize,
    pub layout: LayoutInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStatistics {
    pub total_characters: usize,
    pub word_count: usize,
    pub line_count: usize,
    pub section_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallStatistics {
    pub total_skills: usize,
    pub total_experience_entries: usize,
    pub total_education_entries: usize,
    /// Fraction of the four extraction stages that produced anything.
    pub parsing_completeness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStatistics {
    pub text: TextStatistics,
    pub skills: SkillStatistics,
    pub experience: ExperienceStatistics,
    pub education: EducationStatistics,
    pub overall: OverallStatistics,
}

/// Full parse result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedProfile {
    pub metadata: ExtractionMetadata,
    pub sections: SectionMap,
    pub skills: SkillsByCategory,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub quality: QualityAssessment,
    pub statistics: ProfileStatistics,
}

/// Skills-only parse result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillReport {
    pub skills: SkillsByCategory,
    pub statistics: SkillStatistics,
    pub extracted_at: DateTime<Utc>,
}

/// Component readiness snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserStatus {
    pub supported_formats: Vec<DocumentFormat>,
    pub skill_categories: Vec<SkillCategory>,
    pub model_active: bool,
    pub quality_criteria: Vec<String>,
}

/// The resume parsing pipeline. Construction loads the vocabulary and
/// builds the strategy set once; parse calls share them immutably.
pub struct ResumeParser {
    config: ParserConfig,
    extractor: TextExtractor,
    skills: SkillExtractor,
}

impl ResumeParser {
    pub fn new(config: ParserConfig) -> Self {
        let vocabulary = SkillVocabulary::load(config.skill_vocab_dir.as_deref());
        let skills = SkillExtractor::new(vocabulary);
        let extractor = TextExtractor::new(&config);
        Self {
            config,
            extractor,
            skills,
        }
    }

    /// Injects a NER backend. The model strategy only activates when
    /// the configuration gate is on; otherwise the backend is dropped.
    pub fn with_ner_model(mut self, model: Box<dyn NerModel>) -> Self {
        if self.config.enable_ner_model {
            self.skills = self.skills.with_model(model);
        } else {
            warn!("NER model injected but ENABLE_NER_MODEL is off, ignoring");
        }
        self
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedProfile, ParseError> {
        info!(path = %path.display(), "parsing resume file");
        let document = self.extractor.extract_file(path)?;
        Ok(self.build_profile(document))
    }

    pub fn parse_bytes(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<ParsedProfile, ParseError> {
        let document = self.extractor.extract_bytes(bytes, format)?;
        Ok(self.build_profile(document))
    }

    /// Parses already-extracted text, reported at full confidence.
    pub fn parse_text(&self, text: &str) -> ParsedProfile {
        let document = NormalizedDocument {
            raw_text: text.to_string(),
            cleaned_text: crate::extract::clean_text(text),
            extraction_method: "text-input".to_string(),
            extraction_confidence: 1.0,
            layout: LayoutInfo {
                line_count: Some(text.lines().count()),
                ..Default::default()
            },
        };
        self.build_profile(document)
    }

    /// Runs only the skill extraction stage.
    pub fn extract_skills_only(&self, text: &str) -> SkillReport {
        let cleaned = crate::extract::clean_text(text);
        let skills = self.skills.extract(&cleaned);
        let statistics = skill_statistics(&skills);
        SkillReport {
            skills,
            statistics,
            extracted_at: Utc::now(),
        }
    }

    pub fn status(&self) -> ParserStatus {
        ParserStatus {
            supported_formats: self.extractor.supported_formats().to_vec(),
            skill_categories: SkillCategory::ALL.to_vec(),
            model_active: self.skills.model_active(),
            quality_criteria: [
                "completeness",
                "structure",
                "content_quality",
                "ats_compatibility",
                "professionalism",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    fn build_profile(&self, document: NormalizedDocument) -> ParsedProfile {
        let sections = sections::segment(&document.raw_text);
        info!(count = sections.len(), "section segmentation complete");

        let skills = self.skills.extract(&document.cleaned_text);
        let experience = experience::extract_experience(&document.raw_text);
        let education = education::extract_education(&document.raw_text);

        let quality = quality::assess_quality(&ProfileView {
            cleaned_text: &document.cleaned_text,
            raw_text: &document.raw_text,
            sections: &sections,
            skills: &skills,
            experience: &experience,
            education: &education,
        });

        let statistics = build_statistics(&document, &sections, &skills, &experience, &education);

        let metadata = ExtractionMetadata {
            extraction_method: document.extraction_method,
            extraction_confidence: document.extraction_confidence,
            parsed_at: Utc::now(),
            total_characters: document.cleaned_text.len(),
            word_count: document.cleaned_text.split_whitespace().count(),
            layout: document.layout,
        };

        info!(
            skills = statistics.overall.total_skills,
            experience = experience.len(),
            education = education.len(),
            completeness = statistics.overall.parsing_completeness,
            "resume parsing complete"
        );

        ParsedProfile {
            metadata,
            sections,
            skills,
            experience,
            education,
            quality,
            statistics,
        }
    }
}

fn build_statistics(
    document: &NormalizedDocument,
    sections: &SectionMap,
    skills: &SkillsByCategory,
    experience: &[ExperienceEntry],
    education: &[EducationEntry],
) -> ProfileStatistics {
    let total_skills = skills.values().map(Vec::len).sum();

    ProfileStatistics {
        text: TextStatistics {
            total_characters: document.cleaned_text.len(),
            word_count: document.cleaned_text.split_whitespace().count(),
            line_count: document.raw_text.lines().count(),
            section_count: sections.len(),
        },
        skills: skill_statistics(skills),
        experience: experience::experience_statistics(experience),
        education: education::education_statistics(education),
        overall: OverallStatistics {
            total_skills,
            total_experience_entries: experience.len(),
            total_education_entries: education.len(),
            parsing_completeness: parsing_completeness(sections, skills, experience, education),
        },
    }
}

/// Fraction of the four stages that produced output.
fn parsing_completeness(
    sections: &SectionMap,
    skills: &SkillsByCategory,
    experience: &[ExperienceEntry],
    education: &[EducationEntry],
) -> f64 {
    let mut score = 0.0;
    if !sections.is_empty() {
        score += 1.0;
    }
    if skills.values().any(|mentions| !mentions.is_empty()) {
        score += 1.0;
    }
    if !experience.is_empty() {
        score += 1.0;
    }
    if !education.is_empty() {
        score += 1.0;
    }
    score / 4.0
}
