//! Résumé parsing pipeline: turns raw document bytes (or pre-extracted
//! text) into a structured, confidence-scored profile: contact/section
//! layout, categorized skills, work history, education, and an overall
//! quality assessment with improvement suggestions.
//!
//! The pipeline is a pure, synchronous computation: one document in,
//! one [`ParsedProfile`] out. The only shared state across invocations
//! is the immutable skill vocabulary and the static pattern tables,
//! both built once at startup. Callers wanting concurrency run whole
//! pipeline invocations on a worker pool of their own.

pub mod config;
pub mod education;
pub mod errors;
pub mod experience;
pub mod extract;
pub mod pipeline;
pub mod quality;
pub mod sections;
pub mod skills;

pub use config::ParserConfig;
pub use education::{EducationEntry, EducationStatistics};
pub use errors::ParseError;
pub use experience::{ExperienceEntry, ExperienceStatistics};
pub use extract::{DocumentFormat, LayoutInfo, NormalizedDocument, TextExtractor};
pub use pipeline::{ParsedProfile, ParserStatus, ProfileStatistics, ResumeParser, SkillReport};
pub use quality::QualityAssessment;
pub use sections::{SectionLabel, SectionMap};
pub use skills::{
    strategies::{NerEntity, NerModel},
    vocabulary::{SkillCategory, SkillVocabulary},
    ExtractionMethod, SkillMention, SkillStatistics,
};
