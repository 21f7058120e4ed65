//! Skill extraction: runs every active strategy over the cleaned text,
//! then merges their mentions per category, deduplicating by name and
//! keeping the highest-confidence record for each skill.

pub mod strategies;
pub mod vocabulary;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use strategies::{ModelStrategy, NerModel, PatternStrategy, RuleStrategy, SkillStrategy};
use vocabulary::{SkillCategory, SkillVocabulary};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Rule,
    Model,
    Pattern,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Model => "model",
            Self::Pattern => "pattern",
        }
    }
}

/// One detected skill with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMention {
    pub name: String,
    pub category: SkillCategory,
    pub confidence: f64,
    pub method: ExtractionMethod,
    /// Text snippet around the detection site.
    pub context: String,
}

pub type SkillsByCategory = BTreeMap<SkillCategory, Vec<SkillMention>>;

/// Runs the configured strategies and merges their output.
pub struct SkillExtractor {
    vocabulary: SkillVocabulary,
    strategies: Vec<Box<dyn SkillStrategy>>,
}

impl SkillExtractor {
    /// Extractor with the two always-on strategies.
    pub fn new(vocabulary: SkillVocabulary) -> Self {
        Self {
            vocabulary,
            strategies: vec![Box::new(RuleStrategy), Box::new(PatternStrategy)],
        }
    }

    /// Adds the model-backed strategy on top of the defaults.
    pub fn with_model(mut self, model: Box<dyn NerModel>) -> Self {
        self.strategies.push(Box::new(ModelStrategy::new(model)));
        self
    }

    pub fn model_active(&self) -> bool {
        self.strategies
            .iter()
            .any(|s| s.method() == ExtractionMethod::Model)
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn extract(&self, text: &str) -> SkillsByCategory {
        let mut all = Vec::new();
        for strategy in &self.strategies {
            let mentions = strategy.extract(text, &self.vocabulary);
            debug!(
                method = strategy.method().as_str(),
                count = mentions.len(),
                "skill strategy complete"
            );
            all.extend(mentions);
        }
        group_and_dedup(all)
    }
}

/// Groups mentions by category and deduplicates per-category by
/// case-insensitive name, keeping the whole higher-confidence record
/// (its method and context come with it).
fn group_and_dedup(mentions: Vec<SkillMention>) -> SkillsByCategory {
    let mut grouped: SkillsByCategory = BTreeMap::new();

    for mention in mentions {
        let entries = grouped.entry(mention.category).or_default();
        match entries
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(&mention.name))
        {
            Some(existing) => {
                if mention.confidence > existing.confidence {
                    *existing = mention;
                }
            }
            None => entries.push(mention),
        }
    }

    grouped
}

/// Aggregate view over a categorized skill set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillStatistics {
    pub total_skills: usize,
    pub by_category: BTreeMap<SkillCategory, usize>,
    pub average_confidence: f64,
    pub method_counts: BTreeMap<ExtractionMethod, usize>,
    /// Up to ten skill names, highest confidence first.
    pub top_skills: Vec<String>,
}

pub fn skill_statistics(skills: &SkillsByCategory) -> SkillStatistics {
    let mut by_category = BTreeMap::new();
    let mut method_counts = BTreeMap::new();
    let mut all: Vec<&SkillMention> = Vec::new();

    for (category, mentions) in skills {
        if !mentions.is_empty() {
            by_category.insert(*category, mentions.len());
        }
        for mention in mentions {
            *method_counts.entry(mention.method).or_insert(0) += 1;
            all.push(mention);
        }
    }

    let average_confidence = if all.is_empty() {
        0.0
    } else {
        all.iter().map(|m| m.confidence).sum::<f64>() / all.len() as f64
    };

    let mut ranked = all.clone();
    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_skills = ranked.iter().take(10).map(|m| m.name.clone()).collect();

    SkillStatistics {
        total_skills: all.len(),
        by_category,
        average_confidence,
        method_counts,
        top_skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(name: &str, category: SkillCategory, confidence: f64) -> SkillMention {
        SkillMention {
            name: name.to_string(),
            category,
            confidence,
            method: ExtractionMethod::Rule,
            context: String::new(),
        }
    }

    #[test]
    fn test_dedup_keeps_higher_confidence_record() {
        let mut low = mention("Python", SkillCategory::ProgrammingLanguages, 0.6);
        low.context = "low context".into();
        let mut high = mention("python", SkillCategory::ProgrammingLanguages, 0.9);
        high.method = ExtractionMethod::Pattern;
        high.context = "high context".into();

        let grouped = group_and_dedup(vec![low, high]);
        let entries = &grouped[&SkillCategory::ProgrammingLanguages];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].confidence, 0.9);
        assert_eq!(entries[0].method, ExtractionMethod::Pattern);
        assert_eq!(entries[0].context, "high context");
    }

    #[test]
    fn test_same_name_different_category_not_merged() {
        let grouped = group_and_dedup(vec![
            mention("Firebase", SkillCategory::Databases, 0.8),
            mention("Firebase", SkillCategory::CloudPlatforms, 0.8),
        ]);
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn test_extractor_merges_rule_and_pattern() {
        let extractor = SkillExtractor::new(SkillVocabulary::defaults());
        let skills = extractor.extract("Extensive Python experience with Django and AWS");
        let langs = &skills[&SkillCategory::ProgrammingLanguages];
        assert_eq!(
            langs
                .iter()
                .filter(|m| m.name.eq_ignore_ascii_case("python"))
                .count(),
            1
        );
        assert!(skills.contains_key(&SkillCategory::Frameworks));
        assert!(skills.contains_key(&SkillCategory::CloudPlatforms));
        assert!(!extractor.model_active());
    }

    #[test]
    fn test_statistics() {
        let grouped = group_and_dedup(vec![
            mention("Python", SkillCategory::ProgrammingLanguages, 1.0),
            mention("Rust", SkillCategory::ProgrammingLanguages, 0.6),
            mention("React", SkillCategory::Frameworks, 0.8),
        ]);
        let stats = skill_statistics(&grouped);
        assert_eq!(stats.total_skills, 3);
        assert_eq!(stats.by_category[&SkillCategory::ProgrammingLanguages], 2);
        assert!((stats.average_confidence - 0.8).abs() < 1e-9);
        assert_eq!(stats.top_skills[0], "Python");
        assert_eq!(stats.method_counts[&ExtractionMethod::Rule], 3);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = skill_statistics(&BTreeMap::new());
        assert_eq!(stats.total_skills, 0);
        assert_eq!(stats.average_confidence, 0.0);
        assert!(stats.top_skills.is_empty());
    }
}
