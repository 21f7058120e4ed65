//! Skill extraction strategies.
//!
//! Three independent strategies feed the extractor: vocabulary-driven
//! token matching, a fixed table of technology regexes, and an optional
//! injected NER model. Each yields [`SkillMention`]s with its own
//! confidence model; the extractor merges and deduplicates downstream.

use once_cell::sync::Lazy;
use regex::Regex;

use super::vocabulary::{SkillCategory, SkillVocabulary};
use super::{ExtractionMethod, SkillMention};

const BASE_CONFIDENCE: f64 = 0.5;
const VOCABULARY_BONUS: f64 = 0.3;
const CONTEXT_CUE_ADJUSTMENT: f64 = 0.1;
const PATTERN_CONFIDENCE: f64 = 0.8;
const MODEL_SCORE_THRESHOLD: f64 = 0.7;
const MODEL_CHUNK_BYTES: usize = 512;
const CONTEXT_WINDOW_TOKENS: usize = 5;
const SNIPPET_WINDOW_TOKENS: usize = 10;
const SNIPPET_WINDOW_CHARS: usize = 50;

const POSITIVE_CUES: &[&str] = &[
    "experience",
    "proficient",
    "expert",
    "skilled",
    "knowledge",
    "familiar",
];
const NEGATIVE_CUES: &[&str] = &["learning", "beginner", "basic", "introductory"];

/// One extraction strategy. Strategies are stateless over the input:
/// each call sees the full cleaned text and the shared vocabulary.
pub trait SkillStrategy: Send + Sync {
    fn method(&self) -> ExtractionMethod;
    fn extract(&self, text: &str, vocabulary: &SkillVocabulary) -> Vec<SkillMention>;
}

/// Vocabulary-driven token matching. Slides an n-gram window (up to
/// three tokens) over the text and looks each candidate up in the
/// vocabulary; confidence starts at the base plus the vocabulary bonus
/// and shifts by the cue words in a small token window around the match.
pub struct RuleStrategy;

impl SkillStrategy for RuleStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Rule
    }

    fn extract(&self, text: &str, vocabulary: &SkillVocabulary) -> Vec<SkillMention> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut mentions = Vec::new();

        for start in 0..tokens.len() {
            for len in (1..=3).rev() {
                let end = start + len;
                if end > tokens.len() {
                    continue;
                }
                let candidate = trim_token_edges(&tokens[start..end].join(" "));
                if candidate.is_empty() {
                    continue;
                }
                let Some((category, canonical)) = vocabulary.lookup(&candidate) else {
                    continue;
                };

                let confidence = contextual_confidence(&tokens, start, end);
                mentions.push(SkillMention {
                    name: canonical.to_string(),
                    category,
                    confidence,
                    method: ExtractionMethod::Rule,
                    context: token_snippet(&tokens, start, end),
                });
                // longest match wins for this start position
                break;
            }
        }

        mentions
    }
}

/// Strips punctuation from candidate edges while keeping characters that
/// are part of skill names themselves (C++, C#, Node.js, CI/CD, R&D).
fn trim_token_edges(candidate: &str) -> String {
    candidate
        .trim_matches(|c: char| {
            !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '/' | '&'))
        })
        .trim_end_matches(|c: char| matches!(c, '.' | '/'))
        .to_string()
}

fn contextual_confidence(tokens: &[&str], start: usize, end: usize) -> f64 {
    let mut confidence = BASE_CONFIDENCE + VOCABULARY_BONUS;

    let window_start = start.saturating_sub(CONTEXT_WINDOW_TOKENS);
    let window_end = (end + CONTEXT_WINDOW_TOKENS).min(tokens.len());
    let window = tokens[window_start..window_end].join(" ").to_lowercase();

    for cue in POSITIVE_CUES {
        if window.contains(cue) {
            confidence += CONTEXT_CUE_ADJUSTMENT;
        }
    }
    for cue in NEGATIVE_CUES {
        if window.contains(cue) {
            confidence -= CONTEXT_CUE_ADJUSTMENT;
        }
    }

    confidence.clamp(0.0, 1.0)
}

fn token_snippet(tokens: &[&str], start: usize, end: usize) -> String {
    let snippet_start = start.saturating_sub(SNIPPET_WINDOW_TOKENS);
    let snippet_end = (end + SNIPPET_WINDOW_TOKENS).min(tokens.len());
    tokens[snippet_start..snippet_end].join(" ")
}

/// Fixed-table regex matching for well-known technologies. Matches get
/// a flat high confidence; the match's own casing is kept as the name.
pub struct PatternStrategy;

static PATTERN_TABLE: Lazy<Vec<(SkillCategory, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| -> Vec<Regex> {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("skill pattern"))
            .collect()
    };
    vec![
        (
            SkillCategory::ProgrammingLanguages,
            compile(&[
                r"(?i)\b(Python|JavaScript|Java|C\+\+|C#|PHP|Ruby|Go|Rust|Swift|Kotlin|TypeScript|Scala|R|MATLAB|Perl|SQL|HTML|CSS)\b",
                r"(?i)\b(HTML5|CSS3|ES6|ES7|ES8|ES9|ES10|ES11|ES12)\b",
            ]),
        ),
        (
            SkillCategory::Frameworks,
            compile(&[
                r"(?i)\b(React|Angular|Vue\.js|Django|Flask|Spring|Express\.js|Laravel|Ruby on Rails|ASP\.NET|FastAPI|Node\.js)\b",
                r"(?i)\b(TensorFlow|PyTorch|Scikit-learn|Pandas|NumPy|Matplotlib|Seaborn|Keras|Hadoop|Spark)\b",
            ]),
        ),
        (
            SkillCategory::Databases,
            compile(&[
                r"(?i)\b(MySQL|PostgreSQL|MongoDB|Redis|SQLite|Oracle|SQL Server|Cassandra|DynamoDB|Elasticsearch|Neo4j)\b",
            ]),
        ),
        (
            SkillCategory::CloudPlatforms,
            compile(&[
                r"(?i)\b(AWS|Azure|Google Cloud|Heroku|DigitalOcean|Docker|Kubernetes|Terraform|Ansible|Jenkins)\b",
            ]),
        ),
    ]
});

impl SkillStrategy for PatternStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Pattern
    }

    fn extract(&self, text: &str, _vocabulary: &SkillVocabulary) -> Vec<SkillMention> {
        let mut mentions = Vec::new();
        for (category, patterns) in PATTERN_TABLE.iter() {
            for pattern in patterns {
                for found in pattern.find_iter(text) {
                    mentions.push(SkillMention {
                        name: found.as_str().to_string(),
                        category: *category,
                        confidence: PATTERN_CONFIDENCE,
                        method: ExtractionMethod::Pattern,
                        context: char_snippet(text, found.start(), found.end()),
                    });
                }
            }
        }
        mentions
    }
}

/// Slice of text around a byte span, clamped to char boundaries.
fn char_snippet(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(SNIPPET_WINDOW_CHARS);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + SNIPPET_WINDOW_CHARS).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].to_string()
}

/// An entity produced by a NER backend, in chunk-local byte offsets.
#[derive(Debug, Clone)]
pub struct NerEntity {
    pub text: String,
    pub score: f64,
    pub start: usize,
    pub end: usize,
}

/// Swappable NER backend. Implementations wrap whatever model runtime
/// is available; the pipeline only sees entity spans and scores.
pub trait NerModel: Send + Sync {
    fn entities(&self, chunk: &str) -> Vec<NerEntity>;
}

/// Model-backed extraction. Feeds the text to the injected backend in
/// fixed-size chunks; entities below the score threshold or that the
/// vocabulary cannot categorize are discarded.
pub struct ModelStrategy {
    model: Box<dyn NerModel>,
}

impl ModelStrategy {
    pub fn new(model: Box<dyn NerModel>) -> Self {
        Self { model }
    }
}

impl SkillStrategy for ModelStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Model
    }

    fn extract(&self, text: &str, vocabulary: &SkillVocabulary) -> Vec<SkillMention> {
        let mut mentions = Vec::new();
        for chunk in chunk_bytes(text, MODEL_CHUNK_BYTES) {
            for entity in self.model.entities(chunk) {
                if entity.score <= MODEL_SCORE_THRESHOLD {
                    continue;
                }
                let Some(category) = vocabulary.categorize(&entity.text) else {
                    continue;
                };
                // entity offsets are chunk-local
                mentions.push(SkillMention {
                    name: entity.text.clone(),
                    category,
                    confidence: entity.score,
                    method: ExtractionMethod::Model,
                    context: char_snippet(chunk, entity.start, entity.end),
                });
            }
        }
        mentions
    }
}

/// Non-overlapping chunks of roughly `size` bytes, extended past `size`
/// only as far as the next char boundary.
fn chunk_bytes(text: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut split = size.min(rest.len());
        while split < rest.len() && !rest.is_char_boundary(split) {
            split += 1;
        }
        let (head, tail) = rest.split_at(split);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_extract(text: &str) -> Vec<SkillMention> {
        RuleStrategy.extract(text, &SkillVocabulary::defaults())
    }

    #[test]
    fn test_rule_matches_vocabulary_term() {
        let mentions = rule_extract("built services in Python and Rust");
        let names: Vec<&str> = mentions.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"Python"));
        assert!(names.contains(&"Rust"));
    }

    #[test]
    fn test_rule_canonical_casing() {
        let mentions = rule_extract("wrote python scripts");
        assert_eq!(mentions[0].name, "Python");
        assert_eq!(mentions[0].category, SkillCategory::ProgrammingLanguages);
    }

    #[test]
    fn test_rule_multiword_term() {
        let mentions = rule_extract("migrated to Ruby on Rails last year");
        assert!(mentions.iter().any(|m| m.name == "Ruby on Rails"));
    }

    #[test]
    fn test_positive_cue_raises_confidence() {
        let plain = rule_extract("used Python daily at work here");
        let boosted = rule_extract("expert Python experience on the team");
        assert!(boosted[0].confidence > plain[0].confidence);
        assert_eq!(plain[0].confidence, 0.8);
        // two positive cues
        assert_eq!(boosted[0].confidence, 1.0);
    }

    #[test]
    fn test_negative_cue_lowers_confidence() {
        let mentions = rule_extract("currently learning Python basics");
        assert!(mentions[0].confidence < 0.8);
    }

    #[test]
    fn test_edge_punctuation_trimmed_but_symbols_kept() {
        assert_eq!(trim_token_edges("(Python),"), "Python");
        assert_eq!(trim_token_edges("C++"), "C++");
        assert_eq!(trim_token_edges("C#."), "C#");
    }

    #[test]
    fn test_pattern_flat_confidence() {
        let mentions =
            PatternStrategy.extract("deployed on Kubernetes", &SkillVocabulary::defaults());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].confidence, 0.8);
        assert_eq!(mentions[0].category, SkillCategory::CloudPlatforms);
        assert_eq!(mentions[0].method, ExtractionMethod::Pattern);
    }

    #[test]
    fn test_char_snippet_clamps_to_boundaries() {
        let text = "héllo wörld Python résumé";
        let pos = text.find("Python").unwrap();
        let snippet = char_snippet(text, pos, pos + "Python".len());
        assert!(snippet.contains("Python"));
    }

    #[test]
    fn test_chunk_bytes_respects_boundaries() {
        let text = "é".repeat(300);
        let chunks = chunk_bytes(&text, 512);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunk_bytes(&text, 511)[0].len(), 512);
    }

    struct StubModel(Vec<NerEntity>);

    impl NerModel for StubModel {
        fn entities(&self, _chunk: &str) -> Vec<NerEntity> {
            self.0.clone()
        }
    }

    #[test]
    fn test_model_threshold_and_categorization() {
        let model = StubModel(vec![
            NerEntity {
                text: "Django".into(),
                score: 0.95,
                start: 0,
                end: 6,
            },
            NerEntity {
                text: "Django".into(),
                score: 0.5,
                start: 0,
                end: 6,
            },
            NerEntity {
                text: "gibberish".into(),
                score: 0.99,
                start: 0,
                end: 9,
            },
        ]);
        let mentions = ModelStrategy::new(Box::new(model))
            .extract("Django text", &SkillVocabulary::defaults());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].category, SkillCategory::Frameworks);
        assert_eq!(mentions[0].method, ExtractionMethod::Model);
    }

    /// Backends report spans relative to the chunk they were given, so
    /// the context snippet must be cut from that chunk, not the full
    /// text.
    #[test]
    fn test_model_context_for_entity_in_later_chunk() {
        struct SearchingModel;

        impl NerModel for SearchingModel {
            fn entities(&self, chunk: &str) -> Vec<NerEntity> {
                chunk
                    .find("Django")
                    .map(|start| NerEntity {
                        text: "Django".into(),
                        score: 0.95,
                        start,
                        end: start + "Django".len(),
                    })
                    .into_iter()
                    .collect()
            }
        }

        // first chunk is filler only; the entity sits in the second
        let mut text = "x ".repeat(300);
        text.push_str("shipped services built on Django last quarter");

        let mentions = ModelStrategy::new(Box::new(SearchingModel))
            .extract(&text, &SkillVocabulary::defaults());
        assert_eq!(mentions.len(), 1);
        assert!(mentions[0].context.contains("Django"));
    }
}
