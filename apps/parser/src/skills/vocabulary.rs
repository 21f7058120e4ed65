//! Skill vocabulary: the per-category term lists the extraction
//! strategies match against. Loaded from per-category JSON files when a
//! vocabulary directory is configured, otherwise from the built-in
//! defaults.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    ProgrammingLanguages,
    Frameworks,
    Databases,
    CloudPlatforms,
    Tools,
    SoftSkills,
    Languages,
    Certifications,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 8] = [
        Self::ProgrammingLanguages,
        Self::Frameworks,
        Self::Databases,
        Self::CloudPlatforms,
        Self::Tools,
        Self::SoftSkills,
        Self::Languages,
        Self::Certifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProgrammingLanguages => "programming_languages",
            Self::Frameworks => "frameworks",
            Self::Databases => "databases",
            Self::CloudPlatforms => "cloud_platforms",
            Self::Tools => "tools",
            Self::SoftSkills => "soft_skills",
            Self::Languages => "languages",
            Self::Certifications => "certifications",
        }
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorized skill term lists. Terms keep their canonical casing;
/// all matching against them is case-insensitive.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    categories: BTreeMap<SkillCategory, Vec<String>>,
}

impl SkillVocabulary {
    /// Loads the vocabulary from `dir` when given, falling back to the
    /// built-in defaults if the directory is missing or unreadable.
    pub fn load(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::defaults();
        };
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "skill vocabulary directory not found, using defaults");
            return Self::defaults();
        }
        match Self::load_dir(dir) {
            Ok(vocab) => vocab,
            Err(e) => {
                warn!("failed to load skill vocabulary: {e:#}, using defaults");
                Self::defaults()
            }
        }
    }

    /// Reads one `{category}.json` file (a JSON array of strings) per
    /// category. A missing file leaves that category at its default.
    fn load_dir(dir: &Path) -> Result<Self> {
        let mut vocab = Self::defaults();
        for category in SkillCategory::ALL {
            let path = dir.join(format!("{}.json", category.as_str()));
            if !path.is_file() {
                continue;
            }
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let terms: Vec<String> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            info!(%category, count = terms.len(), "loaded skill vocabulary file");
            vocab.categories.insert(category, terms);
        }
        Ok(vocab)
    }

    /// Built-in vocabulary. The natural-language and certification
    /// categories start empty and are meant to be supplied via files.
    pub fn defaults() -> Self {
        let mut categories = BTreeMap::new();
        for category in SkillCategory::ALL {
            categories.insert(category, Vec::new());
        }

        let fill = |cat: SkillCategory, terms: &[&str]| -> (SkillCategory, Vec<String>) {
            (cat, terms.iter().map(|t| t.to_string()).collect())
        };

        for (cat, terms) in [
            fill(
                SkillCategory::ProgrammingLanguages,
                &[
                    "Python", "JavaScript", "Java", "C++", "C#", "PHP", "Ruby", "Go", "Rust",
                    "Swift", "Kotlin", "TypeScript", "Scala", "R", "MATLAB", "Perl", "Shell",
                    "Bash", "PowerShell", "SQL", "HTML", "CSS", "Dart", "Elixir", "Clojure",
                ],
            ),
            fill(
                SkillCategory::Frameworks,
                &[
                    "React", "Angular", "Vue.js", "Django", "Flask", "Spring", "Express.js",
                    "Laravel", "Ruby on Rails", "ASP.NET", "FastAPI", "Node.js", "jQuery",
                    "Bootstrap", "Tailwind CSS", "TensorFlow", "PyTorch", "Scikit-learn",
                    "Pandas", "NumPy", "Matplotlib", "Seaborn", "Keras", "Hadoop", "Spark",
                ],
            ),
            fill(
                SkillCategory::Databases,
                &[
                    "MySQL", "PostgreSQL", "MongoDB", "Redis", "SQLite", "Oracle",
                    "SQL Server", "Cassandra", "DynamoDB", "Elasticsearch", "Neo4j",
                    "InfluxDB", "CouchDB", "MariaDB", "Firebase", "Supabase",
                ],
            ),
            fill(
                SkillCategory::CloudPlatforms,
                &[
                    "AWS", "Azure", "Google Cloud", "Heroku", "DigitalOcean", "Vercel",
                    "Netlify", "Firebase", "Docker", "Kubernetes", "Terraform", "Ansible",
                    "Jenkins", "GitHub Actions", "GitLab CI", "CircleCI",
                ],
            ),
            fill(
                SkillCategory::Tools,
                &[
                    "Git", "GitHub", "GitLab", "Bitbucket", "Jira", "Confluence", "Slack",
                    "Trello", "Asana", "Notion", "Figma", "Adobe Creative Suite", "VS Code",
                    "IntelliJ IDEA", "Eclipse", "Postman", "Insomnia", "Tableau", "Power BI",
                ],
            ),
            fill(
                SkillCategory::SoftSkills,
                &[
                    "Leadership", "Communication", "Teamwork", "Problem Solving",
                    "Critical Thinking", "Time Management", "Project Management", "Agile",
                    "Scrum", "Kanban", "Customer Service", "Sales", "Marketing", "Research",
                    "Analysis", "Creativity", "Adaptability", "Collaboration", "Presentation",
                    "Negotiation",
                ],
            ),
        ] {
            categories.insert(cat, terms);
        }

        Self { categories }
    }

    pub fn terms(&self, category: SkillCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a term case-insensitively, returning its category and
    /// canonical casing.
    pub fn lookup(&self, candidate: &str) -> Option<(SkillCategory, &str)> {
        let lowered = candidate.to_lowercase();
        for (category, terms) in &self.categories {
            if let Some(term) = terms.iter().find(|t| t.to_lowercase() == lowered) {
                return Some((*category, term));
            }
        }
        None
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.lookup(candidate).is_some()
    }

    /// Fuzzy categorization for terms surfaced outside vocabulary
    /// matching: a candidate belongs to the first category holding a
    /// term that contains it or is contained by it, case-insensitively.
    pub fn categorize(&self, candidate: &str) -> Option<SkillCategory> {
        let lowered = candidate.to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        for (category, terms) in &self.categories {
            for term in terms {
                let term_lower = term.to_lowercase();
                if term_lower.contains(&lowered) || lowered.contains(&term_lower) {
                    return Some(*category);
                }
            }
        }
        None
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
