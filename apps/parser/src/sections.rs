//! Line-oriented section segmentation.
//!
//! One parameterized state machine drives two frontends: [`segment`]
//! splits a whole résumé into the fixed nine-label section vocabulary,
//! and [`scan_blocks`] is the narrow two-state rescan the experience and
//! education extractors use to isolate their own target blocks. Both
//! walk the text line by line with a cursor for the current label; a
//! line matching a header pattern moves the cursor, every other
//! non-blank line accumulates under it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    /// Implicit section absorbing un-attributed leading text.
    Header,
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
    Interests,
}

impl SectionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Contact => "contact",
            Self::Summary => "summary",
            Self::Experience => "experience",
            Self::Education => "education",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Certifications => "certifications",
            Self::Languages => "languages",
            Self::Interests => "interests",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header-detection patterns, tested in priority order: the first
/// matching pattern wins, so a line matching several is deterministic.
static SECTION_PATTERNS: Lazy<Vec<(SectionLabel, Regex)>> = Lazy::new(|| {
    [
        (SectionLabel::Contact, r"(?i)(contact|personal|info|information)"),
        (SectionLabel::Summary, r"(?i)(summary|profile|objective|about)"),
        (
            SectionLabel::Experience,
            r"(?i)(experience|work\s+history|employment|career)",
        ),
        (SectionLabel::Education, r"(?i)(education|academic|qualifications)"),
        (
            SectionLabel::Skills,
            r"(?i)(skills|competencies|technologies|tools)",
        ),
        (SectionLabel::Projects, r"(?i)(projects|portfolio|achievements)"),
        (
            SectionLabel::Certifications,
            r"(?i)(certifications|certificates|licenses)",
        ),
        (SectionLabel::Languages, r"(?i)(languages|language\s+skills)"),
        (SectionLabel::Interests, r"(?i)(interests|hobbies|activities)"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).expect("section pattern")))
    .collect()
});

/// One labeled, contiguous text region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub label: SectionLabel,
    pub content: String,
}

/// Ordered mapping from section label to the text block attributed to
/// it. Every non-blank input line lands in exactly one section; a
/// repeated header for an already-seen label appends to that label's
/// existing block, so boundaries never overlap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    pub fn get(&self, label: SectionLabel) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.content.as_str())
    }

    pub fn contains(&self, label: SectionLabel) -> bool {
        self.sections.iter().any(|s| s.label == label)
    }

    /// Document-order position of a label's first occurrence.
    pub fn position(&self, label: SectionLabel) -> Option<usize> {
        self.sections.iter().position(|s| s.label == label)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn append_block(&mut self, label: SectionLabel, block: &str) {
        match self.sections.iter_mut().find(|s| s.label == label) {
            Some(section) => {
                section.content.push('\n');
                section.content.push_str(block);
            }
            None => self.sections.push(Section {
                label,
                content: block.to_string(),
            }),
        }
    }
}

/// Core line scanner. `classify` maps a line to `Some(label)` when it is
/// a header (moving the cursor) or `None` when it is content. Blank
/// lines are dropped but never close a section. Returns the cursor runs
/// in input order; runs opened by a header start empty unless
/// `keep_header_line` is set.
fn scan_lines<L: Copy>(
    text: &str,
    classify: impl Fn(&str) -> Option<L>,
    initial: L,
    keep_header_line: bool,
) -> Vec<(L, Vec<String>)> {
    let mut runs: Vec<(L, Vec<String>)> = vec![(initial, Vec::new())];

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match classify(line) {
            Some(label) => {
                let mut buffer = Vec::new();
                if keep_header_line {
                    buffer.push(line.to_string());
                }
                runs.push((label, buffer));
            }
            None => {
                // runs always holds at least the initial cursor
                runs.last_mut().expect("cursor run").1.push(line.to_string());
            }
        }
    }

    runs
}

/// Splits text into the fixed nine-label section vocabulary. The header
/// line itself is not part of the section it opens.
pub fn segment(text: &str) -> SectionMap {
    let runs = scan_lines(
        text,
        |line| {
            SECTION_PATTERNS
                .iter()
                .find(|(_, re)| re.is_match(line))
                .map(|(label, _)| *label)
        },
        SectionLabel::Header,
        false,
    );

    let mut map = SectionMap::default();
    for (label, lines) in runs {
        if lines.is_empty() {
            continue;
        }
        map.append_block(label, &lines.join("\n"));
    }
    map
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Inside,
    Outside,
}

/// Narrow two-state rescan: collects the contiguous blocks opened by a
/// `headers` pattern and closed by a `boundaries` pattern. Unlike
/// [`segment`], the matched header line is kept as the first line of
/// its block, since the downstream confidence heuristics key on it.
pub fn scan_blocks(text: &str, headers: &[Regex], boundaries: &[Regex]) -> Vec<String> {
    let runs = scan_lines(
        text,
        |line| {
            if headers.iter().any(|re| re.is_match(line)) {
                Some(ScanState::Inside)
            } else if boundaries.iter().any(|re| re.is_match(line)) {
                Some(ScanState::Outside)
            } else {
                None
            }
        },
        ScanState::Outside,
        true,
    );

    runs.into_iter()
        .filter(|(state, lines)| *state == ScanState::Inside && !lines.is_empty())
        .map(|(_, lines)| lines.join("\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Jane Doe
jane@example.com

SUMMARY
Seasoned engineer.

EXPERIENCE
Acme Corp
Built things.

EDUCATION
State University
";

    #[test]
    fn test_segment_basic_labels() {
        let map = segment(SAMPLE);
        assert!(map.contains(SectionLabel::Summary));
        assert!(map.contains(SectionLabel::Experience));
        assert!(map.contains(SectionLabel::Education));
        assert_eq!(map.get(SectionLabel::Summary), Some("Seasoned engineer."));
    }

    #[test]
    fn test_leading_text_lands_in_header() {
        let map = segment(SAMPLE);
        let header = map.get(SectionLabel::Header).unwrap();
        assert!(header.contains("Jane Doe"));
        assert!(header.contains("jane@example.com"));
    }

    #[test]
    fn test_header_line_not_in_content() {
        let map = segment(SAMPLE);
        assert!(!map.get(SectionLabel::Experience).unwrap().contains("EXPERIENCE"));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        // "career summary" matches both summary and experience patterns;
        // summary is tested first.
        let map = segment("Career Summary\ncontent here x");
        // "Career Summary" contains "summary" (priority 2) and "career"
        // (priority 3); summary wins.
        assert_eq!(map.get(SectionLabel::Summary), Some("content here x"));
    }

    #[test]
    fn test_blank_lines_do_not_close_sections() {
        let map = segment("SKILLS USED\nPython\n\n\nRust");
        assert_eq!(map.get(SectionLabel::Skills), Some("Python\nRust"));
    }

    #[test]
    fn test_repeated_label_appends() {
        let text = "EXPERIENCE\nAcme\nEDUCATION\nState U\nEXPERIENCE\nGlobex";
        let map = segment(text);
        let exp = map.get(SectionLabel::Experience).unwrap();
        assert!(exp.contains("Acme"));
        assert!(exp.contains("Globex"));
        // still one entry per label
        assert_eq!(map.iter().filter(|s| s.label == SectionLabel::Experience).count(), 1);
    }

    #[test]
    fn test_segment_partitions_all_lines() {
        let map = segment(SAMPLE);
        let reconstructed: Vec<&str> = map
            .iter()
            .flat_map(|s| s.content.lines())
            .collect();
        let originals: Vec<&str> = SAMPLE
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            // header lines are dropped by design
            .filter(|l| !matches!(*l, "SUMMARY" | "EXPERIENCE" | "EDUCATION"))
            .collect();
        for line in &originals {
            assert!(reconstructed.contains(line), "missing line: {line}");
        }
        assert_eq!(reconstructed.len(), originals.len());
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_scan_blocks_keeps_header_and_stops_at_boundary() {
        let headers = vec![Regex::new(r"(?i)experience").unwrap()];
        let boundaries = vec![Regex::new(r"(?i)education").unwrap()];
        let blocks = scan_blocks(
            "EXPERIENCE\nAcme Corp\nEDUCATION\nState University",
            &headers,
            &boundaries,
        );
        assert_eq!(blocks, vec!["EXPERIENCE\nAcme Corp"]);
    }

    #[test]
    fn test_scan_blocks_ignores_text_outside_target() {
        let headers = vec![Regex::new(r"(?i)experience").unwrap()];
        let boundaries = vec![Regex::new(r"(?i)education").unwrap()];
        let blocks = scan_blocks("random preamble\nmore text", &headers, &boundaries);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_scan_blocks_multiple_headers_split_blocks() {
        let headers = vec![Regex::new(r"(?i)experience").unwrap()];
        let boundaries = vec![Regex::new(r"(?i)education").unwrap()];
        let blocks = scan_blocks(
            "EXPERIENCE\nAcme\nWork Experience\nGlobex",
            &headers,
            &boundaries,
        );
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Acme"));
        assert!(blocks[1].contains("Globex"));
    }
}
