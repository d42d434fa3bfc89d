//! ATX header rules: `# H1`, `## H2`, ... `###### H6`

use super::LineClassifier;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One pattern per depth. `#{n}` must be followed by whitespace, so a
    /// depth-2 pattern never matches a depth-3 header.
    static ref ATX_PATTERNS: Vec<Regex> = (1..=6)
        .map(|n| {
            Regex::new(&format!(r"^ {{0,3}}#{{{n}}}\s+(?P<text>.+?)(?:\s+#+)?\s*$")).unwrap()
        })
        .collect();
}

/// Matches a header of exactly one depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtxHeaderRule {
    depth: u8,
}

/// The six header rules, depth 1 through 6
pub const ATX_HEADERS: [AtxHeaderRule; 6] = [
    AtxHeaderRule { depth: 1 },
    AtxHeaderRule { depth: 2 },
    AtxHeaderRule { depth: 3 },
    AtxHeaderRule { depth: 4 },
    AtxHeaderRule { depth: 5 },
    AtxHeaderRule { depth: 6 },
];

impl AtxHeaderRule {
    /// Rule for `depth`, `None` outside 1..=6
    pub fn new(depth: u8) -> Option<Self> {
        (1..=6).contains(&depth).then_some(Self { depth })
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    fn pattern(&self) -> &'static Regex {
        &ATX_PATTERNS[usize::from(self.depth - 1)]
    }
}

impl LineClassifier for AtxHeaderRule {
    /// Raw header text, including attribute syntax and link markup
    type Match = String;

    fn matches(&self, line: &str) -> bool {
        self.pattern().is_match(line)
    }

    fn extract(&self, line: &str) -> Vec<String> {
        self.pattern()
            .captures(line)
            .and_then(|caps| caps.name("text"))
            .map(|m| vec![m.as_str().to_string()])
            .unwrap_or_default()
    }
}

/// Depth and raw text of the header on `line`, if any
pub fn classify_header(line: &str) -> Option<(u8, String)> {
    ATX_HEADERS.iter().find_map(|rule| {
        rule.extract(line)
            .into_iter()
            .next()
            .map(|text| (rule.depth(), text))
    })
}
