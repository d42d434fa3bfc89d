//! Code and YAML fence rules, and the state machine that tracks them.
//!
//! Content classification is suppressed inside fences. Delimiter lines are
//! themselves reported as inside, both when opening and when closing.

use super::LineClassifier;
use regex::Regex;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(?P<fence>`{3,}|~{3,})(?P<info>.*)$").unwrap());

static YAML_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*---\s*$").unwrap());

static YAML_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:---|\.\.\.)\s*$").unwrap());

/// Matches a ```` ``` ```` or `~~~` delimiter; yields the fence run
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeFenceRule;

impl LineClassifier for CodeFenceRule {
    type Match = String;

    fn matches(&self, line: &str) -> bool {
        CODE_FENCE.is_match(line)
    }

    fn extract(&self, line: &str) -> Vec<String> {
        CODE_FENCE
            .captures(line)
            .and_then(|caps| caps.name("fence"))
            .map(|m| vec![m.as_str().to_string()])
            .unwrap_or_default()
    }
}

impl CodeFenceRule {
    /// True when `line` closes a block opened by `opener`: same character,
    /// at least as long, and no info string.
    pub fn closes(&self, opener: &str, line: &str) -> bool {
        let Some(caps) = CODE_FENCE.captures(line) else {
            return false;
        };
        let (Some(fence), Some(info)) = (caps.name("fence"), caps.name("info")) else {
            return false;
        };
        let fence = fence.as_str();
        fence.chars().next() == opener.chars().next()
            && fence.len() >= opener.len()
            && info.as_str().trim().is_empty()
    }
}

/// Matches YAML block delimiters. The opening rule accepts `---` only; the
/// closing rule accepts `---` or `...`.
#[derive(Debug, Clone, Copy)]
pub struct YamlFenceRule {
    closing: bool,
}

impl YamlFenceRule {
    pub const OPEN: YamlFenceRule = YamlFenceRule { closing: false };
    pub const CLOSE: YamlFenceRule = YamlFenceRule { closing: true };

    fn pattern(&self) -> &'static Regex {
        if self.closing { &YAML_CLOSE } else { &YAML_OPEN }
    }
}

impl LineClassifier for YamlFenceRule {
    type Match = String;

    fn matches(&self, line: &str) -> bool {
        self.pattern().is_match(line)
    }

    fn extract(&self, line: &str) -> Vec<String> {
        if self.matches(line) {
            vec![line.trim().to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Where the tracker currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceState {
    #[default]
    Outside,
    InCode,
    InYaml,
}

/// Tracks code and YAML fences across consecutive lines of one document.
///
/// ```
/// use mddocs_parser::parsers::FenceTracker;
///
/// let mut fences = FenceTracker::new();
/// let inside: Vec<bool> = ["text", "```rust", "# not a header", "```", "# header"]
///     .iter()
///     .map(|line| fences.in_block(line))
///     .collect();
/// assert_eq!(inside, vec![false, true, true, true, false]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    state: FenceState,
    opener: String,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FenceState {
        self.state
    }

    /// Return to the outside state between documents
    pub fn reset(&mut self) {
        self.state = FenceState::Outside;
        self.opener.clear();
    }

    /// Feed the next line; true when the line belongs to a fenced block,
    /// delimiters included.
    pub fn in_block(&mut self, line: &str) -> bool {
        match self.state {
            FenceState::InCode => {
                if CodeFenceRule.closes(&self.opener, line) {
                    self.reset();
                }
                true
            }
            FenceState::InYaml => {
                if YamlFenceRule::CLOSE.matches(line) {
                    self.reset();
                }
                true
            }
            FenceState::Outside => {
                if let Some(fence) = CodeFenceRule.extract(line).into_iter().next() {
                    self.state = FenceState::InCode;
                    self.opener = fence;
                    true
                } else if YamlFenceRule::OPEN.matches(line) {
                    self.state = FenceState::InYaml;
                    true
                } else {
                    false
                }
            }
        }
    }
}
