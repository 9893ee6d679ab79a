//! Path classification into priority tiers.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Relevance bucket for a changed file. Lower rank sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityTier {
    Source = 1,
    Test = 2,
    Config = 3,
    Docs = 4,
    Noise = 99,
}

impl PriorityTier {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Group heading used by the summary renderer.
    pub fn label(self) -> &'static str {
        match self {
            PriorityTier::Source => "Source",
            PriorityTier::Test => "Tests",
            PriorityTier::Config => "Config",
            PriorityTier::Docs => "Docs",
            PriorityTier::Noise => "Noise",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order in which pattern groups are tried. The first group with a matching
/// pattern decides the tier; paths matching none are [`PriorityTier::Source`].
pub const EVALUATION_ORDER: [PriorityTier; 4] = [
    PriorityTier::Noise,
    PriorityTier::Test,
    PriorityTier::Docs,
    PriorityTier::Config,
];

const NOISE_PATTERNS: &[&str] = &[
    r"package-lock\.json$",
    r"yarn\.lock$",
    r"pnpm-lock\.yaml$",
    r"poetry\.lock$",
    r"Cargo\.lock$",
    r"Gemfile\.lock$",
    r"composer\.lock$",
    r"\.min\.js$",
    r"\.min\.css$",
    r"\.map$",
    r"\.pyc$",
    r"__pycache__",
    r"\.class$",
    r"dist/",
    r"build/",
    r"\.egg-info/",
    r"\.idea/",
    r"\.vscode/",
    r"\.DS_Store$",
    r"node_modules/",
    r"vendor/",
    r"venv/",
    r"\.venv/",
];

const TEST_PATTERNS: &[&str] = &[
    r"tests?/",
    r"specs?/",
    r"__tests__/",
    r"\.test\.",
    r"\.spec\.",
    r"_test\.",
    r"_spec\.",
    r"Test\.java$",
    r"Tests\.java$",
];

const DOCS_PATTERNS: &[&str] = &[
    r"\.md$",
    r"\.rst$",
    r"\.txt$",
    r"docs/",
    r"README",
    r"CHANGELOG",
    r"LICENSE",
];

const CONFIG_PATTERNS: &[&str] = &[
    r"\.json$",
    r"\.ya?ml$",
    r"\.toml$",
    r"\.ini$",
    r"\.env",
    r"\.config\.",
    r"config/",
    r"settings/",
    r"Makefile$",
    r"Dockerfile$",
    r"docker-compose",
];

fn patterns_for(tier: PriorityTier) -> &'static [&'static str] {
    match tier {
        PriorityTier::Noise => NOISE_PATTERNS,
        PriorityTier::Test => TEST_PATTERNS,
        PriorityTier::Docs => DOCS_PATTERNS,
        PriorityTier::Config => CONFIG_PATTERNS,
        PriorityTier::Source => &[],
    }
}

struct TierRule {
    tier: PriorityTier,
    patterns: Vec<Regex>,
}

impl TierRule {
    fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }
}

/// Ordered `(tier, compiled pattern set)` table, matched case-insensitively
/// anywhere in the path.
pub struct Classifier {
    rules: Vec<TierRule>,
}

impl Classifier {
    pub fn new() -> Self {
        let rules = EVALUATION_ORDER
            .iter()
            .map(|&tier| TierRule {
                tier,
                patterns: patterns_for(tier)
                    .iter()
                    .map(|p| Regex::new(&format!("(?i){p}")).expect("built-in pattern is valid"))
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn classify(&self, path: &str) -> PriorityTier {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map_or(PriorityTier::Source, |rule| rule.tier)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::new);

/// Classify a path with the shared built-in classifier.
pub fn classify(path: &str) -> PriorityTier {
    DEFAULT_CLASSIFIER.classify(path)
}
