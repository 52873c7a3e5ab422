// Declarative rule tables for the moderation engine.
//
// Every heuristic the engine uses is a `WeightedRule { name, matcher, category, weight }`.
// Pattern lists are plain data at the top of this file; the rule sets below bind
// them to a category and a weight. Callers never hard-code patterns, they ask a
// `RuleSet` to evaluate a text and get back which rules fired and the weighted sum.
//
// Regex rules are case-insensitive and `.` does not cross line breaks.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// PATTERN DATA
// ============================================================================

pub const PROMOTIONAL_PATTERNS: &[&str] = &[
    r"guaranteed.*profit",
    r"100%.*returns?",
    r"risk.?free",
    r"get.*rich.*quick",
    r"binary.*options?",
    r"crypto.*scam",
    r"pump.*dump",
    r"insider.*trading",
    r"easy.*money",
    r"instant.*wealth",
];

pub const SCAM_PATTERNS: &[&str] = &[
    r"send.*bitcoin",
    r"investment.*opportunity",
    r"limited.*time.*offer",
    r"act.*now",
    r"exclusive.*deal",
    r"telegram.*channel",
    r"whatsapp.*group",
    r"signal.*service",
    r"trading.*bot",
    r"forex.*expert",
];

pub const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"bit\.ly",
    r"tinyurl",
    r"t\.me",
    r"discord\.gg",
    r"join.*my.*channel",
    r"dm.*for.*signals",
    r"private.*group",
    r"vip.*signals",
];

pub const INFORMATIVE_PATTERNS: &[&str] = &[
    r"according.*to",
    r"data.*shows",
    r"research.*indicates",
    r"analysis.*suggests",
    r"report.*states",
];

pub const DATA_EVIDENCE_PATTERNS: &[&str] = &[
    r"earnings.*report",
    r"quarterly.*results",
    r"balance.*sheet",
    r"cash.*flow",
    r"p/e.*ratio",
    r"market.*cap",
    r"revenue.*growth",
    r"options.*chain",
    r"volume.*analysis",
];

pub const TECHNICAL_ANALYSIS_PATTERNS: &[&str] = &[
    r"support.*resistance",
    r"moving.*average",
    r"bollinger.*band",
    r"rsi",
    r"macd",
    r"fibonacci",
    r"candlestick",
    r"chart.*pattern",
];

pub const SPECULATIVE_PATTERNS: &[&str] = &[
    r"i.*think",
    r"might",
    r"could",
    r"probably",
    r"maybe",
    r"prediction",
    r"forecast",
    r"expect",
];

/// Finance, news and regulator domains that count as a real source.
pub const SOURCE_DOMAINS: &[&str] = &[
    "sec.gov",
    "edgar.sec.gov",
    "investopedia.com",
    "bloomberg.com",
    "reuters.com",
    "wsj.com",
    "ft.com",
    "marketwatch.com",
    "yahoo.com/finance",
    "google.com/finance",
    "tradingview.com",
    "finviz.com",
    "morningstar.com",
    "seekingalpha.com",
];

/// Named references to primary filings or wire services. A post citing one of
/// these counts as sourced even without a link.
pub const SOURCE_CITATION_PATTERNS: &[&str] = &[
    r"\bsec\b.*\bfilings?\b",
    r"\b10-[kq]\b",
    r"\b8-k\b",
    r"\bedgar\b",
    r"\bbloomberg\b",
    r"\breuters\b",
    r"wall street journal",
    r"financial times",
];

// ============================================================================
// RULE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Promotional,
    Scam,
    Repetitive,
    Suspicious,
    Informative,
    DataEvidence,
    TechnicalAnalysis,
    Speculative,
    SourceCitation,
}

/// How a rule decides whether it fires.
#[derive(Debug, Clone)]
pub enum Matcher {
    Pattern(Regex),
    /// The same uppercase ASCII letter `min_len` or more times in a row ("AAAA").
    UppercaseRun { min_len: usize },
    /// A chunk of at least `min_len` characters repeated back to back at least
    /// `min_repeats` times, all on one line.
    RepeatedChunk { min_len: usize, min_repeats: usize },
}

impl Matcher {
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Pattern(regex) => regex.is_match(text),
            Matcher::UppercaseRun { min_len } => has_uppercase_run(text, *min_len),
            Matcher::RepeatedChunk {
                min_len,
                min_repeats,
            } => has_repeated_chunk(text, *min_len, *min_repeats),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightedRule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub category: RuleCategory,
    pub weight: f64,
}

impl WeightedRule {
    /// Build a case-insensitive regex rule. The rule's name is its pattern.
    pub fn pattern(pattern: &'static str, category: RuleCategory, weight: f64) -> Self {
        let regex = Regex::new(&format!("(?i){pattern}")).expect("rule pattern is valid");
        Self {
            name: pattern,
            matcher: Matcher::Pattern(regex),
            category,
            weight,
        }
    }

    pub fn structural(
        name: &'static str,
        matcher: Matcher,
        category: RuleCategory,
        weight: f64,
    ) -> Self {
        Self {
            name,
            matcher,
            category,
            weight,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Rules that fired for one text, plus their weighted sum.
#[derive(Debug, Clone)]
pub struct RuleHits<'a> {
    pub matched: Vec<&'a WeightedRule>,
    pub score: f64,
}

impl RuleHits<'_> {
    pub fn count(&self, category: RuleCategory) -> usize {
        self.matched
            .iter()
            .filter(|rule| rule.category == category)
            .count()
    }

    pub fn any(&self, category: RuleCategory) -> bool {
        self.matched.iter().any(|rule| rule.category == category)
    }
}

/// An ordered list of rules evaluated together.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<WeightedRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<WeightedRule>) -> Self {
        Self { rules }
    }

    /// Bind a list of patterns to one category and weight.
    pub fn from_patterns(patterns: &[&'static str], category: RuleCategory, weight: f64) -> Self {
        Self::new(
            patterns
                .iter()
                .map(|p| WeightedRule::pattern(*p, category, weight))
                .collect(),
        )
    }

    /// Concatenate several sets, keeping their order.
    pub fn combine(sets: Vec<RuleSet>) -> Self {
        Self::new(sets.into_iter().flat_map(|set| set.rules).collect())
    }

    pub fn rules(&self) -> &[WeightedRule] {
        &self.rules
    }

    /// Generic weighted scorer: every matching rule contributes its weight once.
    pub fn evaluate(&self, text: &str) -> RuleHits<'_> {
        let matched: Vec<&WeightedRule> = self.rules.iter().filter(|r| r.is_match(text)).collect();
        let score = matched.iter().map(|r| r.weight).sum();
        RuleHits { matched, score }
    }

    pub fn any_match(&self, text: &str) -> bool {
        self.rules.iter().any(|r| r.is_match(text))
    }

    pub fn match_count(&self, text: &str) -> usize {
        self.rules.iter().filter(|r| r.is_match(text)).count()
    }
}

// ============================================================================
// RULE SETS
// ============================================================================

static PROMOTIONAL: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::from_patterns(PROMOTIONAL_PATTERNS, RuleCategory::Promotional, 1.0));
static SCAM: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::from_patterns(SCAM_PATTERNS, RuleCategory::Scam, 1.0));
static SUSPICIOUS: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::from_patterns(SUSPICIOUS_PATTERNS, RuleCategory::Suspicious, 1.0));
static INFORMATIVE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::from_patterns(INFORMATIVE_PATTERNS, RuleCategory::Informative, 1.0));
static DATA_EVIDENCE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_patterns(DATA_EVIDENCE_PATTERNS, RuleCategory::DataEvidence, 1.0)
});
static TECHNICAL_ANALYSIS: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_patterns(
        TECHNICAL_ANALYSIS_PATTERNS,
        RuleCategory::TechnicalAnalysis,
        1.0,
    )
});
static SPECULATIVE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::from_patterns(SPECULATIVE_PATTERNS, RuleCategory::Speculative, 1.0));

static SOURCE_CITATION: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_patterns(SOURCE_CITATION_PATTERNS, RuleCategory::SourceCitation, 1.0)
});

static REPETITIVE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(vec![
        WeightedRule::structural(
            "repeated chunk",
            Matcher::RepeatedChunk {
                min_len: 10,
                min_repeats: 3,
            },
            RuleCategory::Repetitive,
            1.0,
        ),
        WeightedRule::structural(
            "repeated capital",
            Matcher::UppercaseRun { min_len: 4 },
            RuleCategory::Repetitive,
            1.0,
        ),
        WeightedRule::pattern(r"!{3,}", RuleCategory::Repetitive, 1.0),
        WeightedRule::pattern(r"\${3,}", RuleCategory::Repetitive, 1.0),
    ])
});

// Weighted sets: same patterns, weights chosen per consumer.
static QUICK_SCREEN: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::combine(vec![
        RuleSet::from_patterns(PROMOTIONAL_PATTERNS, RuleCategory::Promotional, 25.0),
        RuleSet::from_patterns(SCAM_PATTERNS, RuleCategory::Scam, 35.0),
    ])
});
static SCAM_RISK: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::from_patterns(SCAM_PATTERNS, RuleCategory::Scam, 20.0));
static AI_VERIFICATION: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::combine(vec![
        RuleSet::from_patterns(
            TECHNICAL_ANALYSIS_PATTERNS,
            RuleCategory::TechnicalAnalysis,
            5.0,
        ),
        RuleSet::from_patterns(PROMOTIONAL_PATTERNS, RuleCategory::Promotional, -10.0),
    ])
});
static LIGHTWEIGHT_CREDIBILITY: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::combine(vec![
        RuleSet::from_patterns(
            TECHNICAL_ANALYSIS_PATTERNS,
            RuleCategory::TechnicalAnalysis,
            8.0,
        ),
        RuleSet::from_patterns(PROMOTIONAL_PATTERNS, RuleCategory::Promotional, -15.0),
    ])
});

/// Detection table for one category (every rule weighs 1).
pub fn rules_for(category: RuleCategory) -> &'static RuleSet {
    match category {
        RuleCategory::Promotional => &PROMOTIONAL,
        RuleCategory::Scam => &SCAM,
        RuleCategory::Repetitive => &REPETITIVE,
        RuleCategory::Suspicious => &SUSPICIOUS,
        RuleCategory::Informative => &INFORMATIVE,
        RuleCategory::DataEvidence => &DATA_EVIDENCE,
        RuleCategory::TechnicalAnalysis => &TECHNICAL_ANALYSIS,
        RuleCategory::Speculative => &SPECULATIVE,
        RuleCategory::SourceCitation => &SOURCE_CITATION,
    }
}

/// Submission-gate screen: promotional +25, scam +35 per match.
pub fn quick_screen_rules() -> &'static RuleSet {
    &QUICK_SCREEN
}

/// Scam component of the full risk score: +20 per match.
pub fn scam_risk_rules() -> &'static RuleSet {
    &SCAM_RISK
}

/// AI verification adjustment: technical analysis +5, promotional -10 per match.
pub fn ai_verification_rules() -> &'static RuleSet {
    &AI_VERIFICATION
}

/// Lightweight credibility adjustment: technical analysis +8, promotional -15 per match.
pub fn lightweight_credibility_rules() -> &'static RuleSet {
    &LIGHTWEIGHT_CREDIBILITY
}

// ============================================================================
// STRUCTURAL MATCHERS
// ============================================================================

fn has_uppercase_run(text: &str, min_len: usize) -> bool {
    if min_len == 0 {
        return true;
    }

    let mut previous: Option<char> = None;
    let mut run = 0;
    for c in text.chars() {
        if c.is_ascii_uppercase() && previous == Some(c) {
            run += 1;
        } else if c.is_ascii_uppercase() {
            run = 1;
        } else {
            run = 0;
        }
        if run >= min_len {
            return true;
        }
        previous = Some(c);
    }
    false
}

// For each period `len`, a chunk repeated `min_repeats` times means a stretch of
// `len * (min_repeats - 1)` positions where chars[k] == chars[k + len].
// Runs per line, so the period is bounded by the line, not the whole post.
fn has_repeated_chunk(text: &str, min_len: usize, min_repeats: usize) -> bool {
    let min_len = min_len.max(1);
    let min_repeats = min_repeats.max(2);

    let mut chars: Vec<char> = Vec::new();
    for line in text.split('\n') {
        if line.len() < min_len * min_repeats {
            continue;
        }
        chars.clear();
        chars.extend(line.chars());
        if line_has_repeated_chunk(&chars, min_len, min_repeats) {
            return true;
        }
    }
    false
}

fn line_has_repeated_chunk(chars: &[char], min_len: usize, min_repeats: usize) -> bool {
    let max_len = chars.len() / min_repeats;
    for len in min_len..=max_len {
        let needed = len * (min_repeats - 1);
        let mut streak = 0;
        for k in 0..chars.len() - len {
            if chars[k] == chars[k + len] {
                streak += 1;
                if streak >= needed {
                    return true;
                }
            } else {
                streak = 0;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        for category in [
            RuleCategory::Promotional,
            RuleCategory::Scam,
            RuleCategory::Repetitive,
            RuleCategory::Suspicious,
            RuleCategory::Informative,
            RuleCategory::DataEvidence,
            RuleCategory::TechnicalAnalysis,
            RuleCategory::Speculative,
            RuleCategory::SourceCitation,
        ] {
            let set = rules_for(category);
            assert!(!set.rules().is_empty());
            assert!(set.rules().iter().all(|r| r.category == category));
        }
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let promo = rules_for(RuleCategory::Promotional);
        assert!(promo.any_match("GUARANTEED PROFIT"));
        assert!(promo.any_match("totally Risk-Free"));
        assert!(!promo.any_match("a measured take on margins"));
    }

    #[test]
    fn dot_does_not_cross_lines() {
        let promo = rules_for(RuleCategory::Promotional);
        assert!(!promo.any_match("guaranteed\nprofit"));
    }

    #[test]
    fn source_citations_need_whole_words() {
        let citations = rules_for(RuleCategory::SourceCitation);
        assert!(citations.any_match("According to SEC filings, revenue grew"));
        assert!(citations.any_match("per the latest 10-K"));
        assert!(!citations.any_match("a second look at filings"));
        assert!(!citations.any_match("my 10-kg dumbbell"));
    }

    #[test]
    fn weighted_scorer_sums_matches() {
        let hits = quick_screen_rules().evaluate("Guaranteed profit via insider trading, act now");
        assert_eq!(hits.count(RuleCategory::Promotional), 2);
        assert_eq!(hits.count(RuleCategory::Scam), 1);
        assert!((hits.score - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_weights_penalize() {
        let hits = ai_verification_rules().evaluate("MACD cross, easy money");
        assert!(hits.any(RuleCategory::TechnicalAnalysis));
        assert!(hits.any(RuleCategory::Promotional));
        assert!((hits.score - (5.0 - 10.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn uppercase_run_needs_same_letter() {
        assert!(has_uppercase_run("BUYYYY now", 4));
        assert!(!has_uppercase_run("ABCD", 4));
        assert!(!has_uppercase_run("yyyy", 4));
        assert!(!has_uppercase_run("AAA A", 4));
    }

    #[test]
    fn repeated_chunk_needs_three_copies() {
        let chunk = "buy $TSLA ";
        assert!(has_repeated_chunk(&chunk.repeat(3), 10, 3));
        assert!(!has_repeated_chunk(&chunk.repeat(2), 10, 3));
        assert!(!has_repeated_chunk("short short short", 10, 3));
        assert!(has_repeated_chunk(
            &format!("intro: {}", "moon soon!! ".repeat(4)),
            10,
            3
        ));
    }

    #[test]
    fn repeated_chunk_stays_on_one_line() {
        let line = "to the moon\n";
        assert!(!has_repeated_chunk(&line.repeat(3), 10, 3));
        assert!(has_repeated_chunk(
            &format!("{}{}", line.repeat(3), "dip dip dip dip dip dip"),
            3,
            3
        ));
    }

    #[test]
    fn long_posts_with_short_lines_are_checked_per_line() {
        let lines: Vec<String> = (0..2_000).map(|i| format!("note {i}: fine")).collect();
        let text = lines.join("\n");
        assert!(text.chars().count() > 20_000);
        assert!(!has_repeated_chunk(&text, 10, 3));

        let spammed = format!("{text}\n{}", "buy $TSLA ".repeat(3));
        assert!(has_repeated_chunk(&spammed, 10, 3));
    }

    #[test]
    fn repetitive_rules_cover_punctuation() {
        let repetitive = rules_for(RuleCategory::Repetitive);
        assert!(repetitive.any_match("wow!!!"));
        assert!(repetitive.any_match("$$$ incoming"));
        assert!(!repetitive.any_match("Fair value is $120."));
    }
}
