//! Username and profile heuristics behind the bot signal.
//!
//! Each rule is a named predicate with a weight. The bot signal is the sum of
//! the weights of every matching rule, clamped to `[0.0, 1.0]`. Rules are
//! evaluated in table order and the names of matching rules are kept so a
//! report can say why an account looks automated.

use std::sync::LazyLock;

use regex::Regex;

/// What the bot rules look at. `username` is already lowercased.
#[derive(Debug, Clone, Copy)]
pub struct BotInput<'a> {
    pub username: &'a str,
    pub posts_count: Option<u64>,
    pub bio: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct BotRule {
    pub name: &'static str,
    pub weight: f64,
    pub matches: fn(&BotInput<'_>) -> bool,
}

/// Substrings the collector historically flagged as bot-like.
const BOT_KEYWORDS: &[&str] = &["bot", "follow", "gram", "like"];

/// Generic word followed by a long numeric tail, e.g. `carol_1234567`.
static NUMERIC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]+[._]?[0-9]{4,}$").expect("valid numeric suffix regex")
});

/// Platform-assigned style names, e.g. `user83920`, `insta_2231_09`.
static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(user|insta|instagram|ig|account)[._0-9]*[0-9]$")
        .expect("valid default pattern regex")
});

pub const BOT_RULES: &[BotRule] = &[
    BotRule {
        name: "numeric_suffix",
        weight: 0.45,
        matches: numeric_suffix,
    },
    BotRule {
        name: "high_digit_ratio",
        weight: 0.25,
        matches: high_digit_ratio,
    },
    BotRule {
        name: "default_pattern",
        weight: 0.35,
        matches: default_pattern,
    },
    BotRule {
        name: "bot_keyword",
        weight: 0.20,
        matches: bot_keyword,
    },
    BotRule {
        name: "long_alphanumeric",
        weight: 0.15,
        matches: long_alphanumeric,
    },
    BotRule {
        name: "sparse_profile",
        weight: 0.20,
        matches: sparse_profile,
    },
];

/// Digit share at or above which a username counts as digit-heavy.
const HIGH_DIGIT_RATIO: f64 = 0.4;

fn numeric_suffix(input: &BotInput<'_>) -> bool {
    NUMERIC_SUFFIX.is_match(input.username)
}

fn high_digit_ratio(input: &BotInput<'_>) -> bool {
    let total = input.username.chars().count();
    if total == 0 {
        return false;
    }
    let digits = input.username.chars().filter(char::is_ascii_digit).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = digits as f64 / total as f64;
    ratio >= HIGH_DIGIT_RATIO
}

fn default_pattern(input: &BotInput<'_>) -> bool {
    DEFAULT_PATTERN.is_match(input.username)
}

fn bot_keyword(input: &BotInput<'_>) -> bool {
    BOT_KEYWORDS.iter().any(|k| input.username.contains(k))
}

fn long_alphanumeric(input: &BotInput<'_>) -> bool {
    let u = input.username;
    u.len() >= 10
        && u.chars().all(|c| c.is_ascii_alphanumeric())
        && u.chars().any(|c| c.is_ascii_digit())
}

/// No posts and a bio that is blank or carries no words at all.
fn sparse_profile(input: &BotInput<'_>) -> bool {
    input.posts_count == Some(0) && input.bio.is_none_or(is_default_bio)
}

fn is_default_bio(bio: &str) -> bool {
    !bio.chars().any(char::is_alphanumeric)
}

/// Evaluate every rule, returning the clamped signal and the names of the
/// rules that matched, in table order.
#[must_use]
pub fn bot_signal(input: &BotInput<'_>) -> (f64, Vec<&'static str>) {
    let mut signal = 0.0_f64;
    let mut matched = Vec::new();
    for rule in BOT_RULES {
        if (rule.matches)(input) {
            signal += rule.weight;
            matched.push(rule.name);
        }
    }
    (signal.clamp(0.0, 1.0), matched)
}
