//! Valence-aware, rule-based headline sentiment.
//!
//! Each token gets a lexicon valence, adjusted for nearby boosters, negators
//! and shouting; the sum is squashed into a compound score in [-1, 1].

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, f32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f32>>(raw).unwrap_or_else(|e| {
        tracing::error!(error = %e, "sentiment lexicon failed to parse");
        HashMap::new()
    })
});

const NEGATION_SCALAR: f32 = -0.74;
const BOOST_INCR: f32 = 0.293;
const CAPS_INCR: f32 = 0.733;
const EXCLAIM_INCR: f32 = 0.292;
const NORMALIZE_ALPHA: f32 = 15.0;

/// Anything that maps text to a compound polarity in [-1, 1].
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f32;
}

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_valence(&self, w: &str) -> Option<f32> {
        LEXICON.get(w).copied()
    }

    /// Per-token valences after booster, caps, negation and "but" adjustments.
    pub fn valences(&self, text: &str) -> Vec<f32> {
        let raw: Vec<&str> = tokenize(text).collect();
        let lower: Vec<String> = raw.iter().map(|t| t.to_lowercase()).collect();
        let caps_differ = raw.iter().any(|t| is_shouted(t)) && raw.iter().any(|t| !is_shouted(t));

        let mut out = Vec::with_capacity(raw.len());
        for i in 0..raw.len() {
            if booster_direction(&lower[i]).is_some() {
                out.push(0.0);
                continue;
            }
            let Some(mut v) = self.word_valence(&lower[i]) else {
                out.push(0.0);
                continue;
            };

            if caps_differ && is_shouted(raw[i]) {
                v += CAPS_INCR * v.signum();
            }

            for (k, damp) in [(1usize, 1.0f32), (2, 0.95), (3, 0.9)] {
                if i < k {
                    break;
                }
                if let Some(dir) = booster_direction(&lower[i - k]) {
                    let mut s = BOOST_INCR * dir * v.signum();
                    if caps_differ && is_shouted(raw[i - k]) {
                        s += CAPS_INCR * s.signum();
                    }
                    v += s * damp;
                }
            }

            if (1..=3).any(|k| i >= k && is_negator(&lower[i - k])) {
                v *= NEGATION_SCALAR;
            }

            out.push(v);
        }

        // Contrast: what follows "but" outweighs what precedes it.
        if let Some(pivot) = lower.iter().position(|t| t == "but") {
            for (j, v) in out.iter_mut().enumerate() {
                if j < pivot {
                    *v *= 0.5;
                } else if j > pivot {
                    *v *= 1.5;
                }
            }
        }

        out
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> f32 {
        let clean = clean_text(text);
        let mut sum: f32 = self.valences(&clean).iter().sum();
        if sum != 0.0 {
            let bangs = clean.matches('!').count().min(4) as f32;
            sum += bangs * EXCLAIM_INCR * sum.signum();
        }
        normalize(sum)
    }
}

fn normalize(score: f32) -> f32 {
    if score == 0.0 {
        return 0.0;
    }
    (score / (score * score + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// HTML entity decode, strip tags, unify apostrophes, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    static RE_TAGS: once_cell::sync::OnceCell<Option<regex::Regex>> =
        once_cell::sync::OnceCell::new();
    let decoded = html_escape::decode_html_entities(s).replace(['\u{2018}', '\u{2019}'], "'");
    let stripped = match RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").ok()) {
        Some(re) => re.replace_all(&decoded, " ").into_owned(),
        None => decoded,
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace tokens with surrounding punctuation trimmed; inner apostrophes
/// and hyphens survive so "isn't" and "sell-off" stay whole.
fn tokenize(s: &str) -> impl Iterator<Item = &str> + '_ {
    s.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
}

fn is_shouted(tok: &str) -> bool {
    tok.chars().filter(|c| c.is_alphabetic()).count() > 1
        && tok.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

fn is_negator(tok: &str) -> bool {
    tok.ends_with("n't")
        || matches!(
            tok,
            "not" | "no" | "never" | "neither" | "nor" | "none" | "nothing" | "cannot" | "without"
        )
}

/// +1 for intensifiers, -1 for dampeners.
fn booster_direction(tok: &str) -> Option<f32> {
    match tok {
        "very" | "extremely" | "hugely" | "highly" | "massively" | "sharply" | "significantly"
        | "substantially" | "really" | "remarkably" | "most" | "more" | "deeply" => Some(1.0),
        "slightly" | "somewhat" | "barely" | "marginally" | "modestly" | "hardly" | "less"
        | "little" | "partly" => Some(-1.0),
        _ => None,
    }
}
