//! Lexicon sentiment for the good sport score.
//!
//! Text is lowercased, stripped to ASCII letters and whitespace, tokenized on
//! whitespace and cleared of stop words. Each remaining token is looked up in
//! the AFINN lexicon (falling back to its stem); a negation flips the sign of
//! every hit after it. The result is the signed sum divided by the token count.

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};

use super::lexicon::{afinn, NEGATIONS, STOP_WORDS};

static ANALYZER: Lazy<SentimentAnalyzer> = Lazy::new(SentimentAnalyzer::english);

/// Sentiment of a freet or comment body.
pub fn sentiment_score(text: &str) -> f64 {
    ANALYZER.score(text)
}

pub struct SentimentAnalyzer {
    vocabulary: HashMap<String, f64>,
    negations: HashSet<&'static str>,
    stop_words: HashSet<&'static str>,
    stemmer: Stemmer,
}

impl SentimentAnalyzer {
    pub fn english() -> Self {
        let stemmer = Stemmer::create(Algorithm::English);
        let stop_words: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();

        let entries: Vec<(String, f64)> = afinn()
            .filter(|(word, _)| !stop_words.contains(word.as_str()))
            .map(|(word, value)| (word, f64::from(value)))
            .collect();

        let mut vocabulary: HashMap<String, f64> = entries.iter().cloned().collect();
        for (word, value) in &entries {
            let stem = stemmer.stem(word).into_owned();
            if !stop_words.contains(stem.as_str()) {
                vocabulary.entry(stem).or_insert(*value);
            }
        }

        Self {
            vocabulary,
            negations: NEGATIONS.iter().copied().collect(),
            stop_words,
            stemmer,
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .map(str::to_string)
            .collect()
    }

    pub fn score(&self, text: &str) -> f64 {
        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let mut sign = 1.0;
        let mut total = 0.0;
        for token in &tokens {
            if self.negations.contains(token.as_str()) {
                sign = -1.0;
                continue;
            }
            if let Some(value) = self.valence(token) {
                total += sign * value;
            }
        }

        total / tokens.len() as f64
    }

    fn valence(&self, token: &str) -> Option<f64> {
        self.vocabulary
            .get(token)
            .or_else(|| self.vocabulary.get(self.stemmer.stem(token).as_ref()))
            .copied()
    }
}
