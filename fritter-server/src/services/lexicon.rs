//! Word lists behind the good sport score.

/// AFINN-165, one `word<TAB>valence` entry per line.
static AFINN_165: &str = include_str!("afinn-165.txt");

/// Single-word AFINN-165 entries with their valence (-5..=5), hyphens dropped
/// the way the tokenizer drops them. Phrases and entries with digits or
/// accents never survive tokenization and are skipped.
pub fn afinn() -> impl Iterator<Item = (String, i8)> {
    AFINN_165.lines().filter_map(parse_entry)
}

fn parse_entry(line: &str) -> Option<(String, i8)> {
    let (word, value) = line.rsplit_once('\t')?;
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return None;
    }
    let value = value.trim().parse::<i8>().ok()?;
    Some((word.replace('-', ""), value))
}

/// Words that flip the sign of every later hit in the same text. Apostrophes
/// are stripped before lookup, so contractions appear without them.
pub static NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "nowhere",
    "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "cant", "couldnt",
    "wont", "wouldnt", "shouldnt", "havent", "hasnt", "hadnt",
];

/// English stop words. Negations are deliberately absent. A stop word is
/// never scored, so "like" is shadowed even though AFINN rates it.
pub static STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "another", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "between", "both", "but", "by",
    "came", "can", "come", "could", "did", "do", "each", "for", "from", "get", "got",
    "had", "has", "have", "he", "her", "here", "him", "himself", "his", "how", "i", "if",
    "in", "into", "is", "it", "like", "make", "many", "me", "might", "more", "most",
    "much", "must", "my", "now", "of", "on", "only", "or", "other", "our", "out", "over",
    "said", "same", "see", "should", "since", "some", "still", "such", "take", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "up", "very", "was", "way", "we", "well", "were",
    "what", "where", "which", "while", "who", "with", "would", "you", "your",
];
