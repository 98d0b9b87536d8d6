/// Tokenize scene text into its ordered word sequence.
///
/// Splits on runs of whitespace and keeps the original case. Position `i` in the
/// returned vector is word offset `i + 1` in the index.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Normalize one query token: trimmed and lower-cased.
///
/// Indexed text is never lower-cased, so a folded query term only matches words
/// that were already lower-case in the source.
pub fn fold_query_token(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Words of a (possibly multi-word) phrase, in order.
pub fn phrase_words(phrase: &str) -> impl Iterator<Item = &str> {
    phrase.split_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_case_and_order() {
        let t = tokenize("  To be,\tor NOT\n to be ");
        assert_eq!(t, vec!["To", "be,", "or", "NOT", "to", "be"]);
    }

    #[test]
    fn fold_trims_and_lowercases() {
        assert_eq!(fold_query_token("  Hamlet "), "hamlet");
        assert_eq!(fold_query_token("   "), "");
    }

    #[test]
    fn phrase_words_splits_on_any_whitespace() {
        let w: Vec<&str> = phrase_words("good  night\tsweet").collect();
        assert_eq!(w, vec!["good", "night", "sweet"]);
    }
}
