//! Cache keys owned by the dictionary.

/// Key for the cached validity of a normalised word.
pub(crate) fn valid_word(word: &str) -> String {
    format!("dictionary:valid:{word}")
}

/// Key for the cached possible-word set of a sorted letter signature.
pub(crate) fn possible_words(signature: &str) -> String {
    format!("dictionary:possible:{signature}")
}
