use super::stemmer::Stemmer;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for indexing: decompose accents, drop everything that is
/// not a letter or whitespace, and lowercase what remains.
pub fn clean(text: &str) -> String {
    text.nfd()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split cleaned text into words, in order
pub fn parse(text: &str) -> Vec<String> {
    clean(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Parse and stem a line, appending the stems to `stems`
pub fn stem_line<S, C>(line: &str, stemmer: &S, stems: &mut C)
where
    S: Stemmer + ?Sized,
    C: Extend<String>,
{
    stems.extend(parse(line).iter().map(|word| stemmer.stem(word)));
}

/// Stems of a line in parsed order (positions are derived from this order)
pub fn list_stems<S: Stemmer + ?Sized>(line: &str, stemmer: &S) -> Vec<String> {
    let mut stems = Vec::new();
    stem_line(line, stemmer, &mut stems);
    stems
}

/// Sorted, deduplicated stems of a line
pub fn unique_stems<S: Stemmer + ?Sized>(line: &str, stemmer: &S) -> BTreeSet<String> {
    let mut stems = BTreeSet::new();
    stem_line(line, stemmer, &mut stems);
    stems
}
