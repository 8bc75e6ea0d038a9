use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// Decomposes accents and drops what is left outside ASCII, removes anything
/// that is not a word character, space or hyphen, lowercases, and joins the
/// remaining runs with single hyphens. Agrees with the change-form script.
pub fn slugify(value: &str) -> String {
    let ascii = value.nfkd().filter(char::is_ascii).collect::<String>().to_lowercase();
    let kept = NON_WORD.replace_all(&ascii, "");
    let joined = SEPARATORS.replace_all(kept.trim(), "-");
    joined.trim_matches(|c| c == '-' || c == '_').to_string()
}

pub fn is_valid_slug(value: &str) -> bool {
    SLUG.is_match(value)
}
