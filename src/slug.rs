//! Branch-name slugs for preview resources.
//!
//! Neon branch names and SSM parameter names get derived from git branch
//! names, which can contain slashes, underscores and arbitrary punctuation.

/// Maximum slug length. Neon branch names stay comfortably below API limits.
const MAX_LENGTH: usize = 50;

/// Turn a git branch name into a resource-safe slug.
///
/// Lowercases, maps every non-alphanumeric run (including `_` and `/`) to a
/// single `-`, trims leading/trailing dashes and truncates to 50 chars.
/// Common Latin accents are transliterated (`café` becomes `cafe`); anything
/// else non-ASCII acts as a separator.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else if let Some(folded) = fold_accent(c) {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push_str(folded);
        } else {
            pending_dash = true;
        }
    }

    out.truncate(MAX_LENGTH);
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Transliterate the Latin-1 accents that show up in real branch names.
fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'à'..='å' | 'À'..='Å' => "a",
        'è'..='ë' | 'È'..='Ë' => "e",
        'ì'..='ï' | 'Ì'..='Ï' => "i",
        'ò'..='ö' | 'Ò'..='Ö' => "o",
        'ù'..='ü' | 'Ù'..='Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ñ' | 'Ñ' => "n",
        'ç' | 'Ç' => "c",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'ø' | 'Ø' => "o",
        _ => return None,
    };
    Some(folded)
}
