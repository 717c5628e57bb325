//! Dataset name sanitizing.

/// Replace every character that is unsafe in a directory name with `_`.
///
/// ASCII letters, digits, `-` and `_` are kept; everything else (spaces, dots, path separators,
/// punctuation, control and non-ASCII characters) becomes an underscore, one per character.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
