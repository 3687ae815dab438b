//! Folder-name sanitization.
//!
//! Submitter-supplied values become Drive folder names, so they are reduced
//! to a safe character set before use: letters, digits, underscore,
//! whitespace, and hyphen survive; whitespace runs collapse to one space;
//! the result is trimmed.

/// Sanitize a value for use as a folder name. Disallowed characters are
/// removed outright; only whitespace separates words.
pub fn folder_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else if c.is_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            last_was_space = false;
        }
    }

    out.trim().to_string()
}

/// Sanitize a branch label: the parenthetical qualifier, if any, is dropped
/// before the usual sanitization. `"Army (Retd.)"` becomes `"Army"`.
pub fn branch_folder_name(input: &str) -> String {
    let before_paren = match input.find('(') {
        Some(idx) => &input[..idx],
        None => input,
    };
    folder_name(before_paren)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_allowed_characters() {
        assert_eq!(folder_name("John_Doe-2"), "John_Doe-2");
    }

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        assert_eq!(folder_name("J.  Doe!!"), "J Doe");
        assert_eq!(folder_name("  a \t b  "), "a b");
    }

    #[test]
    fn stripped_characters_leave_their_neighbors_adjacent() {
        assert_eq!(folder_name("J.Doe"), "JDoe");
        assert_eq!(folder_name("O'Brien"), "OBrien");
        assert_eq!(folder_name("a.b c"), "ab c");
    }

    #[test]
    fn branch_truncates_at_first_parenthesis() {
        assert_eq!(branch_folder_name("Army (Retd.)"), "Army");
        assert_eq!(branch_folder_name("Navy"), "Navy");
        assert_eq!(branch_folder_name("Air Force (Serving) (x)"), "Air Force");
    }

    #[test]
    fn empty_and_symbol_only_inputs_become_empty() {
        assert_eq!(folder_name("!!!"), "");
        assert_eq!(folder_name(""), "");
    }
}
