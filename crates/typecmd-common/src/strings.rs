//! String helpers shared across typecmd crates.

/// Remove leading and trailing whitespace.
pub fn trim(s: &str) -> &str {
    s.trim()
}

/// Remove leading and trailing characters contained in `set`.
pub fn trim_set<'a>(s: &'a str, set: &str) -> &'a str {
    s.trim_matches(|c: char| set.contains(c))
}

/// Split `s` at every occurrence of `delimiter`.
///
/// Unlike [`str::split`], an empty input yields no tokens and an empty
/// delimiter yields the input as its single token. Adjacent delimiters
/// produce empty tokens.
pub fn split(s: &str, delimiter: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() {
        return vec![s.to_string()];
    }
    s.split(delimiter).map(str::to_string).collect()
}

/// Join `parts` with `delimiter` between each pair.
pub fn concat<S: AsRef<str>>(parts: &[S], delimiter: &str) -> String {
    let mut result = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            result.push_str(delimiter);
        }
        result.push_str(part.as_ref());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_whitespace() {
        assert_eq!(trim("  \tabc \n"), "abc");
        assert_eq!(trim("   "), "");
    }

    #[test]
    fn test_trim_set() {
        assert_eq!(trim_set("--abc-+", "-+"), "abc");
        assert_eq!(trim_set("abc", ""), "abc");
    }

    #[test]
    fn test_split_empty_input_has_no_tokens() {
        assert!(split("", ",").is_empty());
    }

    #[test]
    fn test_split_empty_delimiter_returns_input() {
        assert_eq!(split("a,b", ""), vec!["a,b"]);
    }

    #[test]
    fn test_split_keeps_empty_tokens() {
        assert_eq!(split("a,,b,", ","), vec!["a", "", "b", ""]);
        assert_eq!(split("de_DE", "_"), vec!["de", "DE"]);
    }

    #[test]
    fn test_split_multichar_delimiter() {
        assert_eq!(split("a, b, c", ", "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat(&["a", "b", "c"], ", "), "a, b, c");
        assert_eq!(concat::<&str>(&[], ", "), "");
        assert_eq!(concat(&["only"], "-"), "only");
    }

    #[test]
    fn test_split_concat_inverse() {
        let parts = split("x:y:z", ":");
        assert_eq!(concat(&parts, ":"), "x:y:z");
    }
}
