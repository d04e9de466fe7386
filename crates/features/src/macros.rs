//! `${name}` expansion against request-supplied external feature info
//!
//! A backslash before `${` keeps the macro text literally. An unterminated
//! `${` is copied through unchanged. Expansion fails (returns `None`) if any
//! referenced name is missing.

use std::collections::HashMap;

const MACRO_START: &str = "${";
const ESCAPE: char = '\\';

/// Expand every `${name}` in `template` from `values`
pub fn expand(template: &str, values: &HashMap<String, String>) -> Option<String> {
    if !template.contains(MACRO_START) {
        return Some(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(idx) = rest.find(MACRO_START) {
        let (before, after) = rest.split_at(idx);
        if before.ends_with(ESCAPE) {
            out.push_str(&before[..before.len() - 1]);
            out.push_str(MACRO_START);
            rest = &after[MACRO_START.len()..];
            continue;
        }
        out.push_str(before);
        let body = &after[MACRO_START.len()..];
        match body.find('}') {
            Some(end) => {
                let key = &body[..end];
                out.push_str(values.get(key)?);
                rest = &body[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Some(out)
}

/// True if `template` contains at least one unescaped macro
pub fn has_macro(template: &str) -> bool {
    let mut rest = template;
    while let Some(idx) = rest.find(MACRO_START) {
        if !rest[..idx].ends_with(ESCAPE) {
            return true;
        }
        rest = &rest[idx + MACRO_START.len()..];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn efi(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_macro() {
        assert_eq!(expand("1.5", &HashMap::new()), Some("1.5".to_string()));
    }

    #[test]
    fn test_single_and_multiple() {
        let values = efi(&[("a", "1"), ("b", "2")]);
        assert_eq!(expand("${a}", &values), Some("1".to_string()));
        assert_eq!(expand("x${a}y${b}z", &values), Some("x1y2z".to_string()));
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(expand("${user_age}", &HashMap::new()), None);
    }

    #[test]
    fn test_escape() {
        let values = efi(&[("a", "1")]);
        assert_eq!(expand("\\${a}", &values), Some("${a}".to_string()));
        assert!(!has_macro("\\${a}"));
        assert!(has_macro("\\${a}${b}"));
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(expand("abc${a", &HashMap::new()), Some("abc${a".to_string()));
    }
}
