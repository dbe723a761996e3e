use std::borrow::Cow;

/// Type names that are provided by every target and never become generic
/// parameters in generated code.
pub const BUILTIN_TYPES: &[&str] = &["any", "boolean", "List", "number", "string", "void"];

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// 32-bit string hash over UTF-16 code units (`h * 31 + unit`, wrapping),
/// returned as its absolute value so it can be spliced into identifiers.
pub fn hash_code(text: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash.unsigned_abs()
}

/// Derive an identifier from an import path: `"./utils/string-helpers.derw"`
/// becomes `string_helpers`.
pub fn name_from_path(path: &str) -> String {
    let trimmed = path.trim_matches('"');
    let last = trimmed
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .unwrap_or(trimmed);
    let stem = last.split('.').next().unwrap_or(last);
    sanitize_identifier(stem).into_owned()
}

fn sanitize_identifier(component: &str) -> Cow<'_, str> {
    if component
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Cow::Borrowed(component);
    }
    Cow::Owned(
        component
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_positive() {
        assert_eq!(hash_code(""), 0);
        assert_eq!(hash_code("a"), 97);
        assert_eq!(hash_code("ab"), 97 * 31 + 98);
        assert_eq!(hash_code("value"), hash_code("value"));
        assert_ne!(hash_code("left"), hash_code("right"));
    }

    #[test]
    fn names_come_from_the_last_path_segment() {
        assert_eq!(name_from_path("./utils"), "utils");
        assert_eq!(name_from_path("\"../src/Maybe.derw\""), "Maybe");
        assert_eq!(name_from_path("./string-helpers"), "string_helpers");
        assert_eq!(name_from_path("fs"), "fs");
    }

    #[test]
    fn builtin_membership() {
        assert!(is_builtin_type("List"));
        assert!(is_builtin_type("number"));
        assert!(!is_builtin_type("Maybe"));
        assert!(!is_builtin_type("a"));
    }
}
