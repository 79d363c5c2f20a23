//! Wildcard matching for cache invalidation. `*` matches any run of
//! characters, everything else matches itself, and the whole key must match.

pub fn matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key offset it currently absorbs up to
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, k));
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some((star, absorbed)) = backtrack {
            p = star + 1;
            k = absorbed + 1;
            backtrack = Some((star, absorbed + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

/// Escapes Redis glob metacharacters other than `*`.
pub fn to_redis_glob(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_pattern_matches() {
        let pattern = "hashnode:*alice*";
        assert!(matches(pattern, "hashnode:articles:alice:1:9"));
        assert!(matches(pattern, "hashnode:series:alice"));
        assert!(!matches(pattern, "hashnode:articles:bob:1:9"));
    }

    #[test]
    fn test_literal_and_anchoring() {
        assert!(matches("hashnode:series:alice", "hashnode:series:alice"));
        assert!(!matches("hashnode:series", "hashnode:series:alice"));
        assert!(!matches("series:alice", "hashnode:series:alice"));
        assert!(!matches("other:*alice*", "hashnode:series:alice"));
    }

    #[test]
    fn test_star_edge_cases() {
        assert!(matches("*", ""));
        assert!(matches("*", "anything"));
        assert!(matches("a**b", "ab"));
        assert!(matches("a*b*c", "aXbYbZc"));
        assert!(!matches("a*b*c", "aXbYbZ"));
        assert!(!matches("", "a"));
        assert!(matches("", ""));
    }

    #[test]
    fn test_regex_characters_are_literal() {
        assert!(matches("hashnode:*a.b*", "hashnode:series:a.b"));
        assert!(!matches("hashnode:*a.b*", "hashnode:series:aXb"));
    }

    #[test]
    fn test_to_redis_glob() {
        assert_eq!(to_redis_glob("hashnode:*alice*"), "hashnode:*alice*");
        assert_eq!(to_redis_glob("hashnode:*a?[b]*"), "hashnode:*a\\?\\[b\\]*");
    }
}
