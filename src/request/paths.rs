/// Marker for pattern paths; a path consisting of only this matches every series.
pub const WILDCARD: &str = "*";

/// Literal text before the first wildcard marker, or `None` for literal paths.
#[must_use]
pub fn pattern_prefix(path: &str) -> Option<&str> {
    path.find(WILDCARD).map(|index| &path[..index])
}

/// Merges query paths so a wildcard subtree is never requested alongside
/// literal members it already covers.
///
/// A bare `*` swallows everything else. Otherwise literal paths starting with
/// any pattern's prefix are dropped, and the survivors are sorted byte-wise.
#[must_use]
pub fn normalize_for_read<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    if paths.iter().any(|path| path.as_ref() == WILDCARD) {
        return vec![WILDCARD.to_owned()];
    }

    let paths: Vec<&str> = paths.iter().map(AsRef::as_ref).collect();
    let prefixes: Vec<&str> = paths
        .iter()
        .filter_map(|&path| pattern_prefix(path))
        .collect();

    let mut merged: Vec<String> = paths
        .into_iter()
        .filter(|path| {
            pattern_prefix(path).is_some()
                || !prefixes.iter().any(|prefix| path.starts_with(prefix))
        })
        .map(str::to_owned)
        .collect();
    merged.sort_unstable();
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_members_of_a_pattern_are_dropped() {
        assert_eq!(
            normalize_for_read(&["a.*", "a.b.c", "x.y"]),
            vec!["a.*", "x.y"]
        );
    }

    #[test]
    fn universal_wildcard_wins() {
        assert_eq!(normalize_for_read(&["*", "a.b"]), vec!["*"]);
        assert_eq!(normalize_for_read(&["a.b", "*"]), vec!["*"]);
    }

    #[test]
    fn literals_only_are_sorted() {
        assert_eq!(
            normalize_for_read(&["root.z", "root.a", "root.B"]),
            vec!["root.B", "root.a", "root.z"]
        );
    }

    #[test]
    fn patterns_are_kept_even_when_overlapping() {
        assert_eq!(
            normalize_for_read(&["a.b.*", "a.*", "a.b.c", "ab"]),
            vec!["a.*", "a.b.*", "ab"]
        );
    }

    #[test]
    fn inner_wildcard_uses_text_before_marker() {
        assert_eq!(pattern_prefix("root.*.s1"), Some("root."));
        assert_eq!(pattern_prefix("root.d1"), None);
        assert_eq!(
            normalize_for_read(&["root.d1.s1", "root.*.s1", "other"]),
            vec!["other", "root.*.s1"]
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(normalize_for_read::<&str>(&[]).is_empty());
    }
}
