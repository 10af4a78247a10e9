//! Character-level refinement of a single char change.

use super::types::{DiffFragment, FragmentKind};
use similar::{Algorithm, ChangeTag, TextDiff};

/// Character-level diff of two short fragments.
///
/// Adjacent changes with the same tag are merged, so identical inputs give a
/// single `Common` fragment and fully disjoint inputs give one `Removed`
/// followed by one `Added`.
pub fn refine(original: &str, modified: &str) -> Vec<DiffFragment> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(original, modified);

    let mut fragments: Vec<DiffFragment> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => FragmentKind::Common,
            ChangeTag::Delete => FragmentKind::Removed,
            ChangeTag::Insert => FragmentKind::Added,
        };

        match fragments.last_mut() {
            Some(last) if last.kind == kind => last.value.push_str(change.value()),
            _ => fragments.push(DiffFragment::new(kind, change.value())),
        }
    }

    fragments
}

/// Text of the original side: `Removed` and `Common` fragments in order.
pub fn original_text(fragments: &[DiffFragment]) -> String {
    fragments
        .iter()
        .filter(|fragment| fragment.kind != FragmentKind::Added)
        .map(|fragment| fragment.value.as_str())
        .collect()
}

/// Text of the modified side: `Added` and `Common` fragments in order.
pub fn modified_text(fragments: &[DiffFragment]) -> String {
    fragments
        .iter()
        .filter(|fragment| fragment.kind != FragmentKind::Removed)
        .map(|fragment| fragment.value.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_reconstructs(original: &str, modified: &str) {
        let fragments = refine(original, modified);
        assert_eq!(original_text(&fragments), original, "original side of {:?}", fragments);
        assert_eq!(modified_text(&fragments), modified, "modified side of {:?}", fragments);
    }

    #[test]
    fn test_single_substitution() {
        let fragments = refine("test", "text");
        assert_reconstructs("test", "text");
        assert_eq!(
            fragments,
            vec![
                DiffFragment::new(FragmentKind::Common, "te"),
                DiffFragment::new(FragmentKind::Removed, "s"),
                DiffFragment::new(FragmentKind::Added, "x"),
                DiffFragment::new(FragmentKind::Common, "t"),
            ]
        );
    }

    #[test]
    fn test_identical_inputs() {
        let fragments = refine("same text", "same text");
        assert_eq!(fragments, vec![DiffFragment::new(FragmentKind::Common, "same text")]);
    }

    #[test]
    fn test_disjoint_inputs() {
        let fragments = refine("abc", "xyz");
        assert_eq!(
            fragments,
            vec![
                DiffFragment::new(FragmentKind::Removed, "abc"),
                DiffFragment::new(FragmentKind::Added, "xyz"),
            ]
        );
    }

    #[test]
    fn test_empty_sides() {
        assert!(refine("", "").is_empty());
        assert_eq!(refine("", "new"), vec![DiffFragment::new(FragmentKind::Added, "new")]);
        assert_eq!(refine("old", ""), vec![DiffFragment::new(FragmentKind::Removed, "old")]);
    }

    #[test]
    fn test_reconstruction_property() {
        let pairs = [
            ("hello cat", "hello dog"),
            ("我爱你", "我不爱你"),
            ("line one\nline two", "line 1\nline two\nline three"),
            ("fn main() {}", "pub fn main() -> Result<()> {}"),
            ("aaaa", "aaaaaaaa"),
            ("tab\there", "tab here"),
            ("", "only added"),
            ("only removed", ""),
        ];
        for (original, modified) in pairs {
            assert_reconstructs(original, modified);
        }
    }

    #[test]
    fn test_cjk_counts_code_points() {
        let fragments = refine("我爱你", "我不爱你");
        let added: usize = fragments
            .iter()
            .filter(|f| f.kind == FragmentKind::Added)
            .map(DiffFragment::char_len)
            .sum();
        assert_eq!(added, 1);
    }
}
