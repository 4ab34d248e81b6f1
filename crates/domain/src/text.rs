//! Deterministic placement and removal of comment blocks inside a source
//! document. Both functions leave every unrelated line untouched.

use crate::errors::{Error, Result};

/// Literal start-of-comment marker text for a key.
pub fn start_marker(key: &str) -> String {
    format!("START COMMENT {key}")
}

/// Literal end-of-comment marker text for a key.
pub fn end_marker(key: &str) -> String {
    format!("END COMMENT {key}")
}

/// Insert `block` into `document` as one verbatim unit.
///
/// The insertion point is the top of the contiguous run of blank lines
/// immediately above the last line whose trimmed text equals `end_marker`
/// (or above the end of the document when no marker line exists). The
/// document is expected to carry a blank-line cushion before the marker;
/// without one this fails rather than guessing a spot. Exactly one blank
/// line ends up between the block and the content on either side.
///
/// Calling this twice inserts twice; uniqueness is the caller's concern.
pub fn insert_block(document: &str, end_marker: &str, block: &str) -> Result<String> {
    let mut lines: Vec<String> = document.split('\n').map(str::to_owned).collect();
    if lines.last().map(|l| !l.is_empty()).unwrap_or(true) {
        lines.push(String::new());
    }

    let trimmed: Vec<String> = lines.iter().map(|l| l.trim().to_owned()).collect();
    let marker_idx = trimmed
        .iter()
        .rposition(|l| l == end_marker)
        .unwrap_or(lines.len() - 1);

    let mut at = trimmed[..=marker_idx]
        .iter()
        .rposition(|l| l.is_empty())
        .ok_or_else(|| {
            Error::Document("no blank line found above the comment marker".to_string())
        })?;

    // Climb to the top of the blank-line run.
    while at > 0 && trimmed[at - 1].is_empty() {
        at -= 1;
    }

    lines.insert(at, format!("\n{block}"));
    Ok(lines.join("\n"))
}

/// Remove the marker-delimited block for `key` from `document`.
///
/// The last line containing the literal start marker through the last line
/// containing the literal end marker go, inclusive, along with the single
/// separator blank line the inserter put above the start marker. That makes
/// inserting and then removing a comment restore the document byte for byte.
/// A missing marker (wrong or unknown key) is NotFound.
pub fn remove_block(document: &str, key: &str) -> Result<String> {
    let start_text = start_marker(key);
    let end_text = end_marker(key);
    let lines: Vec<&str> = document.split('\n').collect();

    let start = lines.iter().rposition(|l| l.contains(&start_text));
    let end = lines.iter().rposition(|l| l.contains(&end_text));
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s <= e => (s, e),
        _ => return Err(Error::NotFound("comment markers not found".to_string())),
    };

    let cut = if start > 0 && lines[start - 1].trim().is_empty() {
        start - 1
    } else {
        start
    };

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    kept.extend_from_slice(&lines[..cut]);
    kept.extend_from_slice(&lines[end + 1..]);

    let mut out = kept.join("\n");
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "END_COMMENTS";
    const BLOCK: &str = "This is my super comment\nHello";

    #[test]
    fn inserts_at_top_of_blank_run_before_marker() {
        let post = "Hello world\n\nSome other stuff\n\n\n\n\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n";
        assert_eq!(
            insert_block(post, MARKER, BLOCK).unwrap(),
            "Hello world\n\nSome other stuff\n\nThis is my super comment\nHello\n\n\n\n\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n"
        );
    }

    #[test]
    fn falls_back_to_end_of_document_without_marker() {
        let post = "Hello world\n\nSome other stuff\n\n\n\n\n\n";
        assert_eq!(
            insert_block(post, MARKER, BLOCK).unwrap(),
            "Hello world\n\nSome other stuff\n\nThis is my super comment\nHello\n\n\n\n\n\n"
        );
    }

    #[test]
    fn always_leaves_one_blank_line_around_the_block() {
        let post = "Hello world\n\nSome other stuff\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n";
        assert_eq!(
            insert_block(post, MARKER, BLOCK).unwrap(),
            "Hello world\n\nSome other stuff\n\nThis is my super comment\nHello\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n"
        );
    }

    #[test]
    fn works_with_a_single_trailing_blank_line() {
        let post = "Hello world\n\nSome other stuff\n";
        assert_eq!(
            insert_block(post, MARKER, BLOCK).unwrap(),
            "Hello world\n\nSome other stuff\n\nThis is my super comment\nHello\n"
        );
    }

    #[test]
    fn adds_a_trailing_blank_line_when_missing() {
        let post = "Hello world\n\nSome other stuff";
        assert_eq!(
            insert_block(post, MARKER, BLOCK).unwrap(),
            "Hello world\n\nSome other stuff\n\nThis is my super comment\nHello\n"
        );
    }

    #[test]
    fn last_marker_occurrence_governs_insertion() {
        let post = "Hello world\n\nSome other stuff\n\n\nEND_COMMENTS\n\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n";
        assert_eq!(
            insert_block(post, MARKER, BLOCK).unwrap(),
            "Hello world\n\nSome other stuff\n\n\nEND_COMMENTS\n\nThis is my super comment\nHello\n\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n"
        );
    }

    #[test]
    fn fails_without_a_blank_line_cushion() {
        let post = "Line one\nEND_COMMENTS\n";
        assert!(matches!(
            insert_block(post, MARKER, BLOCK),
            Err(Error::Document(_))
        ));
    }

    #[test]
    fn insert_then_remove_restores_the_document() {
        let post = "Hello world\n\nSome other stuff\n\n\n\n\n\n{% comment %}\nEND_COMMENTS\n{% endcomment %}\n";
        let key = "abc123";
        let block = format!(
            "{}\n<p>Nice post!</p>\n{}",
            start_marker(key),
            end_marker(key)
        );

        let with_comment = insert_block(post, MARKER, &block).unwrap();
        assert_ne!(with_comment, post);
        assert_eq!(remove_block(&with_comment, key).unwrap(), post);
    }

    #[test]
    fn insert_then_remove_restores_a_document_without_marker() {
        let post = "Hello world\n\nSome other stuff\n";
        let key = "abc123";
        let block = format!("{}\nHi\n{}", start_marker(key), end_marker(key));

        let with_comment = insert_block(post, MARKER, &block).unwrap();
        assert_eq!(remove_block(&with_comment, key).unwrap(), post);
    }

    #[test]
    fn remove_is_not_found_for_an_unknown_key() {
        let post = "Hello world\n\nSTART COMMENT aaa\nHi\nEND COMMENT aaa\n";
        assert!(matches!(
            remove_block(post, "bbb"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn remove_is_not_found_when_one_marker_is_missing() {
        let post = "Hello world\n\nSTART COMMENT aaa\nHi\n";
        assert!(matches!(
            remove_block(post, "aaa"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn remove_only_touches_the_keyed_block() {
        let post = "intro\n\nSTART COMMENT one\nfirst\nEND COMMENT one\n\nSTART COMMENT two\nsecond\nEND COMMENT two\n\noutro\n";
        let out = remove_block(post, "one").unwrap();
        assert!(!out.contains("first"));
        assert!(out.contains("second"));
        assert!(out.contains("intro"));
        assert!(out.contains("outro"));
        assert!(out.ends_with('\n'));
    }
}
