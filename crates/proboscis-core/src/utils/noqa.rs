//! `noqa` suppression directives.
//!
//! Supports comments like:
//! ```text
//! def divide(a, b):  # noqa: PL001, PL002
//! def helper():  #noqa PL003
//! def legacy():  # noqa
//! ```
//!
//! A directive without rule codes suppresses every rule.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::model::Suppression;

fn directive_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)#\s*noqa\b(?:\s*:)?(.*)").ok())
        .as_ref()
}

fn code_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+[0-9]+$").ok())
        .as_ref()
}

/// Parses a comment and returns the suppression it declares, if any.
///
/// # Returns
///
/// `None` when the comment carries no `noqa` directive, [`Suppression::All`]
/// for a bare `noqa`, otherwise the listed rule codes (upper-cased).
#[must_use]
pub fn parse_noqa(comment: &str) -> Option<Suppression> {
    let captures = directive_regex()?.captures(comment)?;
    let tail = captures.get(1).map_or("", |m| m.as_str());
    // A second `#` starts an unrelated trailing comment.
    let tail = tail.split('#').next().unwrap_or_default();

    let codes: BTreeSet<String> = match code_regex() {
        Some(code) => tail
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|token| code.is_match(token))
            .map(str::to_ascii_uppercase)
            .collect(),
        None => BTreeSet::new(),
    };

    if codes.is_empty() {
        Some(Suppression::All)
    } else {
        Some(Suppression::Rules(codes))
    }
}

#[derive(Debug, Clone)]
struct Comment {
    text: String,
    standalone: bool,
}

/// Comments of one file keyed by 1-indexed line.
///
/// Filled by a parser while walking the syntax tree, then queried for
/// declaration- and file-scoped suppressions.
#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    comments: BTreeMap<usize, Vec<Comment>>,
    first_code_line: Option<usize>,
}

impl CommentMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a comment. `standalone` means nothing but whitespace precedes
    /// it on its line.
    pub fn insert(&mut self, line: usize, text: impl Into<String>, standalone: bool) {
        self.comments.entry(line).or_default().push(Comment {
            text: text.into(),
            standalone,
        });
    }

    /// Records the first line holding code. Comments after it never form a
    /// file-level directive.
    pub fn set_first_code_line(&mut self, line: usize) {
        self.first_code_line = Some(line);
    }

    /// Suppression for a declaration whose decorator stack starts at
    /// `stack_start` and whose header spans `header_start..=header_end`.
    ///
    /// Comments on any line of the decorator stack or header count, plus a
    /// comment-only line directly above the stack.
    #[must_use]
    pub fn declaration_suppression(
        &self,
        stack_start: usize,
        header_start: usize,
        header_end: usize,
    ) -> Suppression {
        let first = stack_start.min(header_start);
        let mut result = Suppression::None;

        if first > 1 {
            for comment in self.comments.get(&(first - 1)).into_iter().flatten() {
                if comment.standalone {
                    if let Some(found) = parse_noqa(&comment.text) {
                        result = result.merge(found);
                    }
                }
            }
        }

        for comment in self
            .comments
            .range(first..=header_end.max(first))
            .flat_map(|(_, comments)| comments)
        {
            if let Some(found) = parse_noqa(&comment.text) {
                result = result.merge(found);
            }
        }

        result
    }

    /// File-scoped suppression: the first `noqa` directive among the comment
    /// lines that precede any code.
    #[must_use]
    pub fn file_suppression(&self) -> Suppression {
        self.comments
            .iter()
            .take_while(|(line, _)| self.first_code_line.map_or(true, |code| **line < code))
            .flat_map(|(_, comments)| comments)
            .filter(|c| c.standalone)
            .find_map(|c| parse_noqa(&c.text))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(codes: &[&str]) -> Suppression {
        Suppression::Rules(codes.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_parse_noqa_single_rule() {
        assert_eq!(parse_noqa("#noqa PL001"), Some(rules(&["PL001"])));
    }

    #[test]
    fn test_parse_noqa_with_colon() {
        assert_eq!(parse_noqa("#noqa: PL001"), Some(rules(&["PL001"])));
    }

    #[test]
    fn test_parse_noqa_multiple_rules_and_spacing() {
        assert_eq!(
            parse_noqa("# noqa : PL001 , PL002,PL003"),
            Some(rules(&["PL001", "PL002", "PL003"]))
        );
        assert_eq!(
            parse_noqa("#NOQA:pl002"),
            Some(rules(&["PL002"]))
        );
    }

    #[test]
    fn test_parse_noqa_without_rules_suppresses_all() {
        assert_eq!(parse_noqa("#noqa"), Some(Suppression::All));
        assert_eq!(parse_noqa("# noqa:"), Some(Suppression::All));
    }

    #[test]
    fn test_parse_noqa_ignores_trailing_comment() {
        assert_eq!(
            parse_noqa("# noqa: PL001  # legacy code"),
            Some(rules(&["PL001"]))
        );
    }

    #[test]
    fn test_parse_plain_comment() {
        assert_eq!(parse_noqa("# just a comment"), None);
        assert_eq!(parse_noqa("# noqaPL001"), None);
    }

    #[test]
    fn test_declaration_suppression_on_header_line() {
        let mut map = CommentMap::new();
        map.insert(3, "# noqa: PL001", false);
        assert_eq!(map.declaration_suppression(3, 3, 3), rules(&["PL001"]));
        assert_eq!(map.declaration_suppression(5, 5, 5), Suppression::None);
    }

    #[test]
    fn test_declaration_suppression_on_multiline_header() {
        let mut map = CommentMap::new();
        map.insert(4, "# noqa: PL002", false);
        assert_eq!(map.declaration_suppression(3, 3, 5), rules(&["PL002"]));
    }

    #[test]
    fn test_declaration_suppression_above_decorators() {
        let mut map = CommentMap::new();
        map.insert(1, "# noqa: PL004", true);
        map.insert(2, "# noqa: PL001", false);
        assert_eq!(map.declaration_suppression(2, 3, 3), rules(&["PL001", "PL004"]));
    }

    #[test]
    fn test_trailing_comment_above_is_not_a_directive() {
        let mut map = CommentMap::new();
        map.insert(2, "# noqa", false);
        assert_eq!(map.declaration_suppression(3, 3, 3), Suppression::None);
    }

    #[test]
    fn test_file_suppression_from_leading_comments() {
        let mut map = CommentMap::new();
        map.insert(1, "#!/usr/bin/env python", true);
        map.insert(2, "# noqa: PL002", true);
        map.set_first_code_line(4);
        map.insert(10, "# noqa: PL001", true);
        assert_eq!(map.file_suppression(), rules(&["PL002"]));
    }

    #[test]
    fn test_file_suppression_ignores_comments_after_code() {
        let mut map = CommentMap::new();
        map.set_first_code_line(1);
        map.insert(2, "# noqa", true);
        assert_eq!(map.file_suppression(), Suppression::None);
    }
}
