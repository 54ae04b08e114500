//! `__all__` literal extraction.

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::python::text;

/// State of `__all__` while walking a module top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum ExportState {
    /// No assignment seen.
    #[default]
    Absent,
    /// Last assignment was a literal list/tuple of plain strings.
    Literal(BTreeSet<String>),
    /// Something dynamic touched `__all__`. Stays invalid for the file.
    Invalid,
}

impl ExportState {
    /// Names usable for visibility, `None` when absent or invalid.
    pub(crate) fn into_names(self) -> Option<BTreeSet<String>> {
        match self {
            Self::Literal(names) => Some(names),
            Self::Absent | Self::Invalid => None,
        }
    }

    /// Feeds one module-level `expression_statement`.
    pub(crate) fn observe(&mut self, statement: &Node<'_>, src: &[u8]) {
        let mut cursor = statement.walk();
        for expr in statement.named_children(&mut cursor) {
            match expr.kind() {
                "assignment" => self.observe_assignment(&expr, src),
                "augmented_assignment" => {
                    if targets_all(&expr, src) {
                        *self = Self::Invalid;
                    }
                }
                "call" => {
                    if mutates_all(&expr, src) {
                        *self = Self::Invalid;
                    }
                }
                _ => {}
            }
        }
    }

    fn observe_assignment(&mut self, assignment: &Node<'_>, src: &[u8]) {
        if !targets_all(assignment, src) {
            return;
        }
        // Bare annotation (`__all__: list[str]`) binds nothing.
        let Some(value) = assignment.child_by_field_name("right") else {
            return;
        };
        if *self == Self::Invalid {
            return;
        }
        *self = match literal_names(&value, src) {
            Some(names) => Self::Literal(names),
            None => Self::Invalid,
        };
    }
}

fn targets_all(node: &Node<'_>, src: &[u8]) -> bool {
    node.child_by_field_name("left")
        .is_some_and(|left| left.kind() == "identifier" && text(&left, src) == "__all__")
}

/// `__all__.extend(..)` and other in-place list updates.
fn mutates_all(call: &Node<'_>, src: &[u8]) -> bool {
    let Some(function) = call.child_by_field_name("function") else {
        return false;
    };
    if function.kind() != "attribute" {
        return false;
    }
    let object = function.child_by_field_name("object");
    let method = function.child_by_field_name("attribute");
    object.is_some_and(|o| o.kind() == "identifier" && text(&o, src) == "__all__")
        && method.is_some_and(|m| {
            matches!(
                text(&m, src),
                "append" | "extend" | "insert" | "remove" | "pop" | "clear"
            )
        })
}

/// Strings of a list/tuple literal, or `None` if any element is not a plain
/// string literal.
fn literal_names(value: &Node<'_>, src: &[u8]) -> Option<BTreeSet<String>> {
    if !matches!(value.kind(), "list" | "tuple" | "expression_list") {
        return None;
    }
    let mut names = BTreeSet::new();
    let mut cursor = value.walk();
    for element in value.named_children(&mut cursor) {
        match element.kind() {
            "comment" => {}
            "string" => {
                names.insert(plain_string(&element, src)?);
            }
            _ => return None,
        }
    }
    Some(names)
}

/// Content of a string literal without f/b prefixes or interpolation.
fn plain_string(node: &Node<'_>, src: &[u8]) -> Option<String> {
    let mut content = String::new();
    let mut cursor = node.walk();
    for part in node.children(&mut cursor) {
        match part.kind() {
            "string_start" => {
                let prefix = text(&part, src).trim_end_matches(['"', '\'']);
                if prefix.contains(['f', 'F', 'b', 'B', 't', 'T']) {
                    return None;
                }
            }
            "string_content" => content.push_str(text(&part, src)),
            "interpolation" => return None,
            _ => {}
        }
    }
    Some(content)
}

#[cfg(test)]
mod tests {
    use crate::PythonParser;
    use proboscis_core::ModuleParser;
    use std::collections::BTreeSet;
    use std::path::Path;

    fn exports(src: &str) -> Option<BTreeSet<String>> {
        PythonParser::new()
            .parse(Path::new("/proj/m.py"), src)
            .unwrap()
            .exported_names
    }

    fn set(names: &[&str]) -> Option<BTreeSet<String>> {
        Some(names.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn list_and_tuple_literals() {
        assert_eq!(exports("__all__ = ['a', \"b\"]\n"), set(&["a", "b"]));
        assert_eq!(exports("__all__ = ('a',)\n"), set(&["a"]));
        assert_eq!(exports("__all__ = 'a', 'b'\n"), set(&["a", "b"]));
    }

    #[test]
    fn empty_list_is_present_but_empty() {
        assert_eq!(exports("__all__ = []\n"), set(&[]));
    }

    #[test]
    fn annotated_assignment_counts() {
        assert_eq!(exports("__all__: list[str] = ['a']\n"), set(&["a"]));
    }

    #[test]
    fn comments_inside_list_are_ignored() {
        assert_eq!(
            exports("__all__ = [\n    'a',  # first\n    # spacer\n    'b',\n]\n"),
            set(&["a", "b"])
        );
    }

    #[test]
    fn absent_when_missing() {
        assert_eq!(exports("x = ['a']\n"), None);
    }

    #[test]
    fn dynamic_forms_are_treated_as_absent() {
        assert_eq!(exports("__all__ = [f'{x}']\n"), None);
        assert_eq!(exports("__all__ = [b'a']\n"), None);
        assert_eq!(exports("__all__ = ['a' 'b']\n"), None);
        assert_eq!(exports("__all__ = [name]\n"), None);
        assert_eq!(exports("__all__ = names()\n"), None);
        assert_eq!(exports("__all__ = ['a'] + other\n"), None);
        assert_eq!(exports("__all__ = 'a'\n"), None);
    }

    #[test]
    fn augmented_assignment_invalidates() {
        assert_eq!(exports("__all__ = ['a']\n__all__ += ['b']\n"), None);
        assert_eq!(exports("__all__ += ['b']\n__all__ = ['a']\n"), None);
    }

    #[test]
    fn in_place_list_updates_invalidate() {
        assert_eq!(exports("__all__ = ['a']\n__all__.extend(['b'])\n"), None);
        assert_eq!(exports("__all__ = ['a']\n__all__.append('b')\n"), None);
        assert_eq!(exports("__all__ = ['a']\n__all__.remove('a')\n"), None);
        assert_eq!(exports("__all__ = ['b', 'a']\n__all__.sort()\n"), set(&["a", "b"]));
        assert_eq!(exports("__all__ = ['a']\nnames.extend(['b'])\n"), set(&["a"]));
    }

    #[test]
    fn later_literal_replaces_earlier() {
        assert_eq!(exports("__all__ = ['a']\n__all__ = ['b']\n"), set(&["b"]));
    }

    #[test]
    fn raw_prefix_is_plain() {
        assert_eq!(exports("__all__ = [r'a', u'b']\n"), set(&["a", "b"]));
    }
}
