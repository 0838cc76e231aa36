//! Field paths.
//!
//! Paths render as `address.street`, `items[2].id` or `[3]` for an element of
//! a root-level array.

use std::fmt::Write as _;

/// One step into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Object or record key.
    Key(&'a str),
    /// Array, tuple, map or set position.
    Index(usize),
}

/// Renders segments, root first.
#[must_use]
pub fn render_path(segments: &[PathSegment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], "")]
    #[case(&[PathSegment::Key("a")], "a")]
    #[case(&[PathSegment::Index(3)], "[3]")]
    #[case(&[PathSegment::Key("a"), PathSegment::Index(1)], "a[1]")]
    #[case(
        &[PathSegment::Key("items"), PathSegment::Index(2), PathSegment::Key("id")],
        "items[2].id"
    )]
    #[case(&[PathSegment::Index(0), PathSegment::Index(1)], "[0][1]")]
    fn renders(#[case] segments: &[PathSegment<'static>], #[case] expected: &str) {
        assert_eq!(render_path(segments), expected);
    }
}
