//! GitHub-flavored markdown anchor/slug generation and TOC items.

use std::collections::HashMap;

/// GitHub heading anchor slug.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, underscore, or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Hands out unique anchors in document order: the second `foo` heading
/// becomes `foo-1`, the third `foo-2`.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, text: &str) -> String {
        let base = github_slug(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        anchor
    }
}

/// Escape markdown emphasis and code markers in inline text.
pub fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Generate a table-of-contents link to a heading anchor.
pub fn render_toc_link(text: &str, anchor: &str) -> String {
    format!("[{}](#{})", escape_inline(text), anchor)
}

/// Generate a TOC list item, indented two spaces per nesting step.
pub fn render_toc_item(nesting: usize, text: &str, anchor: &str) -> String {
    format!("{}* {}", "  ".repeat(nesting), render_toc_link(text, anchor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple() {
        assert_eq!(github_slug("hello world"), "hello-world");
    }

    #[test]
    fn slug_keeps_underscores() {
        assert_eq!(github_slug("example_function"), "example_function");
        assert_eq!(github_slug("_protected_method"), "_protected_method");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(github_slug("package/"), "package");
        assert_eq!(github_slug("shapes.py"), "shapespy");
    }

    #[test]
    fn slug_uppercase() {
        assert_eq!(github_slug("Member Variables"), "member-variables");
    }

    #[test]
    fn duplicates_get_suffixes() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("Args"), "args");
        assert_eq!(slugger.slug("Args"), "args-1");
        assert_eq!(slugger.slug("Return"), "return");
        assert_eq!(slugger.slug("Args"), "args-2");
    }

    #[test]
    fn toc_item() {
        assert_eq!(
            render_toc_item(1, "__str__", "__str__"),
            "  * [\\_\\_str\\_\\_](#__str__)"
        );
    }
}
