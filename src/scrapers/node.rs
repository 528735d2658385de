//! Small capability interface over parsed HTML nodes.
//!
//! The navigator and extractors only need a handful of questions answered
//! about an element: its tag, its element children, its descendants of a
//! given tag, an attribute, and its text. [`PageNode`] captures those so the
//! traversal code does not depend on a particular parser; it is implemented
//! here for `scraper::ElementRef`.

use scraper::ElementRef;

pub trait PageNode<'a>: Copy + Sized {
    fn tag_name(&self) -> &'a str;

    /// Direct element children, in document order.
    fn children(&self) -> Vec<Self>;

    /// All descendant elements with the given tag, excluding `self`.
    fn descendants_named(&self, tag: &str) -> Vec<Self>;

    fn attr(&self, name: &str) -> Option<&'a str>;

    /// Raw text fragments of the subtree, in document order.
    fn text_fragments(&self) -> Vec<&'a str>;

    /// First descendant with the given tag.
    fn first_named(&self, tag: &str) -> Option<Self> {
        self.descendants_named(tag).into_iter().next()
    }

    /// Direct children with the given tag.
    fn children_named(&self, tag: &str) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter(|c| c.tag_name().eq_ignore_ascii_case(tag))
            .collect()
    }

    /// Concatenated subtree text, trimmed.
    fn text(&self) -> String {
        self.text_fragments().concat().trim().to_string()
    }

    /// Trimmed text, or `None` when the subtree holds only whitespace.
    fn non_blank_text(&self) -> Option<String> {
        let t = self.text();
        (!t.is_empty()).then_some(t)
    }

    /// All descendant anchors.
    fn links(&self) -> Vec<Self> {
        self.descendants_named("a")
    }

    /// Text of the first descendant anchor, when it has any.
    fn link_label(&self) -> Option<String> {
        self.first_named("a").and_then(|a| a.non_blank_text())
    }

    /// `href` of the first descendant anchor.
    fn first_link_target(&self) -> Option<&'a str> {
        self.first_named("a").and_then(|a| a.attr("href"))
    }
}

impl<'a> PageNode<'a> for ElementRef<'a> {
    fn tag_name(&self) -> &'a str {
        self.value().name()
    }

    fn children(&self) -> Vec<Self> {
        // `ElementRef` derefs to its tree node; walk that rather than the
        // trait method of the same name.
        let node = **self;
        node.children().filter_map(ElementRef::wrap).collect()
    }

    fn descendants_named(&self, tag: &str) -> Vec<Self> {
        let node = **self;
        node.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name().eq_ignore_ascii_case(tag))
            .collect()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn text_fragments(&self) -> Vec<&'a str> {
        ElementRef::text(self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn with_root<F: FnOnce(ElementRef<'_>)>(html: &str, sel: &str, f: F) {
        let doc = Html::parse_document(html);
        let sel = Selector::parse(sel).unwrap();
        let el = doc.select(&sel).next().unwrap();
        f(el);
    }

    #[test]
    fn test_children_are_direct_elements_only() {
        with_root(
            "<ul id='m'><li><a href='/a'>A</a><ul><li>inner</li></ul></li> text <li>B</li></ul>",
            "#m",
            |ul| {
                let kids = PageNode::children(&ul);
                assert_eq!(kids.len(), 2);
                assert!(kids.iter().all(|k| k.tag_name() == "li"));
            },
        );
    }

    #[test]
    fn test_link_helpers_use_first_anchor() {
        with_root(
            "<div id='d'><a href='/one'> One </a><a href='/two'>Two</a></div>",
            "#d",
            |d| {
                assert_eq!(d.link_label().as_deref(), Some("One"));
                assert_eq!(d.first_link_target(), Some("/one"));
                assert_eq!(d.links().len(), 2);
            },
        );
    }

    #[test]
    fn test_descendants_exclude_self() {
        with_root("<ul id='u'><li><ul><li>x</li></ul></li></ul>", "#u", |u| {
            assert_eq!(u.descendants_named("ul").len(), 1);
            assert_eq!(u.descendants_named("li").len(), 2);
        });
    }

    #[test]
    fn test_non_blank_text() {
        with_root("<p id='p'>   </p>", "#p", |p| {
            assert!(p.non_blank_text().is_none());
        });
        with_root("<p id='p'> hi <b>there</b> </p>", "#p", |p| {
            assert_eq!(p.non_blank_text().as_deref(), Some("hi there"));
        });
    }
}
