//! Mutable HTML document with source-fidelity serialization
//!
//! `Document` owns the parsed kuchiki tree together with the original source.
//! Queries hand out `Element` handles; all structural mutation goes through
//! the document so whitespace around inserted and removed nodes stays tidy.
//! Markup destined for the end of `<head>`/`<body>` is queued as text and
//! only injected during `serialize`.

use std::collections::HashSet;

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use super::element::Element;
use super::loadcss;
use super::serialize::{
    ClosingTag, detect_indent, inject_before_closing, partials, reindent, restore_foreign_content,
    top_level_elements,
};
use crate::config::NoscriptPlacement;
use crate::utils::{LOADCSS_ANCHOR_SELECTOR, LOADCSS_SIGNATURE, STYLESHEET_SELECTOR};

/// Insertion-ordered set of markup strings
#[derive(Debug, Clone, Default)]
pub struct FallbackSet {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl FallbackSet {
    /// Add an entry, returns false if identical markup was already present
    pub fn insert(&mut self, markup: String) -> bool {
        if self.seen.contains(&markup) {
            return false;
        }
        self.seen.insert(markup.clone());
        self.entries.push(markup);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }
}

fn serialize_body(root: &NodeRef) -> String {
    root.select_first("body")
        .map(|body| body.as_node().to_string())
        .unwrap_or_default()
}

/// Parse markup the way a browser with scripting disabled would
///
/// With scripting off, `<noscript>` content is parsed as elements instead of
/// raw text, so links wrapped in fallbacks stay queryable.
fn parse(html: &str) -> NodeRef {
    let mut opts = kuchiki::ParseOpts::default();
    opts.tree_builder.scripting_enabled = false;
    kuchiki::parse_html_with_options(opts).one(html)
}

/// Original text of the `<head>` element
///
/// Only captured when parsing the head span on its own yields the same head
/// as parsing the whole document, i.e. no head content lives elsewhere in the
/// source.
#[derive(Debug, Clone)]
struct HeadSource {
    open_tag: String,
    close_tag: String,
    /// Pristine serialization and original text of each child element
    children: Vec<(String, String)>,
}

impl HeadSource {
    fn capture(html: &str, root: &NodeRef) -> Option<Self> {
        let spans = partials(html, "head");
        let [span] = spans.as_slice() else {
            return None;
        };
        let text = &html[span.clone()];
        let open_len = text.find('>')? + 1;
        let close_len = "</head>".len();
        if text.len() < open_len + close_len || !text.to_ascii_lowercase().ends_with("</head>") {
            return None;
        }

        let head = root.select_first("head").ok()?;
        let fragment = parse(text);
        let alone = fragment.select_first("head").ok()?;
        if alone.as_node().to_string() != head.as_node().to_string() {
            log::debug!("Head content found outside the <head> span, serializing the full tree");
            return None;
        }

        let inner = &text[open_len..text.len() - close_len];
        let originals = top_level_elements(inner);
        let elements: Vec<NodeRef> = head
            .as_node()
            .children()
            .filter(|child| child.as_element().is_some())
            .collect();

        let aligned = originals.len() == elements.len()
            && originals.iter().zip(&elements).all(|((name, _), node)| {
                node.as_element().is_some_and(|data| {
                    let local: &str = &data.name.local;
                    local.eq_ignore_ascii_case(name)
                })
            });
        let children = if aligned {
            originals
                .into_iter()
                .zip(&elements)
                .map(|((_, range), node)| (node.to_string(), inner[range].to_string()))
                .collect()
        } else {
            log::debug!("Head elements do not line up with the source, keeping serialized markup");
            Vec::new()
        };

        Some(Self {
            open_tag: text[..open_len].to_string(),
            close_tag: text[text.len() - close_len..].to_string(),
            children,
        })
    }

    /// Markup of `head` with every unmodified child element in its original text
    fn render(&self, head: &NodeRef) -> String {
        let mut used = vec![false; self.children.len()];
        let mut markup = self.open_tag.clone();

        for child in head.children() {
            let serialized = child.to_string();
            let original = child.as_element().and_then(|_| {
                let index = self
                    .children
                    .iter()
                    .enumerate()
                    .position(|(i, (pristine, _))| !used[i] && *pristine == serialized)?;
                used[index] = true;
                Some(self.children[index].1.as_str())
            });
            markup.push_str(original.unwrap_or(&serialized));
        }

        markup.push_str(&self.close_tag);
        markup
    }
}

pub struct Document {
    root: NodeRef,
    source: String,
    head_source: Option<HeadSource>,
    pristine_body: String,
    indent: String,
    head_indent: String,
    noscript_placement: NoscriptPlacement,
    head_elements: Vec<String>,
    body_elements: Vec<String>,
    noscript: FallbackSet,
}

impl Document {
    /// Parse an HTML document
    ///
    /// Parsing follows the permissive HTML5 algorithm and never fails; missing
    /// `<html>`, `<head>` or `<body>` elements are synthesized.
    #[must_use]
    pub fn load(html: &str, noscript_placement: NoscriptPlacement) -> Self {
        let root = parse(html);

        let head_inner: String = root
            .select_first("head")
            .map(|head| head.as_node().children().map(|child| child.to_string()).collect())
            .unwrap_or_default();

        let head_source = HeadSource::capture(html, &root);
        let pristine_body = serialize_body(&root);

        let indent = detect_indent(html);
        let head_indent = match detect_indent(&head_inner) {
            unit if unit.is_empty() => indent.clone(),
            unit => unit,
        };

        Self {
            root,
            source: html.to_string(),
            head_source,
            pristine_body,
            indent,
            head_indent,
            noscript_placement,
            head_elements: Vec::new(),
            body_elements: Vec::new(),
            noscript: FallbackSet::default(),
        }
    }

    /// Indentation unit detected in the whole source
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Fallback markup collected so far
    #[must_use]
    pub fn noscript_fallbacks(&self) -> &[String] {
        self.noscript.as_slice()
    }

    fn selector_list(selectors: &[&str]) -> Option<String> {
        let joined = selectors
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        (!joined.is_empty()).then_some(joined)
    }

    /// First element in document order matching any of the selectors
    ///
    /// Invalid selectors resolve to no match.
    #[must_use]
    pub fn query_selector(&self, selectors: &[&str]) -> Option<Element> {
        let selector = Self::selector_list(selectors)?;
        match self.root.select_first(&selector) {
            Ok(found) => Some(Element::from_ref(found)),
            Err(()) => None,
        }
    }

    /// All elements matching any of the selectors, in document order
    #[must_use]
    pub fn query_selector_all(&self, selectors: &[&str]) -> Vec<Element> {
        let Some(selector) = Self::selector_list(selectors) else {
            return Vec::new();
        };
        match self.root.select(&selector) {
            Ok(matches) => matches.map(Element::from_ref).collect(),
            Err(()) => {
                log::debug!("Ignoring invalid selector: {selector}");
                Vec::new()
            }
        }
    }

    #[must_use]
    pub fn head(&self) -> Option<Element> {
        self.query_selector(&["head"])
    }

    #[must_use]
    pub fn body(&self) -> Option<Element> {
        self.query_selector(&["body"])
    }

    /// Text of every `<style>` element inside `<head>`
    #[must_use]
    pub fn inline_styles(&self) -> Vec<String> {
        self.query_selector_all(&["head style"])
            .iter()
            .map(Element::text)
            .collect()
    }

    /// Stylesheet and style preload links not wrapped in `<noscript>`
    #[must_use]
    pub fn external_styles(&self) -> Vec<Element> {
        self.query_selector_all(&[STYLESHEET_SELECTOR])
            .into_iter()
            .filter(|link| !link.parent_is("noscript"))
            .collect()
    }

    /// Create a detached element
    ///
    /// The element is produced by the HTML parser from its bare start tag.
    /// Returns `None` for tags the parser would not produce as an element.
    #[must_use]
    pub fn create_element(&self, tag: &str) -> Option<Element> {
        let fragment = parse(&format!("<{tag}>"));
        let element = fragment.select_first(tag).ok()?;
        element.as_node().detach();
        Some(Element::from_ref(element))
    }

    /// Insert a `<style>` block holding `css`
    ///
    /// With a target the block goes right before it using the target's
    /// indentation, otherwise it is appended to `<head>`.
    pub fn add_inline_styles(&mut self, css: &str, target: Option<&Element>) {
        let Some(style) = self.create_element("style") else {
            log::warn!("Unable to create <style> element");
            return;
        };
        style.node().append(NodeRef::new_text(css));

        match target {
            Some(reference) => self.insert_before(&style, reference),
            None => self.append_to_head(&style),
        }
    }

    fn append_to_head(&mut self, element: &Element) {
        let Some(head) = self.head() else {
            log::warn!("Document has no <head>, critical styles not inserted");
            return;
        };
        head.node().append(element.node().clone());
        element
            .node()
            .insert_before(NodeRef::new_text(self.head_indent.clone()));
        element
            .node()
            .insert_after(NodeRef::new_text(format!("\n{}", self.head_indent)));
    }

    /// Queue an element for insertion before `</body>`
    pub fn add_element_to_body(&mut self, element: &Element) {
        self.body_elements.push(element.outer_html());
    }

    /// Queue an element for insertion before `</head>`
    pub fn add_element_to_head(&mut self, element: &Element) {
        self.head_elements.push(element.outer_html());
    }

    /// Queue a `<noscript>` copy of a link
    ///
    /// Links serializing to identical markup share one fallback.
    pub fn add_noscript(&mut self, link: &Element) -> bool {
        self.noscript
            .insert(format!("<noscript>{}</noscript>", link.outer_html()))
    }

    /// Spaces and tabs directly preceding the element on its line
    #[must_use]
    pub fn node_indent(&self, element: &Element) -> String {
        let Some(previous) = element.node().previous_sibling() else {
            return String::new();
        };
        let Some(text) = previous.as_text() else {
            return String::new();
        };
        let text = text.borrow();
        let kept = text.trim_end_matches([' ', '\t']);
        text[kept.len()..].to_string()
    }

    /// Insert `element` before `reference`, followed by a newline at the reference's indentation
    pub fn insert_before(&mut self, element: &Element, reference: &Element) {
        let indent = self.node_indent(reference);
        reference.node().insert_before(element.node().clone());
        if !indent.is_empty() {
            element
                .node()
                .insert_after(NodeRef::new_text(format!("\n{indent}")));
        }
    }

    /// Insert `element` after `reference`, preceded by a newline at the reference's indentation
    pub fn insert_after(&mut self, element: &Element, reference: &Element) {
        let indent = self.node_indent(reference);
        reference.node().insert_after(element.node().clone());
        if !indent.is_empty() {
            reference
                .node()
                .insert_after(NodeRef::new_text(format!("\n{indent}")));
        }
    }

    /// Detach an element along with the whitespace-only text directly before it
    pub fn remove(&mut self, element: &Element) {
        while let Some(previous) = element.node().previous_sibling() {
            let blank = previous
                .as_text()
                .is_some_and(|text| text.borrow().trim().is_empty());
            if !blank {
                break;
            }
            previous.detach();
        }
        element.node().detach();
    }

    /// Insert the loadCSS polyfill after the last stylesheet-related head element
    ///
    /// Does nothing when any script already contains the loader, or when the
    /// head has no link or noscript to anchor on. Returns whether a script was added.
    pub fn maybe_add_loadcss(&mut self) -> bool {
        let already_present = self
            .query_selector_all(&["script"])
            .iter()
            .any(|script| script.text().contains(LOADCSS_SIGNATURE));
        if already_present {
            log::debug!("loadCSS already present, not adding it again");
            return false;
        }

        let Some(anchor) = self
            .query_selector_all(&[LOADCSS_ANCHOR_SELECTOR])
            .into_iter()
            .filter(|element| !element.parent_is("noscript"))
            .last()
        else {
            return false;
        };

        let Some(script) = self.create_element("script") else {
            log::warn!("Unable to create <script> element");
            return false;
        };
        script.node().append(NodeRef::new_text(loadcss::script()));
        self.insert_after(&script, &anchor);
        log::debug!("Inserted loadCSS polyfill after {}", anchor.tag_name());
        true
    }

    /// The `<head>` element spliced into the original source
    ///
    /// `None` when anything outside `<head>` changed or the source head span
    /// does not hold all head content.
    fn spliced_source(&self) -> Option<String> {
        let head_source = self.head_source.as_ref()?;
        if serialize_body(&self.root) != self.pristine_body {
            return None;
        }
        let head = self.root.select_first("head").ok()?;
        reindent(&head_source.render(head.as_node()), &self.source)
    }

    /// Produce the final markup
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut result = self
            .spliced_source()
            .unwrap_or_else(|| restore_foreign_content(&self.root.to_string(), &self.source));

        let mut head = self.head_elements.clone();
        let mut body = self.body_elements.clone();
        match self.noscript_placement {
            NoscriptPlacement::Head => head.extend_from_slice(self.noscript.as_slice()),
            NoscriptPlacement::Body => body.extend_from_slice(self.noscript.as_slice()),
            NoscriptPlacement::Disabled => {}
        }

        result = inject_before_closing(&result, ClosingTag::Head, &head);
        inject_before_closing(&result, ClosingTag::Body, &body)
    }
}
