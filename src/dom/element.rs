//! Element handle into a `Document` tree

use std::fmt;

use kuchiki::{ElementData, NodeDataRef, NodeRef};

/// A handle to one element of a parsed document
///
/// Handles are cheap to clone and share the underlying node. They are only
/// meaningful together with the `Document` they were obtained from.
#[derive(Clone)]
pub struct Element(NodeDataRef<ElementData>);

impl Element {
    pub(crate) fn from_node(node: NodeRef) -> Option<Self> {
        node.into_element_ref().map(Element)
    }

    pub(crate) fn from_ref(data: NodeDataRef<ElementData>) -> Self {
        Element(data)
    }

    pub(crate) fn node(&self) -> &NodeRef {
        self.0.as_node()
    }

    /// Lowercase local tag name
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.0.name.local.to_string()
    }

    /// Whether this element has the given tag name
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        let local: &str = &self.0.name.local;
        local.eq_ignore_ascii_case(tag)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).map(str::to_owned)
    }

    pub fn set_attr(&self, name: &str, value: impl Into<String>) {
        self.0.attributes.borrow_mut().insert(name, value.into());
    }

    pub fn remove_attr(&self, name: &str) {
        self.0.attributes.borrow_mut().remove(name);
    }

    #[must_use]
    pub fn parent_element(&self) -> Option<Element> {
        self.node().parent().and_then(Element::from_node)
    }

    /// Whether the direct parent has the given tag name
    #[must_use]
    pub fn parent_is(&self, tag: &str) -> bool {
        self.parent_element().is_some_and(|parent| parent.is(tag))
    }

    /// Text content of all descendants
    #[must_use]
    pub fn text(&self) -> String {
        self.node().text_contents()
    }

    /// Serialized markup of this element including its subtree
    #[must_use]
    pub fn outer_html(&self) -> String {
        self.node().to_string()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.outer_html()).finish()
    }
}
