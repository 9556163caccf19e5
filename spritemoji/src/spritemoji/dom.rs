//! A small arena tree for HTML fragments.
//!
//! Nodes live in one `Vec` and link to their parent and siblings by index, so
//! splicing a node in after another is O(1) and never moves anything else.
//! Parsing is delegated to `scraper`, serialization to html5ever.

use std::borrow::Cow;
use std::io;

use anyhow::{Result, bail};
use html5ever::serialize::{self, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{LocalName, QualName, namespace_url, ns};
use scraper::{Html, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element with its parsed names kept whole, so `xlink:href` and friends
/// serialize the way they were written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<(QualName, String)>,
}

impl Element {
    /// An HTML element with no attributes.
    pub fn new(name: &str) -> Self {
        Self {
            name: QualName::new(None, ns!(html), LocalName::from(name)),
            attrs: vec![],
        }
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Look up an attribute by its written name, e.g. `class` or `xlink:href`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| attr_name(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| attr_name(key) == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((plain_attr(name), value)),
        }
    }
}

fn plain_attr(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

fn attr_name(name: &QualName) -> Cow<'_, str> {
    match &name.prefix {
        Some(prefix) => Cow::Owned(format!("{prefix}:{}", name.local)),
        None => Cow::Borrowed(&*name.local),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Fragment,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl NodeEntry {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the fragment root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeEntry::new(NodeData::Fragment)],
        }
    }

    /// Parse an HTML fragment in a `<body>` context.
    pub fn parse_fragment(html: &str) -> Self {
        let parsed = Html::parse_fragment(html);
        let mut doc = Self::new();

        // The parser wraps fragment content in an <html> element; its children
        // become the children of our fragment root.
        let mut stack = vec![(doc.root(), parsed.root_element().children())];
        while let Some((parent, children)) = stack.last_mut() {
            let parent = *parent;
            let Some(child) = children.next() else {
                stack.pop();
                continue;
            };

            let id = match child.value() {
                Node::Element(el) => doc.push(NodeData::Element(Element {
                    name: el.name.clone(),
                    attrs: el
                        .attrs
                        .iter()
                        .map(|(name, value)| (name.clone(), value.to_string()))
                        .collect(),
                })),
                Node::Text(text) => doc.create_text(&**text),
                Node::Comment(comment) => doc.create_comment(&**comment),
                _ => continue,
            };
            doc.link_last(parent, id);

            if child.has_children() {
                stack.push((id, child.children()));
            }
        }

        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.data_mut(id) {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text(_))
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match self.data_mut(id) {
            NodeData::Text(existing) => {
                *existing = text.into();
                Ok(())
            }
            other => bail!("cannot set text on non-text node {other:?}"),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.first_child(id).is_some()
    }

    pub fn create_element<K, V>(
        &mut self,
        name: impl Into<String>,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> NodeId
    where
        K: Into<String>,
        V: Into<String>,
    {
        let name: String = name.into();
        let mut element = Element::new(&name);
        element.attrs = attrs
            .into_iter()
            .map(|(k, v)| {
                let k: String = k.into();
                (plain_attr(&k), v.into())
            })
            .collect();
        self.push(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(NodeEntry::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// True when `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Unlink a node (and its subtree) from its parent. The node stays in the
    /// arena and can be inserted elsewhere.
    pub fn detach(&mut self, id: NodeId) {
        let entry = &self.nodes[id.0];
        let (parent, prev, next) = (entry.parent, entry.prev_sibling, entry.next_sibling);

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }

        let entry = &mut self.nodes[id.0];
        entry.parent = None;
        entry.prev_sibling = None;
        entry.next_sibling = None;
    }

    /// Make `child` the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.is_ancestor(child, parent) {
            bail!("cannot append {child:?} inside its own subtree");
        }
        self.detach(child);
        self.link_last(parent, child);
        Ok(())
    }

    /// Link a detached node as the last child of `parent`.
    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.0].last_child;
        {
            let entry = &mut self.nodes[child.0];
            entry.parent = Some(parent);
            entry.prev_sibling = last;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Place `node` immediately after `anchor` under the same parent.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        let Some(parent) = self.parent(anchor) else {
            bail!("cannot insert after {anchor:?}: it has no parent");
        };
        if self.is_ancestor(node, anchor) {
            bail!("cannot insert {node:?} after its own descendant {anchor:?}");
        }
        self.detach(node);

        let next = self.nodes[anchor.0].next_sibling;
        {
            let entry = &mut self.nodes[node.0];
            entry.parent = Some(parent);
            entry.prev_sibling = Some(anchor);
            entry.next_sibling = next;
        }
        self.nodes[anchor.0].next_sibling = Some(node);
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = Some(node),
            None => self.nodes[parent.0].last_child = Some(node),
        }
        Ok(())
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(text) => out.push_str(text),
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Serialize the children of `id` (the `innerHTML` of that node).
    pub fn inner_html(&self, id: NodeId) -> String {
        self.serialize_subtree(id, TraversalScope::ChildrenOnly(None))
    }

    /// Serialize the node itself (the `outerHTML`).
    pub fn outer_html(&self, id: NodeId) -> String {
        self.serialize_subtree(id, TraversalScope::IncludeNode)
    }

    /// Serialize the whole fragment.
    pub fn html(&self) -> String {
        self.inner_html(self.root())
    }

    fn serialize_subtree(&self, id: NodeId, traversal_scope: TraversalScope) -> String {
        let opts = SerializeOpts {
            traversal_scope,
            ..SerializeOpts::default()
        };
        let mut buf = Vec::new();
        serialize::serialize(&mut buf, &Subtree { doc: self, id }, opts)
            .expect("serializing into memory");
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn write_node<S: Serializer>(&self, id: NodeId, serializer: &mut S) -> io::Result<()> {
        match self.data(id) {
            NodeData::Fragment => self.write_children(id, serializer),
            NodeData::Element(el) => {
                let attrs = el.attrs.iter().map(|(name, value)| (name, value.as_str()));
                serializer.start_elem(el.name.clone(), attrs)?;
                self.write_children(id, serializer)?;
                serializer.end_elem(el.name.clone())
            }
            NodeData::Text(text) => serializer.write_text(text),
            NodeData::Comment(text) => serializer.write_comment(text),
        }
    }

    fn write_children<S: Serializer>(&self, id: NodeId, serializer: &mut S) -> io::Result<()> {
        for child in self.children(id) {
            self.write_node(child, serializer)?;
        }
        Ok(())
    }
}

/// A node handed to html5ever's serializer.
struct Subtree<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        match traversal_scope {
            TraversalScope::IncludeNode => self.doc.write_node(self.id, serializer),
            TraversalScope::ChildrenOnly(_) => self.doc.write_children(self.id, serializer),
        }
    }
}

pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize_round_trip() {
        let html = r#"<a title="Ang🧛‍♀️ular">Hello</a> 👌 <b>bold <i>x</i></b><br><!-- note -->"#;
        let doc = Document::parse_fragment(html);
        assert_eq!(doc.html(), html);
    }

    #[test]
    fn entities_are_decoded_then_re_escaped() {
        let doc = Document::parse_fragment("a &lt;b&gt; &amp; &quot;c&quot; &#x1F44C;");
        assert_eq!(doc.text_content(doc.root()), "a <b> & \"c\" 👌");
        assert_eq!(doc.html(), "a &lt;b&gt; &amp; \"c\" 👌");
    }

    #[test]
    fn foreign_attributes_keep_their_prefix() {
        let html = r##"<svg viewBox="0 0 8 8"><use xlink:href="#icon"></use></svg><p lang="en" xml:lang="en">x</p>"##;
        let doc = Document::parse_fragment(html);
        assert_eq!(doc.html(), html);

        let svg = doc.first_child(doc.root()).unwrap();
        let use_el = doc.first_child(svg).unwrap();
        assert_eq!(doc.element(use_el).unwrap().attr("xlink:href"), Some("#icon"));
    }

    #[test]
    fn attribute_order_is_kept() {
        let html = r#"<a title="t" href="/x" class="c" data-z="1" id="i">a</a>"#;
        assert_eq!(Document::parse_fragment(html).html(), html);
    }

    #[test]
    fn raw_text_is_not_escaped() {
        let html = "<script>if (a < b && c) {}</script>";
        assert_eq!(Document::parse_fragment(html).html(), html);
    }

    #[test]
    fn insert_after_keeps_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_text("a");
        let c = doc.create_text("c");
        doc.append(root, a).unwrap();
        doc.append(root, c).unwrap();

        let b = doc.create_element("b", [("class", "x")]);
        doc.insert_after(a, b).unwrap();
        let d = doc.create_text("d");
        doc.insert_after(c, d).unwrap();

        assert_eq!(doc.html(), r#"a<b class="x"></b>cd"#);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c, d]);
    }

    #[test]
    fn insert_after_moves_attached_node() {
        let mut doc = Document::parse_fragment("<p>one</p><p>two</p>");
        let root = doc.root();
        let first = doc.first_child(root).unwrap();
        let second = doc.next_sibling(first).unwrap();
        doc.insert_after(second, first).unwrap();
        assert_eq!(doc.html(), "<p>two</p><p>one</p>");
    }

    #[test]
    fn rejects_invalid_edits() {
        let mut doc = Document::parse_fragment("<p>x</p>");
        let root = doc.root();
        let p = doc.first_child(root).unwrap();
        let x = doc.first_child(p).unwrap();

        assert!(doc.insert_after(root, p).is_err());
        assert!(doc.insert_after(x, p).is_err());
        assert!(doc.append(x, root).is_err());
        assert!(doc.set_text(p, "nope").is_err());
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut doc = Document::new();
        let span = doc.create_element("span", [("class", "a"), ("id", "b")]);
        let el = doc.element_mut(span).unwrap();
        el.set_attr("class", "c");
        el.set_attr("title", "t");
        assert_eq!(doc.outer_html(span), r#"<span class="c" id="b" title="t"></span>"#);
    }
}
