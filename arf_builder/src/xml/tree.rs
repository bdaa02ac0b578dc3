//! Owned, mutable document tree
//!
//! Nodes live in an arena owned by their [`Document`] and are addressed by
//! [`NodeId`]. Detaching a node only unlinks it; the arena slot stays valid
//! so the subtree can be re-attached elsewhere in the same document.

/// Namespace URI permanently bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Handle to a node inside one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Qualified name: namespace URI, prefix used to spell it, local part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Name without a namespace
    pub fn local(local: &str) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.to_string(),
        }
    }

    /// Namespaced name spelled with the given prefix (`None` = default namespace)
    pub fn qualified(namespace: &str, prefix: Option<&str>, local: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Name as written in markup (`prefix:local` or `local`)
    pub fn lexical(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// Namespace declaration made on an element; an empty `uri` with no prefix
/// undeclares the default namespace (`xmlns=""`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub namespaces: Vec<NamespaceDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: Option<String> },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned XML document
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    /// Document-level children: prolog comments/PIs and at most one element
    top: Vec<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document whose root element has the given name
    pub fn with_root(name: QName) -> (Self, NodeId) {
        let mut doc = Self::new();
        let root = doc.create_element(name);
        doc.set_root(root);
        (doc, root)
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: QName) -> NodeId {
        self.push(NodeKind::Element(Element {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: Option<&str>) -> NodeId {
        self.push(NodeKind::ProcessingInstruction {
            target: target.to_string(),
            data: data.map(str::to_string),
        })
    }

    /// Create an element with a single text child, appended to `parent`
    pub fn append_text_element(&mut self, parent: NodeId, name: QName, text: &str) -> NodeId {
        let element = self.create_element(name);
        let text = self.create_text(text);
        self.append_child(element, text);
        self.append_child(parent, element);
        element
    }

    // ------------------------------------------------------------------
    // Document level
    // ------------------------------------------------------------------

    /// Root element, if any
    pub fn root(&self) -> Option<NodeId> {
        self.top
            .iter()
            .copied()
            .find(|id| self.is_element(*id))
    }

    /// Replace the root element; prolog nodes are kept
    pub fn set_root(&mut self, element: NodeId) {
        self.detach(element);
        if let Some(old) = self.root() {
            self.detach(old);
        }
        self.top.push(element);
    }

    /// Append a document-level comment or processing instruction
    pub fn push_top_level(&mut self, node: NodeId) {
        self.detach(node);
        self.top.push(node);
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether the node is currently reachable from the document
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        self.top.contains(&current)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn name(&self, id: NodeId) -> Option<&QName> {
        self.element(id).map(|e| &e.name)
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id).map(|n| n.local.as_str())
    }

    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        self.name(id).and_then(|n| n.namespace.as_deref())
    }

    /// Whether the node is an element with the given local name
    pub fn has_local_name(&self, id: NodeId, local: &str) -> bool {
        self.local_name(id) == Some(local)
    }

    /// Direct element children in document order
    pub fn element_children(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.is_element(*child))
    }

    /// Direct element children with the given local name
    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        local: &'a str,
    ) -> impl DoubleEndedIterator<Item = NodeId> + 'a {
        self.element_children(id)
            .filter(move |child| self.has_local_name(*child, local))
    }

    /// First direct element child with the given local name
    pub fn first_child_named(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.children_named(id, local).next()
    }

    /// Last direct element child with the given local name
    pub fn last_child_named(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.children_named(id, local).next_back()
    }

    /// Element siblings following `id`, in document order
    pub fn following_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        let position = siblings.iter().position(|s| *s == id).unwrap_or(siblings.len());
        siblings[position + 1..]
            .iter()
            .copied()
            .filter(|s| self.is_element(*s))
            .collect()
    }

    /// The node and all of its descendants in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Ancestors from the parent up to the root element
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.kind(node) {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Unlink a node from its parent (or from the document level)
    pub fn detach(&mut self, id: NodeId) {
        match self.nodes[id.0].parent.take() {
            Some(parent) => self.nodes[parent.0].children.retain(|c| *c != id),
            None => self.top.retain(|c| *c != id),
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `node` as the sibling immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.insert_relative(reference, node, 0);
    }

    /// Insert `node` as the sibling immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.insert_relative(reference, node, 1);
    }

    fn insert_relative(&mut self, reference: NodeId, node: NodeId, offset: usize) {
        self.detach(node);
        let Some(parent) = self.parent(reference) else {
            let position = self.top.iter().position(|c| *c == reference).unwrap_or(self.top.len());
            let index = (position + offset).min(self.top.len());
            self.top.insert(index, node);
            return;
        };
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings.iter().position(|c| *c == reference).unwrap_or(siblings.len());
        let index = (position + offset).min(siblings.len());
        siblings.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
    }

    /// Replace all children of an element with one text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        let text = self.create_text(text);
        self.append_child(id, text);
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Value of an attribute without a namespace
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespaced attribute
    pub fn attribute_ns(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.namespace.as_deref() == Some(namespace) && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute without a namespace
    pub fn set_attribute(&mut self, id: NodeId, local: &str, value: &str) {
        self.set_attribute_qualified(id, QName::local(local), value);
    }

    /// Set an attribute by qualified name, replacing one with the same
    /// namespace and local name
    pub fn set_attribute_qualified(&mut self, id: NodeId, name: QName, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element
            .attributes
            .iter_mut()
            .find(|a| a.name.namespace == name.namespace && a.name.local == name.local)
        {
            Some(existing) => {
                existing.name.prefix = name.prefix;
                existing.value = value.to_string();
            }
            None => element.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, local: &str) -> Option<String> {
        let element = self.element_mut(id)?;
        let position = element
            .attributes
            .iter()
            .position(|a| a.name.namespace.is_none() && a.name.local == local)?;
        Some(element.attributes.remove(position).value)
    }

    // ------------------------------------------------------------------
    // Cross-document copy
    // ------------------------------------------------------------------

    /// Deep-copy a node of `source` into this document's arena, detached
    pub fn import_node(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.push(source.kind(node).clone());
        for child in source.children(node) {
            let child_copy = self.import_node(source, *child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Move `node` and its subtree out of `source`. Node contents are taken
    /// rather than copied; the vacated source slots stay unlinked.
    pub fn adopt_node(&mut self, source: &mut Document, node: NodeId) -> NodeId {
        source.detach(node);
        self.take_subtree(source, node)
    }

    fn take_subtree(&mut self, source: &mut Document, node: NodeId) -> NodeId {
        let data = &mut source.nodes[node.0];
        let kind = std::mem::replace(&mut data.kind, NodeKind::Text(String::new()));
        let children = std::mem::take(&mut data.children);

        let moved = self.push(kind);
        for child in children {
            source.nodes[child.0].parent = None;
            let child_moved = self.take_subtree(source, child);
            self.nodes[child_moved.0].parent = Some(moved);
            self.nodes[moved.0].children.push(child_moved);
        }
        moved
    }
}
