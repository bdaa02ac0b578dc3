//! In-scope namespace lookup and post-import reconciliation

use super::tree::{Document, NamespaceDecl, NodeId, QName, XML_NAMESPACE};

impl Document {
    /// Declare a namespace on an element; an existing declaration of the
    /// same prefix on that element is replaced
    pub fn declare_namespace(&mut self, id: NodeId, prefix: Option<&str>, uri: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let prefix = prefix.map(str::to_string);
        match element.namespaces.iter_mut().find(|d| d.prefix == prefix) {
            Some(existing) => existing.uri = uri.to_string(),
            None => element.namespaces.push(NamespaceDecl {
                prefix,
                uri: uri.to_string(),
            }),
        }
    }

    /// URI bound to `prefix` at `id` (`None` prefix = default namespace)
    pub fn lookup_namespace_uri(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|node| self.element(node))
            .find_map(|element| {
                element
                    .namespaces
                    .iter()
                    .find(|d| d.prefix.as_deref() == prefix)
            })
            .map(|decl| decl.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Nearest non-empty prefix bound to `uri` at `id` that is not shadowed
    pub fn lookup_prefix(&self, id: NodeId, uri: &str) -> Option<&str> {
        if uri == XML_NAMESPACE {
            return Some("xml");
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|node| self.element(node))
            .flat_map(|element| element.namespaces.iter())
            .filter(|decl| decl.uri == uri)
            .filter_map(|decl| decl.prefix.as_deref())
            .find(|prefix| self.lookup_namespace_uri(id, Some(*prefix)) == Some(uri))
    }

    /// Default namespace in scope at `id`
    pub fn default_namespace(&self, id: NodeId) -> Option<&str> {
        self.lookup_namespace_uri(id, None)
    }

    /// Make every element and attribute name in the subtree rooted at `top`
    /// resolvable where it now sits.
    ///
    /// A recorded prefix that still resolves to the right URI is kept. Next,
    /// any in-scope prefix bound to the URI is reused. Otherwise the
    /// namespace is declared on `top` under the recorded prefix, or, when that
    /// prefix is bound to something else, under a fresh `ns<N>` prefix on the
    /// element itself.
    pub fn reconcile_namespaces(&mut self, top: NodeId) {
        for node in self.descendants(top) {
            if !self.is_element(node) {
                continue;
            }
            self.reconcile_element_name(top, node);
            self.reconcile_attribute_names(top, node);
        }
    }

    fn reconcile_element_name(&mut self, top: NodeId, node: NodeId) {
        let Some(name) = self.name(node).cloned() else {
            return;
        };

        let Some(uri) = name.namespace.clone() else {
            if self.default_namespace(node).is_some() {
                self.declare_namespace(node, None, "");
            }
            self.set_element_prefix(node, None);
            return;
        };

        if self.lookup_namespace_uri(node, name.prefix.as_deref()) == Some(uri.as_str()) {
            return;
        }

        if self.default_namespace(node) == Some(uri.as_str()) {
            self.set_element_prefix(node, None);
            return;
        }

        if let Some(prefix) = self.lookup_prefix(node, &uri).map(str::to_string) {
            self.set_element_prefix(node, Some(prefix));
            return;
        }

        let prefix = self.bind_new_prefix(top, node, name.prefix.as_deref(), &uri);
        self.set_element_prefix(node, prefix);
    }

    fn reconcile_attribute_names(&mut self, top: NodeId, node: NodeId) {
        let attributes: Vec<QName> = match self.element(node) {
            Some(element) => element.attributes.iter().map(|a| a.name.clone()).collect(),
            None => return,
        };

        for (index, name) in attributes.into_iter().enumerate() {
            let Some(uri) = name.namespace else {
                continue;
            };

            if let Some(prefix) = name.prefix.as_deref() {
                if self.lookup_namespace_uri(node, Some(prefix)) == Some(uri.as_str()) {
                    continue;
                }
            }

            let prefix = match self.lookup_prefix(node, &uri).map(str::to_string) {
                Some(prefix) => Some(prefix),
                // Attributes cannot use the default namespace
                None => {
                    let wanted = name.prefix.as_deref().unwrap_or("ns0");
                    self.bind_new_prefix(top, node, Some(wanted), &uri)
                }
            };

            if let Some(element) = self.element_mut(node) {
                element.attributes[index].name.prefix = prefix;
            }
        }
    }

    /// Declare `uri` for use at `node` and return the prefix chosen
    fn bind_new_prefix(
        &mut self,
        top: NodeId,
        node: NodeId,
        wanted: Option<&str>,
        uri: &str,
    ) -> Option<String> {
        match wanted {
            None => {
                self.declare_namespace(node, None, uri);
                None
            }
            Some(prefix) if self.lookup_namespace_uri(node, Some(prefix)).is_none() => {
                self.declare_namespace(top, Some(prefix), uri);
                Some(prefix.to_string())
            }
            Some(_) => {
                let fresh = (0..)
                    .map(|n| format!("ns{}", n))
                    .find(|candidate| self.lookup_namespace_uri(node, Some(candidate.as_str())).is_none())
                    .unwrap_or_default();
                self.declare_namespace(node, Some(&fresh), uri);
                Some(fresh)
            }
        }
    }

    fn set_element_prefix(&mut self, node: NodeId, prefix: Option<String>) {
        if let Some(element) = self.element_mut(node) {
            element.name.prefix = prefix;
        }
    }
}
