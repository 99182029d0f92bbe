// ids.rs — Identifier index and signature element lookup
//
// XML-DSig references such as URI="#payload" are resolved by identifier,
// not by position, and may target any element of the document. The index
// therefore covers every element carrying one of the configured identifier
// attributes. The parsed tree itself is never modified.

use roxmltree::{Document, Node, NodeId};
use std::collections::HashMap;

use crate::error::{HarnessError, HarnessResult};

pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const SIGNATURE_TAG: &str = "Signature";

/// Compiled "every element with an identifier attribute" query.
///
/// Attribute names are tried in order; the first one present on an element
/// supplies its identifier.
#[derive(Debug, Clone)]
pub struct IdQuery {
    attributes: Vec<String>,
}

impl IdQuery {
    pub fn compile(attributes: &[String]) -> HarnessResult<Self> {
        if attributes.is_empty() {
            return Err(HarnessError::QueryCompilation(
                "no identifier attributes configured".to_string(),
            ));
        }
        for name in attributes {
            if name.is_empty()
                || name
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, ':' | '=' | '"' | '\'' | '<' | '>'))
            {
                return Err(HarnessError::QueryCompilation(format!(
                    "invalid attribute name {:?}",
                    name
                )));
            }
        }
        Ok(IdQuery {
            attributes: attributes.to_vec(),
        })
    }

    /// Identifier of `node`, if it carries one of the attributes.
    pub fn identifier<'a>(&self, node: Node<'a, '_>) -> Option<&'a str> {
        self.attributes
            .iter()
            .find_map(|name| node.attribute(name.as_str()))
    }
}

/// Identifier value to element, for every identified element of a document.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    ids: HashMap<String, NodeId>,
}

impl IdIndex {
    /// Index every element of `doc`.
    ///
    /// Two elements sharing an identifier make references ambiguous and fail
    /// with `IdentifierResolution`.
    pub fn build(doc: &Document<'_>, query: &IdQuery) -> HarnessResult<Self> {
        let mut ids = HashMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            let Some(id) = query.identifier(node) else {
                continue;
            };
            if ids.insert(id.to_string(), node.id()).is_some() {
                return Err(HarnessError::IdentifierResolution(format!(
                    "duplicate identifier {:?}",
                    id
                )));
            }
        }
        Ok(IdIndex { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn resolve<'a, 'input>(
        &self,
        doc: &'a Document<'input>,
        id: &str,
    ) -> Option<Node<'a, 'input>> {
        self.get(id).and_then(|node_id| doc.get_node(node_id))
    }

    /// Resolve a same-document reference URI (`#id`).
    pub fn resolve_uri<'a, 'input>(
        &self,
        doc: &'a Document<'input>,
        uri: &str,
    ) -> Option<Node<'a, 'input>> {
        uri.strip_prefix('#').and_then(|id| self.resolve(doc, id))
    }
}

/// First `ds:Signature` element in document order.
pub fn locate_signature<'a, 'input>(doc: &'a Document<'input>) -> HarnessResult<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| {
            n.is_element()
                && n.tag_name().name() == SIGNATURE_TAG
                && n.tag_name().namespace() == Some(XMLDSIG_NS)
        })
        .ok_or(HarnessError::SignatureElementMissing)
}
