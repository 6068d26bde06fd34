use indextree::NodeId;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::parser::tree::Ast;
use crate::parser::types::{AstNode, Meta, Span};

#[derive(Debug, Clone, Serialize)]
struct SerializableNode<'a> {
    kind: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a Meta>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<SerializableNode<'a>>>,
}

impl<'a> SerializableNode<'a> {
    fn leaf(data: &'a AstNode) -> Self {
        Self {
            kind: &data.kind,
            anonymous: !data.named,
            field: data.field.as_deref(),
            span: data.span,
            text: data.text.as_deref(),
            meta: data.meta.as_ref(),
            error: data.error,
            children: None,
        }
    }
}

impl Ast {
    pub fn to_nested_json(&self) -> Value {
        match self.root() {
            Some(root_id) => match self.node_to_serializable(root_id) {
                Some(node) => serde_json::to_value(node).unwrap_or(Value::Null),
                None => Value::Null,
            },
            None => Value::Null,
        }
    }

    fn node_to_serializable(&self, node_id: NodeId) -> Option<SerializableNode<'_>> {
        let data = self.get_node(node_id)?;
        let child_ids = self.get_children(node_id);

        let mut node = SerializableNode::leaf(data);
        if !child_ids.is_empty() {
            node.children = Some(
                child_ids
                    .into_iter()
                    .filter_map(|child_id| self.node_to_serializable(child_id))
                    .collect(),
            );
        }
        Some(node)
    }
}

impl Serialize for Ast {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.root() {
            Some(root_id) => self.node_to_serializable(root_id).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}
