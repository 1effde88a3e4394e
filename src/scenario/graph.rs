use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::scenario::node::{Node, NodeKind};

/// The full scenario: a map of node-id -> Node, plus where the story begins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "RawScenario")]
pub struct ScenarioGraph {
    nodes: HashMap<String, Node>,
    /// Node ids in document order.
    order: Vec<String>,
    start_node_id: Option<String>,
    metadata: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScenario {
    #[serde(default)]
    nodes: Map<String, Value>,
    start_node: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl TryFrom<RawScenario> for ScenarioGraph {
    type Error = serde_json::Error;

    fn try_from(raw: RawScenario) -> Result<Self, Self::Error> {
        let mut graph = ScenarioGraph::new(raw.start_node);
        graph.metadata = raw.metadata;
        for (key, value) in raw.nodes {
            let node: Node = serde_json::from_value(value).map_err(|e| {
                <serde_json::Error as serde::de::Error>::custom(format!("node '{key}': {e}"))
            })?;
            graph.insert(key, node);
        }
        Ok(graph)
    }
}

impl ScenarioGraph {
    pub fn new(start_node_id: Option<String>) -> Self {
        Self {
            start_node_id,
            ..Self::default()
        }
    }

    /// Add a node under `key`. A repeated key replaces the earlier node but keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        if self.nodes.insert(key.clone(), node).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The declared start id, if any. An empty string counts as undeclared.
    pub fn start_node_id(&self) -> Option<&str> {
        self.start_node_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn start_node(&self) -> Option<&Node> {
        self.start_node_id().and_then(|id| self.get(id))
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// `(key, node)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.nodes.get(key).map(|node| (key.as_str(), node)))
    }

    /// Edge targets leaving `node`, in choice order. Empty targets are skipped.
    pub fn successors<'a>(&self, node: &'a Node) -> Vec<&'a str> {
        let targets: Vec<&'a str> = match &node.kind {
            NodeKind::Story { next } | NodeKind::Dialogue { next } => {
                next.as_deref().into_iter().collect()
            }
            NodeKind::Choice { choices } => {
                choices.iter().filter_map(|c| c.next.as_deref()).collect()
            }
            NodeKind::Unrecognized { .. } => Vec::new(),
        };
        targets.into_iter().filter(|t| !t.is_empty()).collect()
    }

    /// Keys of ending nodes, in document order.
    pub fn ending_ids(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.is_ending())
            .map(|(key, _)| key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph(value: Value) -> ScenarioGraph {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_document_order_is_kept() {
        let g = graph(json!({
            "startNode": "z",
            "nodes": {
                "z": {"id": "z", "type": "story", "next": "a"},
                "a": {"id": "a", "type": "story", "next": "m"},
                "m": {"id": "m", "type": "story", "next": null}
            }
        }));
        let keys: Vec<&str> = g.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(g.ending_ids(), vec!["m"]);
        assert_eq!(g.start_node().and_then(|n| n.id.as_deref()), Some("z"));
    }

    #[test]
    fn test_successors_follow_node_kind() {
        let g = graph(json!({
            "startNode": "c",
            "nodes": {
                "c": {"id": "c", "type": "choice", "choices": [
                    {"text": "left", "next": "l"},
                    {"text": "nowhere", "next": ""},
                    {"text": "right", "next": "r"}
                ]},
                "l": {"id": "l", "type": "dialogue", "next": "r"},
                "r": {"id": "r", "type": "story", "next": null},
                "x": {"id": "x", "type": "mystery", "next": "r"}
            }
        }));
        let succ = |id: &str| g.successors(g.get(id).unwrap());
        assert_eq!(succ("c"), vec!["l", "r"]);
        assert_eq!(succ("l"), vec!["r"]);
        assert!(succ("r").is_empty());
        assert!(succ("x").is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let g = graph(json!({}));
        assert!(g.is_empty());
        assert_eq!(g.start_node_id(), None);
        assert!(g.metadata().is_empty());

        let g = graph(json!({"startNode": "", "nodes": {}}));
        assert_eq!(g.start_node_id(), None);
    }

    #[test]
    fn test_malformed_node_names_the_key() {
        let err = serde_json::from_value::<ScenarioGraph>(json!({
            "startNode": "a",
            "nodes": {"a": {"id": "a", "type": "story", "next": 7}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("node 'a'"));
    }
}
