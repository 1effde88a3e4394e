use std::collections::HashMap;

use crate::scenario::graph::ScenarioGraph;
use crate::scenario::node::{Choice, Node, NodeKind};

const UNKNOWN_SPEAKER: &str = "Unknown";

/// Aggregate counts over every node, reachable or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioStats {
    pub total_nodes: usize,
    pub story: usize,
    pub dialogue: usize,
    pub choice: usize,
    pub unrecognized: usize,
    pub total_choices: usize,
    pub endings: usize,
    /// Length of all node text, in characters.
    pub text_chars: usize,
    /// Nodes per speaker, most frequent first.
    pub speakers: Vec<(String, usize)>,
}

impl ScenarioStats {
    pub fn collect(graph: &ScenarioGraph) -> Self {
        let mut stats = ScenarioStats {
            total_nodes: graph.len(),
            ..Self::default()
        };
        let mut speakers: HashMap<&str, usize> = HashMap::new();

        for (_, node) in graph.iter() {
            match &node.kind {
                NodeKind::Story { .. } => stats.story += 1,
                NodeKind::Dialogue { .. } => stats.dialogue += 1,
                NodeKind::Choice { choices } => {
                    stats.choice += 1;
                    stats.total_choices += choices.len();
                }
                NodeKind::Unrecognized { .. } => stats.unrecognized += 1,
            }
            if node.is_ending() {
                stats.endings += 1;
            }
            stats.text_chars += node.text.chars().count();
            *speakers
                .entry(node.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER))
                .or_default() += 1;
        }

        let mut speakers: Vec<(String, usize)> = speakers
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        speakers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats.speakers = speakers;
        stats
    }

    pub fn average_choices(&self) -> f64 {
        if self.choice == 0 {
            0.0
        } else {
            self.total_choices as f64 / self.choice as f64
        }
    }
}

/// A choice node together with its key, for listings.
#[derive(Debug, Clone, Copy)]
pub struct ChoicePoint<'a> {
    pub id: &'a str,
    pub node: &'a Node,
}

impl<'a> ChoicePoint<'a> {
    pub fn choices(&self) -> &'a [Choice] {
        self.node.choices()
    }
}

/// Choice nodes in document order.
pub fn choice_points(graph: &ScenarioGraph) -> Vec<ChoicePoint<'_>> {
    graph
        .iter()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Choice { .. }))
        .map(|(id, node)| ChoicePoint { id, node })
        .collect()
}

/// Ending nodes in document order.
pub fn endings(graph: &ScenarioGraph) -> Vec<(&str, &Node)> {
    graph.iter().filter(|(_, node)| node.is_ending()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ScenarioGraph {
        serde_json::from_value(json!({
            "startNode": "intro",
            "nodes": {
                "intro": {"id": "intro", "type": "story", "text": "Rain.", "next": "ask"},
                "ask": {"id": "ask", "type": "dialogue", "speaker": "Mia", "text": "Coming?", "next": "pick"},
                "pick": {"id": "pick", "type": "choice", "speaker": "Mia", "choices": [
                    {"text": "Yes", "next": "yes", "flag": "trust"},
                    {"text": "No", "next": "no"},
                    {"text": "Maybe", "next": "no"}
                ]},
                "yes": {"id": "yes", "type": "dialogue", "speaker": "Mia", "text": "Good.", "next": null},
                "no": {"id": "no", "type": "story", "text": "Alone.", "next": null},
                "odd": {"id": "odd", "type": "cutscene", "speaker": "Ren"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_stats_counts() {
        let stats = ScenarioStats::collect(&sample());
        assert_eq!(stats.total_nodes, 6);
        assert_eq!((stats.story, stats.dialogue, stats.choice), (2, 2, 1));
        assert_eq!(stats.unrecognized, 1);
        assert_eq!(stats.total_choices, 3);
        assert_eq!(stats.endings, 2);
        assert_eq!(stats.text_chars, 5 + 7 + 5 + 6);
        assert!((stats.average_choices() - 3.0).abs() < f64::EPSILON);
        assert_eq!(
            stats.speakers,
            vec![
                ("Mia".to_string(), 3),
                ("Unknown".to_string(), 2),
                ("Ren".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_average_without_choice_nodes() {
        let stats = ScenarioStats::collect(&ScenarioGraph::default());
        assert_eq!(stats.average_choices(), 0.0);
        assert!(stats.speakers.is_empty());
    }

    #[test]
    fn test_listings_keep_document_order() {
        let graph = sample();
        let points = choice_points(&graph);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "pick");
        assert_eq!(points[0].choices()[0].flag.as_deref(), Some("trust"));

        let ends: Vec<&str> = endings(&graph).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ends, vec!["yes", "no"]);
    }
}
