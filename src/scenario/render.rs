//! Depth-bounded tree view of a scenario, produced lazily one line at a time.
//!
//! Each node is drawn at most once per render pass, so cyclic scenarios still
//! produce finite output. Nodes the walk never reaches are not listed; use the
//! validator for that.

use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};

use crate::scenario::graph::ScenarioGraph;
use crate::scenario::node::{Node, NodeKind};

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Nodes deeper than this are replaced by a truncation marker.
    pub max_depth: usize,
    /// Characters of node text shown per line.
    pub text_excerpt: usize,
    /// Characters of a choice label shown per line.
    pub label_excerpt: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            text_excerpt: 30,
            label_excerpt: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Node {
        id: String,
        kind: &'static str,
        speaker: Option<String>,
        excerpt: String,
    },
    Choice {
        label: String,
    },
    Truncated,
    /// An edge pointing at an id the scenario does not define.
    Missing {
        id: String,
    },
}

/// One rendered line: ancestor connectors, whether this is the last sibling, and the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub prefix: String,
    pub last: bool,
    pub entry: TreeEntry,
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeEntry::Node {
                id,
                kind,
                speaker,
                excerpt,
            } => {
                write!(f, "({kind}) [{id}]")?;
                if let Some(speaker) = speaker {
                    write!(f, " {speaker}:")?;
                }
                if !excerpt.is_empty() {
                    write!(f, " {excerpt}")?;
                }
                Ok(())
            }
            TreeEntry::Choice { label } => write!(f, "> [{label}]"),
            TreeEntry::Truncated => write!(f, "... (truncated)"),
            TreeEntry::Missing { id } => write!(f, "!! [{id}] (missing)"),
        }
    }
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connector = if self.last { "└── " } else { "├── " };
        write!(f, "{}{connector}{}", self.prefix, self.entry)
    }
}

enum Pending<'a> {
    Visit {
        id: &'a str,
        depth: usize,
        prefix: String,
        last: bool,
    },
    Label {
        label: String,
        prefix: String,
        last: bool,
    },
}

/// Pre-order walk over the scenario. Created by [`render`].
pub struct TreeLines<'a> {
    graph: &'a ScenarioGraph,
    config: RenderConfig,
    visited: HashSet<&'a str>,
    stack: Vec<Pending<'a>>,
}

/// Start a fresh render pass from `start`. Every call gets its own visited set.
pub fn render<'a>(graph: &'a ScenarioGraph, start: &'a str, config: &RenderConfig) -> TreeLines<'a> {
    debug!("Rendering tree from '{start}' (max depth {})", config.max_depth);
    TreeLines {
        graph,
        config: config.clone(),
        visited: HashSet::new(),
        stack: vec![Pending::Visit {
            id: start,
            depth: 0,
            prefix: String::new(),
            last: true,
        }],
    }
}

impl<'a> TreeLines<'a> {
    fn push_children(&mut self, node: &'a Node, depth: usize, prefix: &str, last: bool) {
        let child_prefix = format!("{prefix}{}", indent(last));

        match &node.kind {
            NodeKind::Story { next } | NodeKind::Dialogue { next } => {
                if let Some(next) = next.as_deref().filter(|n| !n.is_empty()) {
                    self.stack.push(Pending::Visit {
                        id: next,
                        depth: depth + 1,
                        prefix: child_prefix,
                        last: true,
                    });
                }
            }
            NodeKind::Choice { choices } => {
                // Pushed in reverse so each label pops right before its subtree.
                let count = choices.len();
                for (i, choice) in choices.iter().enumerate().rev() {
                    let last_choice = i + 1 == count;
                    if let Some(next) = choice.next.as_deref().filter(|n| !n.is_empty()) {
                        self.stack.push(Pending::Visit {
                            id: next,
                            depth: depth + 1,
                            prefix: format!("{child_prefix}{}", indent(last_choice)),
                            last: true,
                        });
                    }
                    self.stack.push(Pending::Label {
                        label: excerpt(
                            choice.text.as_deref().unwrap_or_default(),
                            self.config.label_excerpt,
                        ),
                        prefix: child_prefix.clone(),
                        last: last_choice,
                    });
                }
            }
            NodeKind::Unrecognized { .. } => {}
        }
    }
}

impl Iterator for TreeLines<'_> {
    type Item = TreeLine;

    fn next(&mut self) -> Option<TreeLine> {
        while let Some(pending) = self.stack.pop() {
            let (id, depth, prefix, last) = match pending {
                Pending::Label {
                    label,
                    prefix,
                    last,
                } => {
                    return Some(TreeLine {
                        prefix,
                        last,
                        entry: TreeEntry::Choice { label },
                    })
                }
                Pending::Visit {
                    id,
                    depth,
                    prefix,
                    last,
                } => (id, depth, prefix, last),
            };

            if depth > self.config.max_depth {
                return Some(TreeLine {
                    prefix,
                    last,
                    entry: TreeEntry::Truncated,
                });
            }
            if !self.visited.insert(id) {
                trace!("'{id}' already drawn, not descending again");
                continue;
            }
            let graph = self.graph;
            let Some(node) = graph.get(id) else {
                return Some(TreeLine {
                    prefix,
                    last,
                    entry: TreeEntry::Missing { id: id.into() },
                });
            };

            self.push_children(node, depth, &prefix, last);
            return Some(TreeLine {
                prefix,
                last,
                entry: TreeEntry::Node {
                    id: id.into(),
                    kind: node.kind.name(),
                    speaker: node.speaker.clone().filter(|s| !s.is_empty()),
                    excerpt: excerpt(&node.text, self.config.text_excerpt),
                },
            });
        }
        None
    }
}

fn indent(last: bool) -> &'static str {
    if last {
        "    "
    } else {
        "│   "
    }
}

/// First `limit` characters of `text` on a single line, with `...` when cut.
pub fn excerpt(text: &str, limit: usize) -> String {
    let mut chars = text.chars().map(|c| if c == '\n' { ' ' } else { c });
    let mut out: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn graph(value: Value) -> ScenarioGraph {
        serde_json::from_value(value).unwrap()
    }

    fn draw(graph: &ScenarioGraph, start: &str, max_depth: usize) -> String {
        let config = RenderConfig {
            max_depth,
            ..RenderConfig::default()
        };
        render(graph, start, &config)
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_choice_branches_in_order() {
        let g = graph(json!({
            "startNode": "C",
            "nodes": {
                "C": {"id": "C", "type": "choice", "text": "What now?", "choices": [
                    {"text": "Stay", "next": "E1"},
                    {"text": "Leave", "next": "E2"}
                ]},
                "E1": {"id": "E1", "type": "story", "text": "You stay.", "next": null},
                "E2": {"id": "E2", "type": "dialogue", "speaker": "Mia", "text": "Bye.", "next": null}
            }
        }));
        let expected = "\
└── (choice) [C] What now?
    ├── > [Stay]
    │   └── (story) [E1] You stay.
    └── > [Leave]
        └── (dialogue) [E2] Mia: Bye.";
        assert_eq!(draw(&g, "C", 3), expected);
    }

    #[test]
    fn test_depth_limit_truncates() {
        let g = graph(json!({
            "startNode": "A",
            "nodes": {
                "A": {"id": "A", "type": "story", "text": "a", "next": "B"},
                "B": {"id": "B", "type": "story", "text": "b", "next": "C"},
                "C": {"id": "C", "type": "story", "text": "c", "next": "D"},
                "D": {"id": "D", "type": "story", "text": "d", "next": null}
            }
        }));
        let expected = "\
└── (story) [A] a
    └── (story) [B] b
        └── (story) [C] c
            └── ... (truncated)";
        assert_eq!(draw(&g, "A", 2), expected);
    }

    #[test]
    fn test_self_loop_is_drawn_once() {
        let g = graph(json!({
            "startNode": "A",
            "nodes": {"A": {"id": "A", "type": "story", "text": "again", "next": "A"}}
        }));
        assert_eq!(draw(&g, "A", 10), "└── (story) [A] again");
    }

    #[test]
    fn test_shared_target_is_not_repeated() {
        let g = graph(json!({
            "startNode": "C",
            "nodes": {
                "C": {"id": "C", "type": "choice", "choices": [
                    {"text": "one", "next": "E"},
                    {"text": "two", "next": "E"}
                ]},
                "E": {"id": "E", "type": "story", "next": null}
            }
        }));
        let expected = "\
└── (choice) [C]
    ├── > [one]
    │   └── (story) [E]
    └── > [two]";
        assert_eq!(draw(&g, "C", 3), expected);
    }

    #[test]
    fn test_dangling_edge_gets_marker() {
        let g = graph(json!({
            "startNode": "A",
            "nodes": {"A": {"id": "A", "type": "story", "text": "x", "next": "ghost"}}
        }));
        let lines: Vec<TreeLine> = render(&g, "A", &RenderConfig::default()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1].entry,
            TreeEntry::Missing {
                id: "ghost".into()
            }
        );
        assert_eq!(lines[1].to_string(), "    └── !! [ghost] (missing)");
    }

    #[test]
    fn test_render_is_restartable() {
        let g = graph(json!({
            "startNode": "A",
            "nodes": {
                "A": {"id": "A", "type": "story", "next": "B"},
                "B": {"id": "B", "type": "story", "next": "A"}
            }
        }));
        assert_eq!(draw(&g, "A", 5), draw(&g, "A", 5));
        assert_eq!(render(&g, "A", &RenderConfig::default()).count(), 2);
    }

    #[test]
    fn test_excerpt_counts_chars() {
        assert_eq!(excerpt("short", 30), "short");
        assert_eq!(excerpt("line one\nline two", 8), "line one...");
        assert_eq!(excerpt("こんにちは世界", 5), "こんにちは...");
    }
}
