//! Structural checks over a scenario graph.
//!
//! Every rule runs to completion and issues are collected rather than raised, so an
//! author sees all problems from one pass. Unreachable nodes are reported as warnings
//! and never flip [`ValidationReport::is_ok`].

use std::collections::{BTreeSet, HashSet};

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::scenario::graph::ScenarioGraph;
use crate::scenario::node::{Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    #[error("start node (startNode) is not defined")]
    MissingStartNode,

    #[error("start node '{id}' does not exist")]
    InvalidStartNode { id: String },

    #[error("node '{key}' has mismatched id: {}", display_opt(.found))]
    IdMismatch { key: String, found: Option<String> },

    #[error("node '{node}' has invalid type: {}", display_opt(.found))]
    InvalidType { node: String, found: Option<String> },

    #[error("node '{node}'{} references missing node '{target}'", choice_suffix(.choice))]
    DanglingReference {
        node: String,
        /// 1-based choice index, when the edge belongs to a choice.
        choice: Option<usize>,
        target: String,
    },

    #[error("choice node '{node}' has no choices")]
    EmptyChoiceSet { node: String },

    #[error("node '{node}' choice {index} has no text")]
    MissingChoiceText { node: String, index: usize },

    #[error("node '{node}' choice {index} has no next node")]
    MissingChoiceNext { node: String, index: usize },

    #[error("no ending nodes found (story/dialogue node with null next)")]
    NoEndingNodes,

    #[error("node '{node}' is unreachable from the start node")]
    UnreachableNode { node: String },
}

fn display_opt(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{v}'"),
        None => "(none)".to_string(),
    }
}

fn choice_suffix(choice: &Option<usize>) -> String {
    choice.map(|i| format!(" choice {i}")).unwrap_or_default()
}

impl Issue {
    pub fn is_warning(&self) -> bool {
        matches!(self, Issue::UnreachableNode { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    /// Ids reachable from the start node. Empty when the start node is missing.
    pub reachable: BTreeSet<String>,
    /// Ending node ids in document order.
    pub endings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors followed by warnings.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> + '_ {
        self.errors.iter().chain(self.warnings.iter())
    }
}

pub fn validate(graph: &ScenarioGraph) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_start_node(graph, &mut report.errors);

    for (key, node) in graph.iter() {
        check_node(graph, key, node, &mut report.errors);
    }

    report.endings = graph.ending_ids().into_iter().map(String::from).collect();
    if report.endings.is_empty() {
        report.errors.push(Issue::NoEndingNodes);
    }

    if let Some(start) = graph.start_node_id().filter(|id| graph.contains(id)) {
        let reachable = reachable_from(graph, start);
        let mut dead: Vec<&str> = graph
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !reachable.contains(key))
            .collect();
        dead.sort_unstable();
        report.warnings = dead
            .into_iter()
            .map(|node| Issue::UnreachableNode { node: node.into() })
            .collect();
        report.reachable = reachable.into_iter().map(String::from).collect();
    } else {
        debug!("Skipping reachability: no usable start node");
    }

    info!(
        "Validation finished: {} errors, {} warnings, {}/{} nodes reachable",
        report.errors.len(),
        report.warnings.len(),
        report.reachable.len(),
        graph.len()
    );
    report
}

fn check_start_node(graph: &ScenarioGraph, errors: &mut Vec<Issue>) {
    match graph.start_node_id() {
        None => errors.push(Issue::MissingStartNode),
        Some(id) if !graph.contains(id) => {
            errors.push(Issue::InvalidStartNode { id: id.into() })
        }
        Some(_) => {}
    }
}

fn check_node(graph: &ScenarioGraph, key: &str, node: &Node, errors: &mut Vec<Issue>) {
    if node.id.as_deref() != Some(key) {
        errors.push(Issue::IdMismatch {
            key: key.into(),
            found: node.id.clone(),
        });
    }

    match &node.kind {
        NodeKind::Story { next } | NodeKind::Dialogue { next } => {
            if let Some(target) = next.as_deref().filter(|t| !t.is_empty()) {
                if !graph.contains(target) {
                    errors.push(Issue::DanglingReference {
                        node: key.into(),
                        choice: None,
                        target: target.into(),
                    });
                }
            }
        }
        NodeKind::Choice { choices } => {
            if choices.is_empty() {
                errors.push(Issue::EmptyChoiceSet { node: key.into() });
            }
            for (index, choice) in (1..).zip(choices) {
                match choice.next.as_deref().filter(|t| !t.is_empty()) {
                    None => errors.push(Issue::MissingChoiceNext {
                        node: key.into(),
                        index,
                    }),
                    Some(target) if !graph.contains(target) => {
                        errors.push(Issue::DanglingReference {
                            node: key.into(),
                            choice: Some(index),
                            target: target.into(),
                        })
                    }
                    Some(_) => {}
                }
                if choice.text.as_deref().map_or(true, str::is_empty) {
                    errors.push(Issue::MissingChoiceText {
                        node: key.into(),
                        index,
                    });
                }
            }
        }
        NodeKind::Unrecognized { declared } => errors.push(Issue::InvalidType {
            node: key.into(),
            found: declared.clone(),
        }),
    }
}

/// Ids reachable from `start` by following every edge. Dangling targets are not included.
pub fn reachable_from<'a>(graph: &'a ScenarioGraph, start: &'a str) -> HashSet<&'a str> {
    let mut visited = HashSet::new();
    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        if !visited.insert(id) {
            continue;
        }
        // Reversed so choices are explored in their listed order.
        stack.extend(graph.successors(node).into_iter().rev());
    }

    visited
}
