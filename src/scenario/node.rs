use serde::Deserialize;

/// A single node in the scenario graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub struct Node {
    /// The id embedded in the node body. Should match the key it is stored under.
    pub id: Option<String>,
    pub kind: NodeKind,
    pub text: String,
    pub speaker: Option<String>,
}

/// What a node is, and therefore which edges it can have.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Story { next: Option<String> },
    Dialogue { next: Option<String> },
    Choice { choices: Vec<Choice> },
    /// Missing or unknown `type`. Kept so validation can report it.
    Unrecognized { declared: Option<String> },
}

/// A labelled edge owned by a choice node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    pub text: Option<String>,
    pub next: Option<String>,
    pub flag: Option<String>,
}

impl NodeKind {
    /// The type name as written in scenario files.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Story { .. } => "story",
            NodeKind::Dialogue { .. } => "dialogue",
            NodeKind::Choice { .. } => "choice",
            NodeKind::Unrecognized { .. } => "unknown",
        }
    }

    /// The `next` field of a story or dialogue node. `None` for the other kinds.
    pub fn linear_next(&self) -> Option<Option<&str>> {
        match self {
            NodeKind::Story { next } | NodeKind::Dialogue { next } => Some(next.as_deref()),
            _ => None,
        }
    }
}

impl Node {
    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            NodeKind::Choice { choices } => choices,
            _ => &[],
        }
    }

    /// Story/dialogue node with a null `next`.
    pub fn is_ending(&self) -> bool {
        matches!(self.kind.linear_next(), Some(None))
    }
}

// Wire shape: every field optional, `type` decides which ones matter.
#[derive(Debug, Deserialize)]
struct RawNode {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
    speaker: Option<String>,
    next: Option<String>,
    choices: Option<Vec<Choice>>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let kind = match raw.kind.as_deref() {
            Some("story") => NodeKind::Story { next: raw.next },
            Some("dialogue") => NodeKind::Dialogue { next: raw.next },
            Some("choice") => NodeKind::Choice {
                choices: raw.choices.unwrap_or_default(),
            },
            _ => NodeKind::Unrecognized { declared: raw.kind },
        };
        Node {
            id: raw.id,
            kind,
            text: raw.text.unwrap_or_default(),
            speaker: raw.speaker,
        }
    }
}
