//! Note-graph derivation.
//!
//! Builds the `{nodes, links}` structure the graph view renders: one real
//! node per note, one ghost node per referenced-but-missing title, and a
//! directed edge for every unique link a note's content makes. The graph is
//! derived fresh from whatever note slice the caller hands in — typically
//! the currently visible (search- or tag-filtered) collection — and nothing
//! is cached between calls.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::links::extract_links;
use crate::models::{Note, NoteId};
use crate::tags::extract_tags;

/// Visual weight of a node backed by a real note.
const REAL_NODE_WEIGHT: f64 = 1.0;
/// Visual weight of a ghost node.
const GHOST_NODE_WEIGHT: f64 = 0.5;

/// Identity of a graph node.
///
/// Real nodes carry the id of an existing note. Ghost nodes stand in for a
/// link target with no matching note and are keyed by the trimmed target
/// title, so the same title always derives the same ghost id across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// A node backed by a stored note.
    Real(NoteId),
    /// A node synthesized for an unresolved link title.
    Ghost(String),
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NodeId::Real(id) => serializer.serialize_i64(id.get()),
            NodeId::Ghost(title) => serializer.serialize_str(&format!("ghost-{title}")),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Real(id) => write!(f, "{id}"),
            NodeId::Ghost(title) => write!(f, "ghost-{title}"),
        }
    }
}

/// A node in the derived note graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    /// Display title; `"Untitled"` when the note's title is empty.
    pub name: String,
    /// True when no note exists with the referenced title.
    pub is_ghost: bool,
    /// Relative visual weight. A rendering hint only, never an invariant.
    pub val: f64,
    /// First tag (by occurrence) in the note's content, used for visual
    /// clustering. Absent for ghost nodes and untagged notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A directed edge from the note containing a link to its target node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// The derived graph handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

/// Derives the note graph from the given notes.
///
/// Every note becomes a real node whose `group` is the first tag extracted
/// from its content, if any. Each unique `[[Title]]` link in a note's
/// content becomes a directed edge to the note whose trimmed title equals
/// the trimmed link text exactly (case-sensitively), or to a ghost node
/// created at most once per distinct unresolved title. A note linking to
/// its own title produces a self-loop edge.
///
/// Title uniqueness is not enforced by the store. When two notes share a
/// trimmed title, the one appearing later in `notes` wins resolution.
///
/// # Examples
///
/// ```
/// use synapse::{NoteBuilder, NoteId, build_graph};
///
/// let notes = vec![
///     NoteBuilder::new().id(NoteId::new(1)).title("A").content("[[B]] and [[Ghost]]").build(),
///     NoteBuilder::new().id(NoteId::new(2)).title("B").build(),
/// ];
///
/// let graph = build_graph(&notes);
/// assert_eq!(graph.nodes.len(), 3); // two real, one ghost
/// assert_eq!(graph.links.len(), 2);
/// ```
pub fn build_graph(notes: &[Note]) -> NoteGraph {
    let mut nodes = Vec::new();
    let mut links = Vec::new();

    let mut title_to_id: HashMap<String, NoteId> = HashMap::new();

    for note in notes {
        let group = extract_tags(&note.content).into_iter().next();

        let name = if note.title.is_empty() {
            "Untitled".to_string()
        } else {
            note.title.clone()
        };

        nodes.push(GraphNode {
            id: NodeId::Real(note.id),
            name,
            is_ghost: false,
            val: REAL_NODE_WEIGHT,
            group,
        });

        let trimmed = note.title.trim();
        if !trimmed.is_empty() {
            title_to_id.insert(trimmed.to_string(), note.id);
        }
    }

    // Ghost dedup is scoped to this call; ids derive from the title alone,
    // so repeated runs over the same input produce identical graphs.
    let mut ghost_titles: HashSet<String> = HashSet::new();

    for note in notes {
        if note.content.is_empty() {
            continue;
        }

        for target in extract_links(&note.content) {
            match title_to_id.get(&target) {
                Some(&target_id) => links.push(GraphEdge {
                    source: NodeId::Real(note.id),
                    target: NodeId::Real(target_id),
                }),
                None => {
                    if ghost_titles.insert(target.clone()) {
                        nodes.push(GraphNode {
                            id: NodeId::Ghost(target.clone()),
                            name: target.clone(),
                            is_ghost: true,
                            val: GHOST_NODE_WEIGHT,
                            group: None,
                        });
                    }
                    links.push(GraphEdge {
                        source: NodeId::Real(note.id),
                        target: NodeId::Ghost(target),
                    });
                }
            }
        }
    }

    NoteGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use crate::models::NoteBuilder;

    use super::*;

    fn note(id: i64, title: &str, content: &str) -> Note {
        NoteBuilder::new()
            .id(NoteId::new(id))
            .title(title)
            .content(content)
            .build()
    }

    #[test]
    fn empty_collection_yields_empty_graph() {
        let graph = build_graph(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn resolved_link_creates_edge_between_real_nodes() {
        let notes = vec![note(1, "A", "[[B]]"), note(2, "B", "")];
        let graph = build_graph(&notes);

        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.nodes.iter().all(|n| !n.is_ghost));
        assert_eq!(
            graph.links,
            vec![GraphEdge {
                source: NodeId::Real(NoteId::new(1)),
                target: NodeId::Real(NoteId::new(2)),
            }]
        );
    }

    #[test]
    fn unresolved_link_creates_ghost_node() {
        let notes = vec![note(1, "A", "[[Ghost]]")];
        let graph = build_graph(&notes);

        assert_eq!(graph.nodes.len(), 2);
        let ghost = graph.nodes.iter().find(|n| n.is_ghost).expect("ghost node");
        assert_eq!(ghost.id, NodeId::Ghost("Ghost".to_string()));
        assert_eq!(ghost.name, "Ghost");
        assert_eq!(ghost.val, 0.5);
        assert_eq!(ghost.group, None);
        assert_eq!(
            graph.links,
            vec![GraphEdge {
                source: NodeId::Real(NoteId::new(1)),
                target: NodeId::Ghost("Ghost".to_string()),
            }]
        );
    }

    #[test]
    fn ghost_ids_are_stable_across_runs() {
        let notes = vec![note(1, "A", "[[Ghost]]")];

        let first = build_graph(&notes);
        let second = build_graph(&notes);

        assert_eq!(first, second);
    }

    #[test]
    fn ghost_node_is_created_once_per_distinct_title() {
        let notes = vec![
            note(1, "A", "[[Ghost]] twice [[Ghost]]"),
            note(2, "B", "also [[Ghost]]"),
        ];
        let graph = build_graph(&notes);

        let ghosts: Vec<_> = graph.nodes.iter().filter(|n| n.is_ghost).collect();
        assert_eq!(ghosts.len(), 1);
        // One edge per source note: link extraction dedups within a note.
        assert_eq!(graph.links.len(), 2);
    }

    #[test]
    fn link_resolution_matches_trimmed_titles_exactly() {
        let notes = vec![note(1, "A", "[[ B ]]"), note(2, " B ", "")];
        let graph = build_graph(&notes);

        assert!(graph.nodes.iter().all(|n| !n.is_ghost));
        assert_eq!(
            graph.links,
            vec![GraphEdge {
                source: NodeId::Real(NoteId::new(1)),
                target: NodeId::Real(NoteId::new(2)),
            }]
        );
    }

    #[test]
    fn resolution_is_case_sensitive() {
        let notes = vec![note(1, "A", "[[b]]"), note(2, "B", "")];
        let graph = build_graph(&notes);

        assert!(graph.nodes.iter().any(|n| n.is_ghost));
    }

    #[test]
    fn self_link_produces_self_loop_edge() {
        let notes = vec![note(1, "Loop", "I reference [[Loop]]")];
        let graph = build_graph(&notes);

        assert_eq!(
            graph.links,
            vec![GraphEdge {
                source: NodeId::Real(NoteId::new(1)),
                target: NodeId::Real(NoteId::new(1)),
            }]
        );
    }

    #[test]
    fn group_is_first_tag_in_occurrence_order() {
        let notes = vec![note(1, "A", "text #second-mentioned-first #other")];
        let graph = build_graph(&notes);

        assert_eq!(
            graph.nodes[0].group,
            Some("#second-mentioned-first".to_string())
        );
    }

    #[test]
    fn untagged_note_has_no_group() {
        let graph = build_graph(&[note(1, "A", "no tags here")]);
        assert_eq!(graph.nodes[0].group, None);
    }

    #[test]
    fn empty_title_falls_back_to_untitled() {
        let graph = build_graph(&[note(1, "", "body")]);
        assert_eq!(graph.nodes[0].name, "Untitled");
    }

    #[test]
    fn empty_titled_note_is_never_a_link_target() {
        // The whitespace-only title trims to "", which is never registered,
        // so the [[ ]] link (trimming to "") resolves to a ghost.
        let notes = vec![note(1, "A", "[[ ]]"), note(2, "  ", "")];
        let graph = build_graph(&notes);

        assert!(graph.nodes.iter().any(|n| n.is_ghost));
    }

    #[test]
    fn duplicate_titles_resolve_to_the_later_note() {
        // Title uniqueness is a store-level convention the core does not
        // enforce; resolution is last-registered-wins.
        let notes = vec![
            note(1, "Dup", ""),
            note(2, "Dup", ""),
            note(3, "Src", "[[Dup]]"),
        ];
        let graph = build_graph(&notes);

        assert_eq!(
            graph.links,
            vec![GraphEdge {
                source: NodeId::Real(NoteId::new(3)),
                target: NodeId::Real(NoteId::new(2)),
            }]
        );
    }

    #[test]
    fn real_node_weighs_twice_a_ghost_node() {
        let graph = build_graph(&[note(1, "A", "[[Missing]]")]);

        let real = graph.nodes.iter().find(|n| !n.is_ghost).unwrap();
        let ghost = graph.nodes.iter().find(|n| n.is_ghost).unwrap();
        assert_eq!(real.val, 1.0);
        assert_eq!(ghost.val, 0.5);
    }

    #[test]
    fn graph_serializes_in_renderer_wire_shape() {
        let notes = vec![note(1, "A", "#alpha [[Missing]]")];
        let value = serde_json::to_value(build_graph(&notes)).unwrap();

        assert_eq!(value["nodes"][0]["id"], 1);
        assert_eq!(value["nodes"][0]["isGhost"], false);
        assert_eq!(value["nodes"][0]["group"], "#alpha");
        assert_eq!(value["nodes"][1]["id"], "ghost-Missing");
        assert_eq!(value["links"][0]["source"], 1);
        assert_eq!(value["links"][0]["target"], "ghost-Missing");
    }
}
