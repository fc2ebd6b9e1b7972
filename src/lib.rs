pub mod db;
pub mod graph;
pub mod links;
pub mod models;
pub mod search;
pub mod service;
pub mod tags;
pub mod utils;

pub use db::Database;
pub use graph::{GraphEdge, GraphNode, NodeId, NoteGraph, build_graph};
pub use links::extract_links;
pub use models::{Note, NoteBuilder, NoteId};
pub use search::{HighlightSpan, SearchMatch, SnippetConfig, match_and_highlight};
pub use service::NoteService;
pub use tags::extract_tags;
