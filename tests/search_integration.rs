//! Integration tests for search over a file-based note store.
//!
//! These verify the caller-side search filter and snippet rendering against
//! a real SQLite file, not just in-memory databases.

use anyhow::Result;
use synapse::search::{SnippetConfig, snippet};
use synapse::{Database, NoteService};
use tempfile::tempdir;

#[test]
fn search_with_file_based_sqlite() -> Result<()> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("notes.db");

    let service = NoteService::new(Database::open(&db_path)?);

    service.create_note("Grocery run", "buy milk, eggs, and flour")?;
    service.create_note("Project notes", "milestones for the quarter")?;
    service.create_note("Recipes", "pancakes need milk and flour")?;

    let hits = service.search_notes("milk")?;
    assert_eq!(hits.len(), 2);

    // Matching is case-insensitive against title and content alike.
    let by_title = service.search_notes("PROJECT")?;
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "Project notes");

    Ok(())
}

#[test]
fn notes_persist_across_database_reopens() -> Result<()> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("notes.db");

    {
        let service = NoteService::new(Database::open(&db_path)?);
        service.create_note("Durable", "still here after reopen")?;
    }

    let service = NoteService::new(Database::open(&db_path)?);
    let hits = service.search_notes("reopen")?;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Durable");

    Ok(())
}

#[test]
fn snippets_render_for_stored_content() -> Result<()> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("notes.db");

    let service = NoteService::new(Database::open(&db_path)?);
    let long_head = "lead-in text ".repeat(10);
    service.create_note("Log", &format!("{long_head}the keyword appears here, then more trailing text follows for a while"))?;

    let note = &service.search_notes("keyword")?[0];
    let spans = snippet(&note.content, "keyword", &SnippetConfig::default())
        .expect("stored content contains the query");

    let text: String = spans.iter().map(|s| s.text.as_str()).collect();
    assert!(text.starts_with("..."));
    assert!(text.ends_with("..."));
    assert!(spans.iter().any(|s| s.highlighted && s.text == "keyword"));

    Ok(())
}

#[test]
fn empty_query_reports_every_note() -> Result<()> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("notes.db");

    let service = NoteService::new(Database::open(&db_path)?);
    service.create_note("One", "")?;
    service.create_note("Two", "")?;

    assert_eq!(service.search_notes("")?.len(), 2);

    Ok(())
}
