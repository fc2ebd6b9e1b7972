use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use time::format_description::well_known::Rfc3339;

use synapse::search::{self, HighlightSpan, SnippetConfig};
use synapse::utils::{ensure_database_directory, get_database_path};
use synapse::{Database, NoteId, NoteService, build_graph, extract_tags};

/// synapse - wiki-linked personal notes with a derived knowledge graph
#[derive(Parser)]
#[command(name = "synapse")]
#[command(about = "Plain-text notes connected by [[links]] and #tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Add a new note
    Add(AddCommand),
    /// Show a note with its backlinks
    Show(ShowCommand),
    /// List all notes, most recently updated first
    List,
    /// Update a note's title and/or content
    Update(UpdateCommand),
    /// Delete a note
    Delete(DeleteCommand),
    /// Search notes and print highlighted snippets
    Search(SearchCommand),
    /// Print the tag cloud
    Tags,
    /// List the notes linking to a note
    Backlinks(BacklinksCommand),
    /// Print the derived note graph as JSON
    Graph(GraphCommand),
}

/// Add a new note
#[derive(Parser)]
struct AddCommand {
    /// The title of the note
    #[arg(value_name = "TITLE")]
    title: String,

    /// The content of the note
    #[arg(value_name = "CONTENT", default_value = "")]
    content: String,
}

/// Show a single note
#[derive(Parser)]
struct ShowCommand {
    /// The id of the note to show
    #[arg(value_name = "ID")]
    id: i64,
}

/// Update an existing note
#[derive(Parser)]
struct UpdateCommand {
    /// The id of the note to update
    #[arg(value_name = "ID")]
    id: i64,

    /// New title for the note
    #[arg(short, long, value_name = "TITLE")]
    title: Option<String>,

    /// New content for the note
    #[arg(short, long, value_name = "CONTENT")]
    content: Option<String>,
}

/// Delete a note
#[derive(Parser)]
struct DeleteCommand {
    /// The id of the note to delete
    #[arg(value_name = "ID")]
    id: i64,
}

/// Search notes
#[derive(Parser)]
struct SearchCommand {
    /// Substring to search for in titles and content
    #[arg(value_name = "QUERY")]
    query: String,
}

/// List backlinks of a note
#[derive(Parser)]
struct BacklinksCommand {
    /// The id of the note whose backlinks to list
    #[arg(value_name = "ID")]
    id: i64,
}

/// Print the derived graph
#[derive(Parser)]
struct GraphCommand {
    /// Restrict the graph to notes matching this search query
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// Restrict the graph to notes carrying this tag (include the leading #)
    #[arg(short, long, value_name = "TAG")]
    tag: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Add(cmd) => handle_add(cmd),
        Commands::Show(cmd) => with_database(|db| execute_show(cmd.id, db)),
        Commands::List => with_database(execute_list),
        Commands::Update(cmd) => handle_update(cmd),
        Commands::Delete(cmd) => with_database(|db| execute_delete(cmd.id, db)),
        Commands::Search(cmd) => with_database(|db| execute_search(&cmd.query, db)),
        Commands::Tags => with_database(execute_tags),
        Commands::Backlinks(cmd) => with_database(|db| execute_backlinks(cmd.id, db)),
        Commands::Graph(cmd) => with_database(|db| execute_graph(cmd, db)),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures and references to missing notes.
/// Internal errors include database failures and I/O errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = error.to_string();
    error_msg.contains("cannot both be empty")
        || error_msg.contains("No note found")
        || error_msg.contains("nothing to update")
}

/// Opens the default database and runs the given command body against it.
fn with_database(f: impl FnOnce(Database) -> Result<()>) -> Result<()> {
    let db_path = get_database_path()?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    f(db)
}

/// Handles the add command by creating a new note.
fn handle_add(cmd: &AddCommand) -> Result<()> {
    // A note needs at least a title or some content
    if cmd.title.trim().is_empty() && cmd.content.trim().is_empty() {
        anyhow::bail!("Note title and content cannot both be empty");
    }

    with_database(|db| execute_add(&cmd.title, &cmd.content, db))
}

/// Executes the add command logic with a provided database.
///
/// This function is separated from `handle_add` to allow testing with
/// in-memory databases.
fn execute_add(title: &str, content: &str, db: Database) -> Result<()> {
    let service = NoteService::new(db);

    let note = service
        .create_note(title, content)
        .context("Failed to create note")?;

    println!("Note created (id: {})", note.id);

    Ok(())
}

fn execute_show(id: i64, db: Database) -> Result<()> {
    let service = NoteService::new(db);

    let note = service
        .get_note(NoteId::new(id))?
        .ok_or_else(|| anyhow::anyhow!("No note found with id {id}"))?;

    println!("{}  {}", note.id, display_title(&note.title));
    println!("created: {}", note.created_at.format(&Rfc3339)?);
    println!("updated: {}", note.updated_at.format(&Rfc3339)?);
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }

    let backlinks = service.backlinks(note.id)?;
    if !backlinks.is_empty() {
        println!();
        println!("Linked from:");
        for backlink in backlinks {
            println!("  {}  {}", backlink.id, display_title(&backlink.title));
        }
    }

    Ok(())
}

fn execute_list(db: Database) -> Result<()> {
    let service = NoteService::new(db);

    for note in service.list_notes()? {
        println!("{}  {}", note.id, display_title(&note.title));
    }

    Ok(())
}

fn handle_update(cmd: &UpdateCommand) -> Result<()> {
    if cmd.title.is_none() && cmd.content.is_none() {
        anyhow::bail!("nothing to update: pass --title and/or --content");
    }

    with_database(|db| execute_update(cmd, db))
}

fn execute_update(cmd: &UpdateCommand, db: Database) -> Result<()> {
    let service = NoteService::new(db);
    let id = NoteId::new(cmd.id);

    let note = service
        .get_note(id)?
        .ok_or_else(|| anyhow::anyhow!("No note found with id {}", cmd.id))?;

    // Fields not passed on the command line keep their current value
    let title = cmd.title.as_deref().unwrap_or(&note.title);
    let content = cmd.content.as_deref().unwrap_or(&note.content);

    service
        .update_note(id, title, content)
        .context("Failed to update note")?;

    println!("Note updated (id: {})", cmd.id);

    Ok(())
}

fn execute_delete(id: i64, db: Database) -> Result<()> {
    let service = NoteService::new(db);

    service
        .get_note(NoteId::new(id))?
        .ok_or_else(|| anyhow::anyhow!("No note found with id {id}"))?;

    service.delete_note(NoteId::new(id))?;

    println!("Note deleted (id: {id})");

    Ok(())
}

fn execute_search(query: &str, db: Database) -> Result<()> {
    let service = NoteService::new(db);
    let config = SnippetConfig::from_env();

    let hits = service.search_notes(query)?;
    if hits.is_empty() {
        println!("No matching notes");
        return Ok(());
    }

    for note in hits {
        let title = if note.title.is_empty() {
            "Untitled".to_string()
        } else {
            render_spans(&search::highlight(&note.title, query))
        };
        println!("{}  {}", note.id, title);

        if let Some(spans) = search::snippet(&note.content, query, &config) {
            println!("    {}", render_spans(&spans));
        }
    }

    Ok(())
}

fn execute_tags(db: Database) -> Result<()> {
    let service = NoteService::new(db);

    for tag in service.tag_cloud()? {
        println!("{tag}");
    }

    Ok(())
}

fn execute_backlinks(id: i64, db: Database) -> Result<()> {
    let service = NoteService::new(db);

    service
        .get_note(NoteId::new(id))?
        .ok_or_else(|| anyhow::anyhow!("No note found with id {id}"))?;

    for note in service.backlinks(NoteId::new(id))? {
        println!("{}  {}", note.id, display_title(&note.title));
    }

    Ok(())
}

fn execute_graph(cmd: &GraphCommand, db: Database) -> Result<()> {
    let service = NoteService::new(db);

    // The graph is derived over the visible set: search and tag filters
    // narrow the collection before derivation, matching the graph view.
    let mut notes = match &cmd.query {
        Some(query) => service.search_notes(query)?,
        None => service.list_notes()?,
    };
    if let Some(tag) = &cmd.tag {
        notes.retain(|note| extract_tags(&note.content).iter().any(|t| t == tag));
    }

    let graph = build_graph(&notes);
    println!("{}", serde_json::to_string_pretty(&graph)?);

    Ok(())
}

/// Display form of a note title; empty titles render as "Untitled".
fn display_title(title: &str) -> &str {
    if title.is_empty() { "Untitled" } else { title }
}

/// Renders highlight spans for terminal output, emphasizing matched spans
/// with ANSI bold.
fn render_spans(spans: &[HighlightSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        if span.highlighted {
            out.push_str("\x1b[1m");
            out.push_str(&span.text);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(&span.text);
        }
    }
    out
}
