use std::collections::BTreeSet;

use anyhow::Result;
use rusqlite::OptionalExtension;
use time::OffsetDateTime;

use crate::db::Database;
use crate::graph::{NoteGraph, build_graph};
use crate::models::{Note, NoteBuilder, NoteId};
use crate::search;
use crate::tags::extract_tags;

/// Service layer providing note management and graph derivation.
///
/// `NoteService` owns a `Database` instance and exposes the operations the
/// rendering layer composes: note CRUD, collection search, the tag cloud,
/// backlinks, link completion, and the derived note graph. Derivations are
/// recomputed from the current collection on every call; the service holds
/// no derived state, so callers simply re-invoke after any note mutation.
///
/// # Examples
///
/// ```
/// use synapse::{Database, NoteService};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let service = NoteService::new(db);
/// # Ok(())
/// # }
/// ```
pub struct NoteService {
    db: Database,
}

impl NoteService {
    /// Creates a new NoteService with the given database.
    ///
    /// Takes ownership of the database instance. The service becomes the
    /// sole owner and manages all database operations through its methods.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Useful for testing or advanced operations that need direct database
    /// access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates a new note with the given title and content.
    ///
    /// Inserts the note with current Unix timestamps for both `created_at`
    /// and `updated_at` and returns the fully populated `Note` with its
    /// assigned `NoteId`. Both title and content may be empty; title
    /// uniqueness is not enforced.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapse::{Database, NoteService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = NoteService::new(db);
    ///
    /// let note = service.create_note("Reading list", "start with [[The Rust Book]] #reading")?;
    /// assert!(note.id.get() > 0);
    /// assert_eq!(note.title, "Reading list");
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_note(&self, title: &str, content: &str) -> Result<Note> {
        let conn = self.db.connection();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        conn.execute(
            "INSERT INTO notes (title, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            (title, content, now, now),
        )?;

        let id = conn.last_insert_rowid();

        Ok(NoteBuilder::new()
            .id(NoteId::new(id))
            .title(title)
            .content(content)
            .created_at(OffsetDateTime::from_unix_timestamp(now)?)
            .updated_at(OffsetDateTime::from_unix_timestamp(now)?)
            .build())
    }

    /// Retrieves a note by its ID.
    ///
    /// Returns `None` if no note exists with the given ID. This is not
    /// considered an error condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapse::{Database, NoteId, NoteService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = NoteService::new(db);
    ///
    /// assert_eq!(service.get_note(NoteId::new(999))?, None);
    ///
    /// let created = service.create_note("Test", "body")?;
    /// let retrieved = service.get_note(created.id)?.expect("note should exist");
    /// assert_eq!(retrieved.content, "body");
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let conn = self.db.connection();

        let row = conn
            .query_row(
                "SELECT id, title, content, created_at, updated_at FROM notes WHERE id = ?1",
                [id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, title, content, created_at, updated_at)) => Ok(Some(
                NoteBuilder::new()
                    .id(NoteId::new(id))
                    .title(title)
                    .content(content)
                    .created_at(OffsetDateTime::from_unix_timestamp(created_at)?)
                    .updated_at(OffsetDateTime::from_unix_timestamp(updated_at)?)
                    .build(),
            )),
            None => Ok(None),
        }
    }

    /// Updates a note's title and content.
    ///
    /// Refreshes `updated_at` to the current time. Returns `true` when a
    /// note with the given ID existed and was updated, `false` otherwise.
    pub fn update_note(&self, id: NoteId, title: &str, content: &str) -> Result<bool> {
        let conn = self.db.connection();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let changed = conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            (title, content, now, id.get()),
        )?;

        Ok(changed > 0)
    }

    /// Deletes a note by its ID.
    ///
    /// Deleting a non-existent note is not an error.
    pub fn delete_note(&self, id: NoteId) -> Result<()> {
        let conn = self.db.connection();

        conn.execute("DELETE FROM notes WHERE id = ?1", [id.get()])?;

        Ok(())
    }

    /// Lists all notes, most recently updated first.
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let conn = self.db.connection();

        let mut stmt = conn.prepare(
            "SELECT id, title, content, created_at, updated_at
             FROM notes
             ORDER BY updated_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut notes = Vec::new();
        for row_result in rows {
            let (id, title, content, created_at, updated_at) = row_result?;
            notes.push(
                NoteBuilder::new()
                    .id(NoteId::new(id))
                    .title(title)
                    .content(content)
                    .created_at(OffsetDateTime::from_unix_timestamp(created_at)?)
                    .updated_at(OffsetDateTime::from_unix_timestamp(updated_at)?)
                    .build(),
            );
        }

        Ok(notes)
    }

    /// Lists the notes whose title or content contains `query`,
    /// case-insensitively.
    ///
    /// An empty query matches everything; this is the list filter the
    /// sidebar applies while the user types.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapse::{Database, NoteService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = NoteService::new(db);
    ///
    /// service.create_note("Groceries", "milk and eggs")?;
    /// service.create_note("Ideas", "a note-taking app")?;
    ///
    /// let hits = service.search_notes("MILK")?;
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits[0].title, "Groceries");
    ///
    /// assert_eq!(service.search_notes("")?.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        Ok(self
            .list_notes()?
            .into_iter()
            .filter(|note| {
                search::matches(&note.title, query) || search::matches(&note.content, query)
            })
            .collect())
    }

    /// Returns the collection-wide tag cloud: every `#tag` token across all
    /// note content, deduplicated and sorted alphabetically.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapse::{Database, NoteService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = NoteService::new(db);
    ///
    /// service.create_note("A", "#zebra #apple")?;
    /// service.create_note("B", "#apple again")?;
    ///
    /// assert_eq!(service.tag_cloud()?, vec!["#apple", "#zebra"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn tag_cloud(&self) -> Result<Vec<String>> {
        let mut tags = BTreeSet::new();
        for note in self.list_notes()? {
            tags.extend(extract_tags(&note.content));
        }
        Ok(tags.into_iter().collect())
    }

    /// Lists the notes whose content carries the given tag.
    ///
    /// The tag is compared against extracted tokens, so `tag` should include
    /// the leading `#`.
    pub fn notes_with_tag(&self, tag: &str) -> Result<Vec<Note>> {
        Ok(self
            .list_notes()?
            .into_iter()
            .filter(|note| extract_tags(&note.content).iter().any(|t| t == tag))
            .collect())
    }

    /// Lists the notes that link to the given note by its title.
    ///
    /// A backlink is any other note whose content contains the literal
    /// `[[Title]]` pattern for this note's title. A missing note or a note
    /// with an empty title has no backlinks.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapse::{Database, NoteService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = NoteService::new(db);
    ///
    /// let target = service.create_note("Target", "")?;
    /// service.create_note("Source", "see [[Target]]")?;
    ///
    /// let backlinks = service.backlinks(target.id)?;
    /// assert_eq!(backlinks.len(), 1);
    /// assert_eq!(backlinks[0].title, "Source");
    /// # Ok(())
    /// # }
    /// ```
    pub fn backlinks(&self, id: NoteId) -> Result<Vec<Note>> {
        let Some(note) = self.get_note(id)? else {
            return Ok(Vec::new());
        };
        if note.title.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("[[{}]]", note.title);

        Ok(self
            .list_notes()?
            .into_iter()
            .filter(|n| n.id != id && n.content.contains(&pattern))
            .collect())
    }

    /// Lists notes whose title contains `prefix` case-insensitively,
    /// excluding `exclude` when given.
    ///
    /// This feeds `[[` link completion in the editor: the note being edited
    /// is excluded so it does not suggest linking to itself.
    pub fn link_candidates(&self, prefix: &str, exclude: Option<NoteId>) -> Result<Vec<Note>> {
        Ok(self
            .list_notes()?
            .into_iter()
            .filter(|n| exclude != Some(n.id) && search::matches(&n.title, prefix))
            .collect())
    }

    /// Derives the note graph over the full collection.
    ///
    /// Rebuilt from scratch on every call. To graph a filtered subset (the
    /// search- or tag-filtered view), pass the subset to
    /// [`build_graph`](crate::graph::build_graph) directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapse::{Database, NoteService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = NoteService::new(db);
    ///
    /// service.create_note("A", "[[B]]")?;
    /// service.create_note("B", "")?;
    ///
    /// let graph = service.graph()?;
    /// assert_eq!(graph.nodes.len(), 2);
    /// assert_eq!(graph.links.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn graph(&self) -> Result<NoteGraph> {
        Ok(build_graph(&self.list_notes()?))
    }
}
