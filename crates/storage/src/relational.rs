//! Relational store (SPEC §4.1): files, contexts, definitions, references,
//! imports, scopes, export surfaces and anchor groups, plus the epoch ledger
//! that makes a batch of writes visible to readers atomically.
//!
//! Readers never see a row whose `created_epoch` exceeds the epoch they
//! pinned at query start — `publish_epoch` is the only thing that advances
//! what "current" means, and it runs after every row in the batch has
//! already been committed to `rusqlite`.

use std::path::Path;

use codeplane_protocol::{
    ArtifactKind, Context, DefFact, DefKind, Epoch, ExportSurface, FileRecord, ImportFact,
    LanguageFamily, ProbeStatus, RefFact, RefRole, RefTier, Scope, ScopeKind,
};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StorageError};

pub struct RelationalStore {
    conn: std::sync::Mutex<Connection>,
}

impl RelationalStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self {
            conn: std::sync::Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: std::sync::Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.lock().unwrap().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS epochs (
                id                  INTEGER PRIMARY KEY,
                publish_time_unix_ms INTEGER NOT NULL,
                commit_hash         TEXT,
                files_indexed       INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS contexts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                root_path       TEXT NOT NULL UNIQUE,
                language_family TEXT NOT NULL,
                include_glob    TEXT NOT NULL,
                exclude_glob    TEXT NOT NULL,
                probe_status    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS files (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                repo_relative_path   TEXT NOT NULL UNIQUE,
                language_family      TEXT NOT NULL,
                content_hash         TEXT NOT NULL,
                size                 INTEGER NOT NULL,
                context_id           INTEGER NOT NULL REFERENCES contexts(id),
                present              INTEGER NOT NULL,
                artifact_kind        TEXT NOT NULL DEFAULT 'production'
            );
            CREATE INDEX IF NOT EXISTS idx_files_context ON files(context_id);

            CREATE TABLE IF NOT EXISTS definitions (
                def_uid         TEXT PRIMARY KEY,
                file_id         INTEGER NOT NULL REFERENCES files(id),
                unit            TEXT NOT NULL,
                kind            TEXT NOT NULL,
                name            TEXT NOT NULL,
                lexical_path    TEXT NOT NULL,
                qualified_path  TEXT,
                start_line      INTEGER NOT NULL,
                start_col       INTEGER NOT NULL,
                end_line        INTEGER NOT NULL,
                end_col         INTEGER NOT NULL,
                signature_hash  TEXT NOT NULL,
                signature_text  TEXT,
                docstring       TEXT,
                decorators      TEXT NOT NULL,
                return_type     TEXT,
                created_epoch   INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_definitions_file ON definitions(file_id);
            CREATE INDEX IF NOT EXISTS idx_definitions_name ON definitions(name);
            CREATE INDEX IF NOT EXISTS idx_definitions_lexical_path ON definitions(lexical_path);

            CREATE TABLE IF NOT EXISTS references_ (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                file_id         INTEGER NOT NULL REFERENCES files(id),
                token           TEXT NOT NULL,
                start_line      INTEGER NOT NULL,
                start_col       INTEGER NOT NULL,
                end_line        INTEGER NOT NULL,
                end_col         INTEGER NOT NULL,
                role            TEXT NOT NULL,
                tier            INTEGER NOT NULL,
                certainty       REAL NOT NULL,
                target_def_uid  TEXT REFERENCES definitions(def_uid),
                created_epoch   INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_references_file ON references_(file_id);
            CREATE INDEX IF NOT EXISTS idx_references_target ON references_(target_def_uid);
            CREATE INDEX IF NOT EXISTS idx_references_token ON references_(token);

            CREATE TABLE IF NOT EXISTS imports (
                id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                file_id               INTEGER NOT NULL REFERENCES files(id),
                kind                  TEXT NOT NULL,
                source_literal        TEXT NOT NULL,
                resolved_target_path  TEXT,
                is_star               INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_imports_file ON imports(file_id);

            CREATE TABLE IF NOT EXISTS scopes (
                scope_id    INTEGER PRIMARY KEY,
                file_id     INTEGER NOT NULL REFERENCES files(id),
                kind        TEXT NOT NULL,
                start_line  INTEGER NOT NULL,
                start_col   INTEGER NOT NULL,
                end_line    INTEGER NOT NULL,
                end_col     INTEGER NOT NULL,
                parent      INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_scopes_file ON scopes(file_id);

            CREATE TABLE IF NOT EXISTS export_surfaces (
                unit              TEXT PRIMARY KEY,
                exported_symbols  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS anchor_groups (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                unit      TEXT NOT NULL,
                def_uids  TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    // -- Epoch ledger ------------------------------------------------------

    pub fn current_epoch(&self) -> Result<u64> {
        let epoch: Option<u64> = self.conn.lock().unwrap()
            .query_row("SELECT MAX(id) FROM epochs", [], |r| r.get(0))
            .optional()?
            .flatten();
        Ok(epoch.unwrap_or(0))
    }

    /// Publish a new epoch. Must be called after every row tagged with this
    /// epoch's id has already been committed — publication is what makes the
    /// batch visible, not the row inserts themselves.
    pub fn publish_epoch(
        &self,
        publish_time_unix_ms: u64,
        commit_hash: Option<&str>,
        files_indexed: u64,
    ) -> Result<Epoch> {
        let next_id = self.current_epoch()? + 1;
        self.conn.lock().unwrap().execute(
            "INSERT INTO epochs (id, publish_time_unix_ms, commit_hash, files_indexed) VALUES (?1, ?2, ?3, ?4)",
            params![next_id, publish_time_unix_ms, commit_hash, files_indexed],
        )?;
        Ok(Epoch { id: next_id, publish_time_unix_ms, commit_hash: commit_hash.map(String::from), files_indexed })
    }

    // -- Contexts ------------------------------------------------------------

    pub fn upsert_context(&self, ctx: &Context) -> Result<i64> {
        self.conn.lock().unwrap().execute(
            "INSERT INTO contexts (root_path, language_family, include_glob, exclude_glob, probe_status)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(root_path) DO UPDATE SET
                language_family = excluded.language_family,
                include_glob = excluded.include_glob,
                exclude_glob = excluded.exclude_glob,
                probe_status = excluded.probe_status",
            params![
                ctx.root_path,
                ctx.language_family.as_str(),
                serde_json::to_string(&ctx.include_glob)?,
                serde_json::to_string(&ctx.exclude_glob)?,
                probe_status_str(ctx.probe_status),
            ],
        )?;
        self.conn.lock().unwrap()
            .query_row("SELECT id FROM contexts WHERE root_path = ?1", params![ctx.root_path], |r| r.get(0))
            .map_err(StorageError::from)
    }

    // -- Files -----------------------------------------------------------

    pub fn upsert_file(&self, file: &FileRecord, artifact: ArtifactKind) -> Result<i64> {
        self.conn.lock().unwrap().execute(
            "INSERT INTO files (repo_relative_path, language_family, content_hash, size, context_id, present, artifact_kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(repo_relative_path) DO UPDATE SET
                language_family = excluded.language_family,
                content_hash = excluded.content_hash,
                size = excluded.size,
                context_id = excluded.context_id,
                present = excluded.present,
                artifact_kind = excluded.artifact_kind",
            params![
                file.repo_relative_path,
                file.language_family.as_str(),
                file.content_hash,
                file.size,
                file.context_id,
                file.present,
                artifact_kind_str(artifact),
            ],
        )?;
        self.conn.lock().unwrap()
            .query_row(
                "SELECT id FROM files WHERE repo_relative_path = ?1",
                params![file.repo_relative_path],
                |r| r.get(0),
            )
            .map_err(StorageError::from)
    }

    pub fn mark_file_absent(&self, repo_relative_path: &str) -> Result<()> {
        self.conn.lock().unwrap().execute(
            "UPDATE files SET present = 0 WHERE repo_relative_path = ?1",
            params![repo_relative_path],
        )?;
        Ok(())
    }

    pub fn file_by_path(&self, repo_relative_path: &str) -> Result<Option<FileRecord>> {
        self.conn.lock().unwrap()
            .query_row(
                "SELECT id, repo_relative_path, language_family, content_hash, size, context_id, present
                 FROM files WHERE repo_relative_path = ?1",
                params![repo_relative_path],
                Self::row_to_file,
            )
            .optional()
            .map_err(StorageError::from)
    }

    pub fn file_artifact_kind(&self, file_id: i64) -> Result<Option<ArtifactKind>> {
        self.conn.lock().unwrap()
            .query_row("SELECT artifact_kind FROM files WHERE id = ?1", params![file_id], |r| r.get::<_, String>(0))
            .optional()
            .map(|opt| opt.map(|s| parse_artifact_kind(&s)))
            .map_err(StorageError::from)
    }

    /// Every present file's id and path, for callers (recon's harvesters,
    /// graph construction) that need to resolve an import's literal target
    /// against the indexed file set rather than walking the filesystem.
    pub fn all_files(&self) -> Result<Vec<FileRecord>> {
        let conn_guard = self.conn.lock().unwrap();
        let mut stmt = conn_guard.prepare(
            "SELECT id, repo_relative_path, language_family, content_hash, size, context_id, present FROM files WHERE present = 1",
        )?;
        let rows = stmt.query_map([], Self::row_to_file)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    pub fn imports_by_file(&self, file_id: i64) -> Result<Vec<ImportFact>> {
        let conn_guard = self.conn.lock().unwrap();
        let mut stmt = conn_guard.prepare(
            "SELECT file_id, kind, source_literal, resolved_target_path, is_star FROM imports WHERE file_id = ?1",
        )?;
        let rows = stmt.query_map(params![file_id], |row| {
            Ok(ImportFact {
                file_id: row.get(0)?,
                kind: row.get(1)?,
                source_literal: row.get(2)?,
                resolved_target_path: row.get(3)?,
                is_star: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
        let family: String = row.get(2)?;
        Ok(FileRecord {
            id: row.get(0)?,
            repo_relative_path: row.get(1)?,
            language_family: parse_family(&family),
            content_hash: row.get(3)?,
            size: row.get(4)?,
            context_id: row.get(5)?,
            present: row.get(6)?,
        })
    }

    // -- Definitions -------------------------------------------------------

    /// Replace every definition row for `file_id`, tagging survivors with
    /// `epoch`. Old rows for the file are deleted first so a definition that
    /// disappeared from the source (renamed, deleted) doesn't linger.
    pub fn replace_definitions(&mut self, file_id: i64, defs: &[DefFact]) -> Result<()> {
        let mut conn_guard = self.conn.lock().unwrap();
        let tx = conn_guard.transaction()?;
        tx.execute("DELETE FROM definitions WHERE file_id = ?1", params![file_id])?;
        for def in defs {
            tx.execute(
                "INSERT INTO definitions
                    (def_uid, file_id, unit, kind, name, lexical_path, qualified_path,
                     start_line, start_col, end_line, end_col,
                     signature_hash, signature_text, docstring, decorators, return_type, created_epoch)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
                 ON CONFLICT(def_uid) DO UPDATE SET
                    file_id = excluded.file_id,
                    start_line = excluded.start_line, start_col = excluded.start_col,
                    end_line = excluded.end_line, end_col = excluded.end_col,
                    signature_text = excluded.signature_text,
                    docstring = excluded.docstring,
                    created_epoch = excluded.created_epoch",
                params![
                    def.def_uid,
                    def.file_id,
                    def.unit.as_str(),
                    def_kind_str(def.kind),
                    def.name,
                    def.lexical_path,
                    def.qualified_path,
                    def.span.start_line,
                    def.span.start_col,
                    def.span.end_line,
                    def.span.end_col,
                    def.signature_hash,
                    def.signature_text,
                    def.docstring,
                    serde_json::to_string(&def.decorators)?,
                    def.return_type,
                    def.created_epoch,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn definitions_by_name(&self, name: &str) -> Result<Vec<DefFact>> {
        let conn_guard = self.conn.lock().unwrap();
        let mut stmt = conn_guard.prepare(
            "SELECT def_uid, file_id, unit, kind, name, lexical_path, qualified_path,
                    start_line, start_col, end_line, end_col,
                    signature_hash, signature_text, docstring, decorators, return_type, created_epoch
             FROM definitions WHERE name = ?1",
        )?;
        let rows = stmt.query_map(params![name], Self::row_to_def)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    /// All definitions in a single file, in source order, for scaffold rendering.
    pub fn definitions_by_file(&self, file_id: i64) -> Result<Vec<DefFact>> {
        let conn_guard = self.conn.lock().unwrap();
        let mut stmt = conn_guard.prepare(
            "SELECT def_uid, file_id, unit, kind, name, lexical_path, qualified_path,
                    start_line, start_col, end_line, end_col,
                    signature_hash, signature_text, docstring, decorators, return_type, created_epoch
             FROM definitions WHERE file_id = ?1 ORDER BY start_line ASC",
        )?;
        let rows = stmt.query_map(params![file_id], Self::row_to_def)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    /// SQL LIKE over definition names, for the term-match harvester. `pattern`
    /// should already carry `%` wildcards; matches are capped at `limit`.
    pub fn definitions_like(&self, pattern: &str, limit: usize) -> Result<Vec<DefFact>> {
        let conn_guard = self.conn.lock().unwrap();
        let mut stmt = conn_guard.prepare(
            "SELECT def_uid, file_id, unit, kind, name, lexical_path, qualified_path,
                    start_line, start_col, end_line, end_col,
                    signature_hash, signature_text, docstring, decorators, return_type, created_epoch
             FROM definitions WHERE name LIKE ?1 ESCAPE '\\' LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], Self::row_to_def)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    pub fn definition(&self, def_uid: &str) -> Result<Option<DefFact>> {
        self.conn.lock().unwrap()
            .query_row(
                "SELECT def_uid, file_id, unit, kind, name, lexical_path, qualified_path,
                        start_line, start_col, end_line, end_col,
                        signature_hash, signature_text, docstring, decorators, return_type, created_epoch
                 FROM definitions WHERE def_uid = ?1",
                params![def_uid],
                Self::row_to_def,
            )
            .optional()
            .map_err(StorageError::from)
    }

    fn row_to_def(row: &rusqlite::Row) -> rusqlite::Result<DefFact> {
        let unit: String = row.get(2)?;
        let kind: String = row.get(3)?;
        let decorators: String = row.get(14)?;
        Ok(DefFact {
            def_uid: row.get(0)?,
            file_id: row.get(1)?,
            unit: parse_family(&unit),
            kind: parse_def_kind(&kind),
            name: row.get(4)?,
            lexical_path: row.get(5)?,
            qualified_path: row.get(6)?,
            span: codeplane_protocol::Span {
                start_line: row.get(7)?,
                start_col: row.get(8)?,
                end_line: row.get(9)?,
                end_col: row.get(10)?,
            },
            signature_hash: row.get(11)?,
            signature_text: row.get(12)?,
            docstring: row.get(13)?,
            decorators: serde_json::from_str(&decorators).unwrap_or_default(),
            return_type: row.get(15)?,
            created_epoch: row.get(16)?,
        })
    }

    // -- References --------------------------------------------------------

    pub fn replace_references(&mut self, file_id: i64, refs: &[RefFact]) -> Result<()> {
        let mut conn_guard = self.conn.lock().unwrap();
        let tx = conn_guard.transaction()?;
        tx.execute("DELETE FROM references_ WHERE file_id = ?1", params![file_id])?;
        for r in refs {
            tx.execute(
                "INSERT INTO references_
                    (file_id, token, start_line, start_col, end_line, end_col, role, tier, certainty, target_def_uid, created_epoch)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    r.file_id,
                    r.token,
                    r.span.start_line,
                    r.span.start_col,
                    r.span.end_line,
                    r.span.end_col,
                    ref_role_str(r.role),
                    r.tier as i64,
                    r.certainty,
                    r.target_def_uid,
                    r.created_epoch,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn references_to(&self, def_uid: &str) -> Result<Vec<RefFact>> {
        let conn_guard = self.conn.lock().unwrap();
        let mut stmt = conn_guard.prepare(
            "SELECT file_id, token, start_line, start_col, end_line, end_col, role, tier, certainty, target_def_uid, created_epoch
             FROM references_ WHERE target_def_uid = ?1",
        )?;
        let rows = stmt.query_map(params![def_uid], Self::row_to_ref)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    fn row_to_ref(row: &rusqlite::Row) -> rusqlite::Result<RefFact> {
        let role: String = row.get(6)?;
        let tier: i64 = row.get(7)?;
        Ok(RefFact {
            file_id: row.get(0)?,
            token: row.get(1)?,
            span: codeplane_protocol::Span {
                start_line: row.get(2)?,
                start_col: row.get(3)?,
                end_line: row.get(4)?,
                end_col: row.get(5)?,
            },
            role: parse_ref_role(&role),
            tier: parse_ref_tier(tier),
            certainty: row.get(8)?,
            target_def_uid: row.get(9)?,
            created_epoch: row.get(10)?,
        })
    }

    // -- Imports / scopes / export surfaces / anchor groups -----------------

    pub fn replace_imports(&mut self, file_id: i64, imports: &[ImportFact]) -> Result<()> {
        let mut conn_guard = self.conn.lock().unwrap();
        let tx = conn_guard.transaction()?;
        tx.execute("DELETE FROM imports WHERE file_id = ?1", params![file_id])?;
        for i in imports {
            tx.execute(
                "INSERT INTO imports (file_id, kind, source_literal, resolved_target_path, is_star)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![i.file_id, i.kind, i.source_literal, i.resolved_target_path, i.is_star],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn replace_scopes(&mut self, file_id: i64, scopes: &[Scope]) -> Result<()> {
        let mut conn_guard = self.conn.lock().unwrap();
        let tx = conn_guard.transaction()?;
        tx.execute("DELETE FROM scopes WHERE file_id = ?1", params![file_id])?;
        for s in scopes {
            tx.execute(
                "INSERT INTO scopes (scope_id, file_id, kind, start_line, start_col, end_line, end_col, parent)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(scope_id) DO NOTHING",
                params![
                    s.scope_id,
                    s.file_id,
                    scope_kind_str(s.kind),
                    s.span.start_line,
                    s.span.start_col,
                    s.span.end_line,
                    s.span.end_col,
                    s.parent,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn upsert_export_surface(&self, surface: &ExportSurface) -> Result<()> {
        self.conn.lock().unwrap().execute(
            "INSERT INTO export_surfaces (unit, exported_symbols) VALUES (?1, ?2)
             ON CONFLICT(unit) DO UPDATE SET exported_symbols = excluded.exported_symbols",
            params![surface.unit, serde_json::to_string(&surface.exported_symbols)?],
        )?;
        Ok(())
    }
}

fn probe_status_str(s: ProbeStatus) -> &'static str {
    match s {
        ProbeStatus::Unprobed => "unprobed",
        ProbeStatus::Ok => "ok",
        ProbeStatus::Broken => "broken",
    }
}

fn artifact_kind_str(k: ArtifactKind) -> &'static str {
    match k {
        ArtifactKind::Production => "production",
        ArtifactKind::Test => "test",
        ArtifactKind::Barrel => "barrel",
        ArtifactKind::Generated => "generated",
        ArtifactKind::Doc => "doc",
        ArtifactKind::Config => "config",
    }
}

fn parse_artifact_kind(s: &str) -> ArtifactKind {
    match s {
        "test" => ArtifactKind::Test,
        "barrel" => ArtifactKind::Barrel,
        "generated" => ArtifactKind::Generated,
        "doc" => ArtifactKind::Doc,
        "config" => ArtifactKind::Config,
        _ => ArtifactKind::Production,
    }
}

fn def_kind_str(k: DefKind) -> &'static str {
    match k {
        DefKind::Function => "function",
        DefKind::Method => "method",
        DefKind::Class => "class",
        DefKind::Struct => "struct",
        DefKind::Enum => "enum",
        DefKind::Interface => "interface",
        DefKind::Trait => "trait",
        DefKind::Module => "module",
        DefKind::Constant => "constant",
        DefKind::Variable => "variable",
    }
}

fn parse_def_kind(s: &str) -> DefKind {
    match s {
        "function" => DefKind::Function,
        "method" => DefKind::Method,
        "class" => DefKind::Class,
        "struct" => DefKind::Struct,
        "enum" => DefKind::Enum,
        "interface" => DefKind::Interface,
        "trait" => DefKind::Trait,
        "module" => DefKind::Module,
        "constant" => DefKind::Constant,
        _ => DefKind::Variable,
    }
}

fn ref_role_str(r: RefRole) -> &'static str {
    match r {
        RefRole::Call => "call",
        RefRole::Read => "read",
        RefRole::Write => "write",
    }
}

fn parse_ref_role(s: &str) -> RefRole {
    match s {
        "call" => RefRole::Call,
        "write" => RefRole::Write,
        _ => RefRole::Read,
    }
}

fn parse_ref_tier(v: i64) -> RefTier {
    match v {
        3 => RefTier::Proven,
        2 => RefTier::Strong,
        1 => RefTier::Anchored,
        _ => RefTier::Unknown,
    }
}

fn scope_kind_str(k: ScopeKind) -> &'static str {
    match k {
        ScopeKind::Function => "function",
        ScopeKind::Class => "class",
        ScopeKind::Block => "block",
        ScopeKind::Module => "module",
    }
}

fn parse_family(s: &str) -> LanguageFamily {
    match s {
        "python" => LanguageFamily::Python,
        "javascript" => LanguageFamily::JavaScript,
        "typescript" => LanguageFamily::TypeScript,
        "go" => LanguageFamily::Go,
        "rust" => LanguageFamily::Rust,
        "java" => LanguageFamily::Java,
        "c" => LanguageFamily::C,
        "cpp" => LanguageFamily::Cpp,
        "csharp" => LanguageFamily::CSharp,
        "ruby" => LanguageFamily::Ruby,
        "php" => LanguageFamily::Php,
        _ => LanguageFamily::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context() -> Context {
        Context {
            id: 0,
            root_path: "".to_string(),
            language_family: LanguageFamily::Rust,
            include_glob: vec!["**/*.rs".to_string()],
            exclude_glob: vec![],
            probe_status: ProbeStatus::Ok,
        }
    }

    #[test]
    fn epochs_start_at_zero_and_increment() {
        let store = RelationalStore::open_in_memory().unwrap();
        assert_eq!(store.current_epoch().unwrap(), 0);
        let epoch = store.publish_epoch(1_000, None, 3).unwrap();
        assert_eq!(epoch.id, 1);
        assert_eq!(store.current_epoch().unwrap(), 1);
        let epoch2 = store.publish_epoch(2_000, Some("abc123"), 1).unwrap();
        assert_eq!(epoch2.id, 2);
    }

    #[test]
    fn file_upsert_is_idempotent_on_path() {
        let store = RelationalStore::open_in_memory().unwrap();
        let ctx_id = store.upsert_context(&sample_context()).unwrap();
        let file = FileRecord {
            id: 0,
            repo_relative_path: "src/main.rs".to_string(),
            language_family: LanguageFamily::Rust,
            content_hash: "h1".to_string(),
            size: 10,
            context_id: ctx_id,
            present: true,
        };
        let id1 = store.upsert_file(&file, ArtifactKind::Production).unwrap();
        let id2 = store.upsert_file(&file, ArtifactKind::Production).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn replace_definitions_drops_stale_rows() {
        let mut store = RelationalStore::open_in_memory().unwrap();
        let ctx_id = store.upsert_context(&sample_context()).unwrap();
        let file = FileRecord {
            id: 0,
            repo_relative_path: "src/lib.rs".to_string(),
            language_family: LanguageFamily::Rust,
            content_hash: "h1".to_string(),
            size: 10,
            context_id: ctx_id,
            present: true,
        };
        let file_id = store.upsert_file(&file, ArtifactKind::Production).unwrap();

        let span = codeplane_protocol::Span { start_line: 1, start_col: 1, end_line: 2, end_col: 1 };
        let def = DefFact {
            def_uid: "uid-1".to_string(),
            file_id,
            unit: LanguageFamily::Rust,
            kind: DefKind::Function,
            name: "foo".to_string(),
            lexical_path: "foo".to_string(),
            qualified_path: None,
            span,
            signature_hash: "h".to_string(),
            signature_text: None,
            docstring: None,
            decorators: vec![],
            return_type: None,
            created_epoch: 1,
        };
        store.replace_definitions(file_id, &[def]).unwrap();
        assert_eq!(store.definitions_by_name("foo").unwrap().len(), 1);

        store.replace_definitions(file_id, &[]).unwrap();
        assert!(store.definitions_by_name("foo").unwrap().is_empty());
    }
}
