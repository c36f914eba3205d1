//! Lexical full-text index (SPEC §4.1/§4.5): BM25 ranking over file contents,
//! used by recon's lexical harvester and term-match harvester.

use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::doc;
use tantivy::query::QueryParser;
use tantivy::schema::{Schema, Value, FAST, INDEXED, STORED, TEXT};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use crate::error::Result;

pub struct LexicalIndex {
    index: Index,
    writer: IndexWriter,
    reader: IndexReader,
    field_file_id: tantivy::schema::Field,
    field_path: tantivy::schema::Field,
    field_content: tantivy::schema::Field,
}

pub struct LexicalHit {
    pub file_id: i64,
    pub path: String,
    pub score: f32,
}

impl LexicalIndex {
    pub fn open_in_dir(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let mut schema_builder = Schema::builder();
        let field_file_id = schema_builder.add_i64_field("file_id", INDEXED | STORED | FAST);
        let field_path = schema_builder.add_text_field("path", TEXT | STORED);
        let field_content = schema_builder.add_text_field("content", TEXT);
        let schema = schema_builder.build();

        let index = if dir.join("meta.json").exists() {
            Index::open_in_dir(dir)?
        } else {
            Index::create_in_dir(dir, schema)?
        };
        let writer = index.writer(50_000_000)?;
        let reader = index.reader_builder().reload_policy(ReloadPolicy::OnCommitWithDelay).try_into()?;

        Ok(Self { index, writer, reader, field_file_id, field_path, field_content })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let field_file_id = schema_builder.add_i64_field("file_id", INDEXED | STORED | FAST);
        let field_path = schema_builder.add_text_field("path", TEXT | STORED);
        let field_content = schema_builder.add_text_field("content", TEXT);
        let schema = schema_builder.build();
        let index = Index::create_in_ram(schema);
        let writer = index.writer(15_000_000)?;
        let reader = index.reader_builder().reload_policy(ReloadPolicy::OnCommitWithDelay).try_into()?;
        Ok(Self { index, writer, reader, field_file_id, field_path, field_content })
    }

    /// Replace one file's document. Call `commit` after a batch to publish.
    pub fn upsert_file(&mut self, file_id: i64, path: &str, content: &str) -> Result<()> {
        let term = tantivy::Term::from_field_i64(self.field_file_id, file_id);
        self.writer.delete_term(term);
        self.writer.add_document(doc!(
            self.field_file_id => file_id,
            self.field_path => path,
            self.field_content => content,
        ))?;
        Ok(())
    }

    pub fn remove_file(&mut self, file_id: i64) -> Result<()> {
        let term = tantivy::Term::from_field_i64(self.field_file_id, file_id);
        self.writer.delete_term(term);
        Ok(())
    }

    /// Make pending `upsert_file`/`remove_file` calls visible to `search`.
    /// Called once at the end of an indexer batch, alongside the relational
    /// store's `publish_epoch` (SPEC §4.1 "stores swap atomically").
    pub fn commit(&mut self) -> Result<()> {
        self.writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    pub fn search(&self, query_text: &str, limit: usize) -> Result<Vec<LexicalHit>> {
        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(&self.index, vec![self.field_content, self.field_path]);
        let query = parser.parse_query_lenient(query_text).0;
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let retrieved: TantivyDocument = searcher.doc(addr)?;
            let file_id = retrieved
                .get_first(self.field_file_id)
                .and_then(|v| v.as_i64())
                .unwrap_or_default();
            let path = retrieved
                .get_first(self.field_path)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            hits.push(LexicalHit { file_id, path, score });
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_and_finds_a_term() {
        let mut index = LexicalIndex::open_in_memory().unwrap();
        index.upsert_file(1, "src/auth.rs", "fn authenticate_user(token: &str) -> bool").unwrap();
        index.upsert_file(2, "src/math.rs", "fn add(a: i32, b: i32) -> i32").unwrap();
        index.commit().unwrap();

        let hits = index.search("authenticate", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_id, 1);
    }

    #[test]
    fn removing_a_file_drops_it_from_results() {
        let mut index = LexicalIndex::open_in_memory().unwrap();
        index.upsert_file(1, "src/auth.rs", "authenticate_user token").unwrap();
        index.commit().unwrap();
        assert_eq!(index.search("authenticate_user", 10).unwrap().len(), 1);

        index.remove_file(1).unwrap();
        index.commit().unwrap();
        assert_eq!(index.search("authenticate_user", 10).unwrap().len(), 0);
    }
}
