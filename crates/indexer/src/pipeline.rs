//! Per-batch pipeline (SPEC §4.4): group by context, parse/extract, bulk
//! write, resolve references, stage lexical/vector updates, publish.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use codeplane_discovery::{CandidateContext, Router};
use codeplane_extraction::{artifact, detect_family, pack_for, supports_ast, DefLookup, ExtractionInput, LocalDefIndex, Resolver};
use codeplane_protocol::{Context, Epoch, FileRecord, RefTier};
use codeplane_storage::{RelationalDefLookup, Storage};
use sha2::{Digest, Sha256};

use crate::events::{ChangeKind, FileChangeEvent};
use crate::Result;

pub struct Pipeline {
    repo_root: PathBuf,
    storage: Arc<Storage>,
    contexts: Vec<CandidateContext>,
    context_ids: HashMap<String, i64>,
}

impl Pipeline {
    pub fn new(repo_root: PathBuf, storage: Arc<Storage>) -> Result<Self> {
        let mut pipeline = Self { repo_root, storage, contexts: Vec::new(), context_ids: HashMap::new() };
        pipeline.refresh_contexts()?;
        Ok(pipeline)
    }

    /// Re-run discovery and re-commit contexts to storage. Called at startup
    /// and whenever `.cplignore` changes since exclude specs can shift which
    /// context owns a file.
    pub fn refresh_contexts(&mut self) -> Result<()> {
        let contexts = codeplane_discovery::discover(&self.repo_root)?;
        let mut ids = HashMap::new();
        {
            let store = self.storage.relational.write().unwrap();
            for ctx in &contexts {
                let id = store.upsert_context(&Context {
                    id: 0,
                    root_path: ctx.root_path.clone(),
                    language_family: ctx.language_family,
                    include_glob: ctx.include_glob.clone(),
                    exclude_glob: ctx.exclude_glob.clone(),
                    probe_status: ctx.probe_status,
                })?;
                ids.insert(ctx.root_path.clone(), id);
            }
        }
        self.contexts = contexts;
        self.context_ids = ids;
        Ok(())
    }

    /// Run one batch of coalesced file-change events through the full
    /// pipeline and publish the resulting epoch (SPEC §4.4 steps 1-6).
    pub fn run_batch(&self, events: &[FileChangeEvent]) -> Result<Epoch> {
        let router = Router::new(&self.contexts);
        let next_epoch = self.storage.current_epoch() + 1;

        let mut resolver = Resolver::new();
        let mut touched_file_ids = Vec::new();

        for event in events {
            let Ok(rel_path) = event.path.strip_prefix(&self.repo_root) else { continue };
            let rel_path = rel_path.to_string_lossy().replace('\\', "/");

            let Some(ctx) = router.route(&rel_path) else { continue };
            let Some(&context_id) = self.context_ids.get(&ctx.root_path) else { continue };

            match event.kind {
                ChangeKind::Deleted => {
                    let store = self.storage.relational.write().unwrap();
                    store.mark_file_absent(&rel_path)?;
                    drop(store);
                    self.storage.lexical.write().unwrap().remove_file(file_id_for(&self.storage, &rel_path)?.unwrap_or(0))?;
                    self.storage.file_vectors.write().unwrap().remove_file(&rel_path);
                }
                ChangeKind::Created | ChangeKind::Modified | ChangeKind::Renamed => {
                    if let Some(file_id) = self.index_one_file(&rel_path, context_id, next_epoch, &mut resolver)? {
                        touched_file_ids.push(file_id);
                    }
                }
            }
        }

        // Drain cross-file/forward references now that the whole batch is
        // durable, and write back any tier upgrades (SPEC §9 cyclic refs).
        if resolver.deferred_count() > 0 {
            let store = self.storage.relational.read().unwrap();
            let lookup = RelationalDefLookup::new(&store);
            let drained = resolver.drain_deferred(&lookup);
            drop(store);
            let mut by_file: HashMap<i64, Vec<_>> = HashMap::new();
            for r in drained {
                by_file.entry(r.file_id).or_default().push(r);
            }
            let mut store = self.storage.relational.write().unwrap();
            for (file_id, refs) in by_file {
                store.replace_references(file_id, &refs)?;
            }
        }

        Ok(self.storage.publish_epoch(now_unix_ms(), None, touched_file_ids.len() as u64)?)
    }

    /// Parse one file, write its facts, and stage its lexical/vector
    /// updates. Returns the file's storage id, or `None` if it couldn't be
    /// read (a parse/read failure is recorded with an empty-facts file so it
    /// is retried only on the next modification, never busy-looped).
    fn index_one_file(
        &self,
        rel_path: &str,
        context_id: i64,
        epoch: u64,
        resolver: &mut Resolver,
    ) -> Result<Option<i64>> {
        let absolute = self.repo_root.join(rel_path);
        let source = match std::fs::read_to_string(&absolute) {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };

        let family = detect_family(rel_path);
        let artifact_kind = artifact::classify(rel_path, &source);
        let content_hash = hash_content(&source);

        let file_id = {
            let store = self.storage.relational.write().unwrap();
            store.upsert_file(
                &FileRecord {
                    id: 0,
                    repo_relative_path: rel_path.to_string(),
                    language_family: family,
                    content_hash,
                    size: source.len() as u64,
                    context_id,
                    present: true,
                },
                artifact_kind,
            )?
        };

        if supports_ast(family) {
            if let Some(pack) = pack_for(family) {
                let input = ExtractionInput { file_id, context_id, source: &source, created_epoch: epoch };
                if let Ok(result) = pack.extract(&input) {
                    let mut refs = result.refs;
                    let local_index = LocalDefIndex::from_defs(&result.defs);
                    let candidate_names: Vec<String> = refs.iter().map(|r| r.token.clone()).collect();

                    // Same-file resolution first (cheap, no lock needed), then
                    // fall through to the cross-file index for anything still
                    // unresolved before giving up and deferring to the
                    // whole-batch drain (SPEC §9 cyclic references).
                    for (r, name) in refs.iter_mut().zip(candidate_names.iter()) {
                        if let Some((def_uid, tier)) = local_index.lookup(name) {
                            r.upgrade_tier(tier, def_uid);
                        }
                    }
                    {
                        let store_guard = self.storage.relational.read().unwrap();
                        let cross_file_lookup = RelationalDefLookup::new(&store_guard);
                        for (r, name) in refs.iter_mut().zip(candidate_names.iter()) {
                            if r.tier == RefTier::Unknown {
                                if let Some((def_uid, tier)) = cross_file_lookup.lookup(name) {
                                    r.upgrade_tier(tier, def_uid);
                                }
                            }
                        }
                    }
                    for (r, name) in refs.iter().zip(candidate_names.iter()) {
                        if r.tier == RefTier::Unknown {
                            resolver.defer(r.clone(), name.clone());
                        }
                    }

                    let mut store = self.storage.relational.write().unwrap();
                    store.replace_definitions(file_id, &result.defs)?;
                    store.replace_references(file_id, &refs)?;
                    store.replace_imports(file_id, &result.imports)?;
                    store.replace_scopes(file_id, &result.scopes)?;
                    drop(store);

                    let mut def_vectors = self.storage.def_vectors.write().unwrap();
                    for def in &result.defs {
                        let text = def.signature_text.clone().unwrap_or_else(|| def.lexical_path.clone());
                        def_vectors.upsert(&def.def_uid, &text)?;
                    }
                }
            }
        }

        self.storage.lexical.write().unwrap().upsert_file(file_id, rel_path, &source)?;
        let mut file_vectors = self.storage.file_vectors.write().unwrap();
        file_vectors.upsert_chunk(rel_path, 0, &header_chunk(&source))?;
        file_vectors.upsert_chunk(rel_path, 1, &source)?;

        Ok(Some(file_id))
    }
}

fn header_chunk(source: &str) -> String {
    source.lines().take(20).collect::<Vec<_>>().join("\n")
}

fn hash_content(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn now_unix_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn file_id_for(storage: &Storage, rel_path: &str) -> Result<Option<i64>> {
    let store = storage.relational.read().unwrap();
    Ok(store.file_by_path(rel_path)?.map(|f| f.id))
}

#[allow(dead_code)]
fn repo_relative(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(|p| p.to_string_lossy().replace('\\', "/"))
}
