use std::collections::HashSet;

use codeplane_protocol::{DefFact, DefKind, ImportFact, LanguageFamily, Scope, ScopeKind};
use tree_sitter::{Node, Parser};

use crate::def_uid;
use crate::language;
use crate::pack::{ExtractionInput, ExtractionResult, LanguagePack};
use crate::packs::common::{doc_comment_before, first_named_child, signature_line, span_of, text_of};
use crate::{ExtractionError, Result};

const DOC_PREFIXES: &[&str] = &["///", "//!", "/**"];
const IDENTIFIER_KINDS: &[&str] = &["identifier"];
const CALL_PARENTS: &[&str] = &["call_expression"];
const WRITE_PARENTS: &[&str] = &["assignment_expression", "let_declaration"];

pub struct RustPack {
    language: tree_sitter::Language,
}

impl RustPack {
    pub fn new() -> Result<Self> {
        Ok(Self { language: language::tree_sitter_language(LanguageFamily::Rust)? })
    }

    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractionError::TreeSitter(e.to_string()))?;
        Ok(parser)
    }
}

impl LanguagePack for RustPack {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::Rust
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<ExtractionResult> {
        let mut parser = self.parser()?;
        let tree = parser
            .parse(input.source, None)
            .ok_or_else(|| ExtractionError::Parse("tree-sitter produced no tree".to_string()))?;
        let root = tree.root_node();

        let mut defs = Vec::new();
        let mut imports = Vec::new();
        let mut scopes = Vec::new();
        let mut def_name_node_ids = HashSet::new();
        let mut next_scope_id = 1u64;

        scopes.push(Scope {
            file_id: input.file_id,
            kind: ScopeKind::Module,
            span: span_of(root),
            parent: None,
            scope_id: 0,
        });

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "use_declaration" => {
                    if let Some(import) = import_fact(input, child) {
                        imports.push(import);
                    }
                }
                "function_item" => {
                    push_leaf_def(
                        input,
                        child,
                        DefKind::Function,
                        None,
                        &mut defs,
                        &mut scopes,
                        &mut def_name_node_ids,
                        &mut next_scope_id,
                    );
                }
                "struct_item" => push_simple_def(input, child, DefKind::Struct, &mut defs, &mut def_name_node_ids),
                "enum_item" => push_simple_def(input, child, DefKind::Enum, &mut defs, &mut def_name_node_ids),
                "trait_item" => push_simple_def(input, child, DefKind::Trait, &mut defs, &mut def_name_node_ids),
                "mod_item" => push_simple_def(input, child, DefKind::Module, &mut defs, &mut def_name_node_ids),
                "const_item" => push_simple_def(input, child, DefKind::Constant, &mut defs, &mut def_name_node_ids),
                "static_item" => push_simple_def(input, child, DefKind::Variable, &mut defs, &mut def_name_node_ids),
                "impl_item" => {
                    let target = impl_target_name(input.source, child);
                    if let Some(body) = first_named_child(child, &["declaration_list"]) {
                        let mut inner = body.walk();
                        for member in body.children(&mut inner) {
                            match member.kind() {
                                "function_item" => push_leaf_def(
                                    input,
                                    member,
                                    DefKind::Method,
                                    target.as_deref(),
                                    &mut defs,
                                    &mut scopes,
                                    &mut def_name_node_ids,
                                    &mut next_scope_id,
                                ),
                                "const_item" => push_simple_def(
                                    input,
                                    member,
                                    DefKind::Constant,
                                    &mut defs,
                                    &mut def_name_node_ids,
                                ),
                                _ => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        let known_names: HashSet<String> = defs.iter().map(|d| d.name.clone()).collect();
        let (refs, _candidate_names) = crate::packs::common::collect_same_file_refs(
            input.source,
            root,
            input.file_id,
            input.created_epoch,
            IDENTIFIER_KINDS,
            CALL_PARENTS,
            WRITE_PARENTS,
            &def_name_node_ids,
            &known_names,
        );

        Ok(ExtractionResult { defs, refs, imports, scopes })
    }
}

fn import_fact(input: &ExtractionInput<'_>, node: Node) -> Option<ImportFact> {
    let text = text_of(input.source, node).trim_end_matches(';').to_string();
    Some(ImportFact {
        file_id: input.file_id,
        kind: "use".to_string(),
        source_literal: text.clone(),
        resolved_target_path: None,
        is_star: text.ends_with("::*"),
    })
}

fn impl_target_name(source: &str, impl_node: Node) -> Option<String> {
    let mut cursor = impl_node.walk();
    for child in impl_node.children(&mut cursor) {
        if matches!(child.kind(), "type_identifier" | "generic_type" | "scoped_type_identifier") {
            return Some(text_of(source, child).to_string());
        }
    }
    None
}

fn def_name<'a>(source: &str, node: Node<'a>) -> Option<(String, Node<'a>)> {
    first_named_child(node, &["identifier", "type_identifier"]).map(|n| (text_of(source, n).to_string(), n))
}

fn push_simple_def(
    input: &ExtractionInput<'_>,
    node: Node,
    kind: DefKind,
    defs: &mut Vec<DefFact>,
    def_name_node_ids: &mut HashSet<usize>,
) {
    let Some((name, name_node)) = def_name(input.source, node) else { return };
    def_name_node_ids.insert(name_node.id());
    let signature_text = signature_line(input.source, node);
    let sig_hash = def_uid::signature_hash(&signature_text);
    let def_uid = def_uid::compute(input.context_id, &name, kind, &sig_hash);
    defs.push(DefFact {
        def_uid,
        file_id: input.file_id,
        unit: LanguageFamily::Rust,
        kind,
        name: name.clone(),
        lexical_path: name,
        qualified_path: None,
        span: span_of(node),
        signature_hash: sig_hash,
        signature_text: Some(signature_text),
        docstring: doc_comment_before(input.source, node, DOC_PREFIXES),
        decorators: Vec::new(),
        return_type: None,
        created_epoch: input.created_epoch,
    });
}

#[allow(clippy::too_many_arguments)]
fn push_leaf_def(
    input: &ExtractionInput<'_>,
    node: Node,
    kind: DefKind,
    owner: Option<&str>,
    defs: &mut Vec<DefFact>,
    scopes: &mut Vec<Scope>,
    def_name_node_ids: &mut HashSet<usize>,
    next_scope_id: &mut u64,
) {
    let Some((name, name_node)) = def_name(input.source, node) else { return };
    def_name_node_ids.insert(name_node.id());
    let lexical_path = match owner {
        Some(owner) => format!("{owner}::{name}"),
        None => name.clone(),
    };
    let signature_text = signature_line(input.source, node);
    let sig_hash = def_uid::signature_hash(&signature_text);
    let def_uid = def_uid::compute(input.context_id, &lexical_path, kind, &sig_hash);
    let return_type = signature_text.rsplit_once("->").map(|(_, rhs)| rhs.trim_end_matches('{').trim().to_string());

    scopes.push(Scope {
        file_id: input.file_id,
        kind: ScopeKind::Function,
        span: span_of(node),
        parent: Some(0),
        scope_id: *next_scope_id,
    });
    *next_scope_id += 1;

    defs.push(DefFact {
        def_uid,
        file_id: input.file_id,
        unit: LanguageFamily::Rust,
        kind,
        name,
        lexical_path: lexical_path.clone(),
        qualified_path: Some(lexical_path),
        span: span_of(node),
        signature_hash: sig_hash,
        signature_text: Some(signature_text),
        docstring: doc_comment_before(input.source, node, DOC_PREFIXES),
        decorators: Vec::new(),
        return_type,
        created_epoch: input.created_epoch,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> ExtractionResult {
        let pack = RustPack::new().unwrap();
        let input = ExtractionInput { file_id: 1, context_id: 1, source, created_epoch: 1 };
        pack.extract(&input).unwrap()
    }

    #[test]
    fn extracts_function_and_struct() {
        let result = extract(
            r#"
/// Adds two numbers.
fn add(a: i32, b: i32) -> i32 {
    a + b
}

struct Point {
    x: i32,
    y: i32,
}
"#,
        );
        assert!(result.defs.iter().any(|d| d.name == "add" && d.kind == DefKind::Function));
        let add = result.defs.iter().find(|d| d.name == "add").unwrap();
        assert_eq!(add.docstring.as_deref(), Some("/// Adds two numbers."));
        assert!(result.defs.iter().any(|d| d.name == "Point" && d.kind == DefKind::Struct));
    }

    #[test]
    fn extracts_impl_methods_with_qualified_path() {
        let result = extract(
            r#"
struct Counter { n: i32 }

impl Counter {
    fn increment(&mut self) {
        self.n += 1;
    }
}
"#,
        );
        let method = result.defs.iter().find(|d| d.kind == DefKind::Method).unwrap();
        assert_eq!(method.lexical_path, "Counter::increment");
    }

    #[test]
    fn extracts_use_declaration_as_import() {
        let result = extract("use std::collections::HashMap;\n\nfn f() {}\n");
        assert_eq!(result.imports.len(), 1);
        assert!(!result.imports[0].is_star);
    }

    #[test]
    fn star_import_is_flagged() {
        let result = extract("use std::collections::*;\n");
        assert!(result.imports[0].is_star);
    }

    #[test]
    fn same_file_call_becomes_ref_with_call_role() {
        let result = extract(
            r#"
fn helper() -> i32 { 1 }

fn caller() -> i32 {
    helper()
}
"#,
        );
        assert!(result
            .refs
            .iter()
            .any(|r| r.token == "helper" && r.role == codeplane_protocol::RefRole::Call));
    }
}
