use std::collections::HashSet;

use codeplane_protocol::{DefFact, DefKind, ImportFact, LanguageFamily, Scope, ScopeKind};
use tree_sitter::{Node, Parser};

use crate::def_uid;
use crate::language;
use crate::pack::{ExtractionInput, ExtractionResult, LanguagePack};
use crate::packs::common::{first_named_child, signature_line, span_of, text_of};
use crate::{ExtractionError, Result};

const IDENTIFIER_KINDS: &[&str] = &["identifier"];
const CALL_PARENTS: &[&str] = &["call"];
const WRITE_PARENTS: &[&str] = &["assignment"];

pub struct PythonPack {
    language: tree_sitter::Language,
}

impl PythonPack {
    pub fn new() -> Result<Self> {
        Ok(Self { language: language::tree_sitter_language(LanguageFamily::Python)? })
    }

    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractionError::TreeSitter(e.to_string()))?;
        Ok(parser)
    }
}

impl LanguagePack for PythonPack {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::Python
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
                "import_statement" | "import_from_statement" => {
                    imports.push(import_fact(input, child));
                }
                "function_definition" => push_def(
                    input,
                    child,
                    DefKind::Function,
                    None,
                    &mut defs,
                    &mut scopes,
                    &mut def_name_node_ids,
                    &mut next_scope_id,
                ),
                "class_definition" => {
                    let Some((class_name, name_node)) = def_name(input.source, child) else { continue };
                    def_name_node_ids.insert(name_node.id());
                    push_class(input, child, &class_name, &mut defs, &mut def_name_node_ids);
                    if let Some(body) = first_named_child(child, &["block"]) {
                        let mut inner = body.walk();
                        for member in body.children(&mut inner) {
                            if member.kind() == "function_definition" {
                                push_def(
                                    input,
                                    member,
                                    DefKind::Method,
                                    Some(&class_name),
                                    &mut defs,
                                    &mut scopes,
                                    &mut def_name_node_ids,
                                    &mut next_scope_id,
                                );
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

fn import_fact(input: &ExtractionInput<'_>, node: Node) -> ImportFact {
    let text = text_of(input.source, node).to_string();
    ImportFact {
        file_id: input.file_id,
        kind: if node.kind() == "import_from_statement" { "from_import".to_string() } else { "import".to_string() },
        source_literal: text.clone(),
        resolved_target_path: None,
        is_star: text.trim_end().ends_with("import *"),
    }
}

fn def_name<'a>(source: &str, node: Node<'a>) -> Option<(String, Node<'a>)> {
    first_named_child(node, &["identifier"]).map(|n| (text_of(source, n).to_string(), n))
}

/// A Python docstring is the body's first statement, not a comment before
/// the `def`/`class` — different shape from the C-family doc-comment scan.
fn docstring_of(source: &str, def_node: Node) -> Option<String> {
    let body = first_named_child(def_node, &["block"])?;
    let first_stmt = body.named_child(0)?;
    if first_stmt.kind() != "expression_statement" {
        return None;
    }
    let expr = first_stmt.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(text_of(source, expr).trim_matches(['"', '\'']).trim().to_string())
}

fn push_class(
    input: &ExtractionInput<'_>,
    node: Node,
    name: &str,
    defs: &mut Vec<DefFact>,
    _def_name_node_ids: &mut HashSet<usize>,
) {
    let signature_text = signature_line(input.source, node);
    let sig_hash = def_uid::signature_hash(&signature_text);
    let def_uid = def_uid::compute(input.context_id, name, DefKind::Class, &sig_hash);
    defs.push(DefFact {
        def_uid,
        file_id: input.file_id,
        unit: LanguageFamily::Python,
        kind: DefKind::Class,
        name: name.to_string(),
        lexical_path: name.to_string(),
        qualified_path: None,
        span: span_of(node),
        signature_hash: sig_hash,
        signature_text: Some(signature_text),
        docstring: docstring_of(input.source, node),
        decorators: Vec::new(),
        return_type: None,
        created_epoch: input.created_epoch,
    });
}

#[allow(clippy::too_many_arguments)]
fn push_def(
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
        Some(owner) => format!("{owner}.{name}"),
        None => name.clone(),
    };
    let signature_text = signature_line(input.source, node);
    let sig_hash = def_uid::signature_hash(&signature_text);
    let def_uid = def_uid::compute(input.context_id, &lexical_path, kind, &sig_hash);

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
        unit: LanguageFamily::Python,
        kind,
        name,
        lexical_path: lexical_path.clone(),
        qualified_path: Some(lexical_path),
        span: span_of(node),
        signature_hash: sig_hash,
        signature_text: Some(signature_text),
        docstring: docstring_of(input.source, node),
        decorators: Vec::new(),
        return_type: None,
        created_epoch: input.created_epoch,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> ExtractionResult {
        let pack = PythonPack::new().unwrap();
        let input = ExtractionInput { file_id: 1, context_id: 1, source, created_epoch: 1 };
        pack.extract(&input).unwrap()
    }

    #[test]
    fn extracts_function_with_docstring() {
        let result = extract(
            "def greet(name):\n    \"\"\"Say hello.\"\"\"\n    return f\"hello {name}\"\n",
        );
        let greet = result.defs.iter().find(|d| d.name == "greet").unwrap();
        assert_eq!(greet.docstring.as_deref(), Some("Say hello."));
    }

    #[test]
    fn extracts_class_and_methods_with_dotted_path() {
        let result = extract("class Widget:\n    def render(self):\n        pass\n");
        let method = result.defs.iter().find(|d| d.kind == DefKind::Method).unwrap();
        assert_eq!(method.lexical_path, "Widget.render");
    }

    #[test]
    fn extracts_from_import() {
        let result = extract("from collections import OrderedDict\n");
        assert_eq!(result.imports[0].kind, "from_import");
    }
}
