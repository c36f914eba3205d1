use std::collections::HashSet;

use codeplane_protocol::{DefFact, DefKind, ImportFact, LanguageFamily, Scope, ScopeKind};
use tree_sitter::{Node, Parser};

use crate::def_uid;
use crate::language;
use crate::pack::{ExtractionInput, ExtractionResult, LanguagePack};
use crate::packs::common::{doc_comment_before, first_named_child, signature_line, span_of, text_of};
use crate::{ExtractionError, Result};

const DOC_PREFIXES: &[&str] = &["//", "/*", "*"];
const IDENTIFIER_KINDS: &[&str] = &["identifier", "property_identifier"];
const CALL_PARENTS: &[&str] = &["call_expression"];
const WRITE_PARENTS: &[&str] = &["assignment_expression"];

/// Handles both JavaScript and TypeScript — the grammars share almost every
/// node kind this pass cares about; TypeScript only adds `interface`/`enum`.
pub struct JavaScriptPack {
    language: tree_sitter::Language,
    family: LanguageFamily,
}

impl JavaScriptPack {
    pub fn new(typescript: bool) -> Result<Self> {
        let family = if typescript { LanguageFamily::TypeScript } else { LanguageFamily::JavaScript };
        Ok(Self { language: language::tree_sitter_language(family)?, family })
    }

    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractionError::TreeSitter(e.to_string()))?;
        Ok(parser)
    }
}

impl LanguagePack for JavaScriptPack {
    fn family(&self) -> LanguageFamily {
        self.family
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
                "import_statement" => imports.push(import_fact(input, child)),
                "function_declaration" => self.push_def(
                    input,
                    child,
                    DefKind::Function,
                    None,
                    &mut defs,
                    &mut scopes,
                    &mut def_name_node_ids,
                    &mut next_scope_id,
                ),
                "interface_declaration" => {
                    self.push_simple_def(input, child, DefKind::Interface, &mut defs, &mut def_name_node_ids)
                }
                "enum_declaration" => {
                    self.push_simple_def(input, child, DefKind::Enum, &mut defs, &mut def_name_node_ids)
                }
                "class_declaration" => {
                    let Some((class_name, name_node)) = def_name(input.source, child) else { continue };
                    def_name_node_ids.insert(name_node.id());
                    self.push_simple_def(input, child, DefKind::Class, &mut defs, &mut def_name_node_ids);
                    if let Some(body) = first_named_child(child, &["class_body"]) {
                        let mut inner = body.walk();
                        for member in body.children(&mut inner) {
                            if matches!(member.kind(), "method_definition") {
                                self.push_def(
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

impl JavaScriptPack {
    fn push_simple_def(
        &self,
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
            unit: self.family,
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
    fn push_def(
        &self,
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
            unit: self.family,
            kind,
            name,
            lexical_path: lexical_path.clone(),
            qualified_path: Some(lexical_path),
            span: span_of(node),
            signature_hash: sig_hash,
            signature_text: Some(signature_text),
            docstring: doc_comment_before(input.source, node, DOC_PREFIXES),
            decorators: Vec::new(),
            return_type: None,
            created_epoch: input.created_epoch,
        });
    }
}

fn import_fact(input: &ExtractionInput<'_>, node: Node) -> ImportFact {
    let text = text_of(input.source, node).trim_end_matches(';').to_string();
    let is_star = text.contains("* as");
    ImportFact {
        file_id: input.file_id,
        kind: "import".to_string(),
        source_literal: text,
        resolved_target_path: None,
        is_star,
    }
}

fn def_name<'a>(source: &str, node: Node<'a>) -> Option<(String, Node<'a>)> {
    first_named_child(node, &["identifier", "property_identifier", "type_identifier"])
        .map(|n| (text_of(source, n).to_string(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_js(source: &str) -> ExtractionResult {
        let pack = JavaScriptPack::new(false).unwrap();
        let input = ExtractionInput { file_id: 1, context_id: 1, source, created_epoch: 1 };
        pack.extract(&input).unwrap()
    }

    fn extract_ts(source: &str) -> ExtractionResult {
        let pack = JavaScriptPack::new(true).unwrap();
        let input = ExtractionInput { file_id: 1, context_id: 1, source, created_epoch: 1 };
        pack.extract(&input).unwrap()
    }

    #[test]
    fn extracts_function_declaration() {
        let result = extract_js("function add(a, b) {\n  return a + b;\n}\n");
        assert!(result.defs.iter().any(|d| d.name == "add" && d.kind == DefKind::Function));
    }

    #[test]
    fn extracts_class_methods_with_dotted_path() {
        let result = extract_js("class Widget {\n  render() {\n    return 1;\n  }\n}\n");
        let method = result.defs.iter().find(|d| d.kind == DefKind::Method).unwrap();
        assert_eq!(method.lexical_path, "Widget.render");
    }

    #[test]
    fn typescript_extracts_interface_and_enum() {
        let result = extract_ts("interface Point {\n  x: number;\n  y: number;\n}\n\nenum Color { Red, Green }\n");
        assert!(result.defs.iter().any(|d| d.kind == DefKind::Interface && d.name == "Point"));
        assert!(result.defs.iter().any(|d| d.kind == DefKind::Enum && d.name == "Color"));
    }

    #[test]
    fn import_statement_recorded() {
        let result = extract_js("import { useState } from 'react';\n");
        assert_eq!(result.imports.len(), 1);
        assert!(!result.imports[0].is_star);
    }
}
