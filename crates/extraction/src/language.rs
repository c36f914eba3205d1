//! Extension/path → `LanguageFamily` detection and tree-sitter grammar lookup.
//!
//! The family set is closed (`codeplane_protocol::LanguageFamily`); this
//! module only adds the bits that are extraction-specific: which families
//! have a tree-sitter grammar wired up, and how to recognise one from a path.

use codeplane_protocol::LanguageFamily;

/// Detect a file's language family from its path. Falls back to `Other`,
/// which routes the file to discovery's extension-keyed fallback context
/// (SPEC §4.3 Phase E) rather than dropping it.
pub fn detect_family(path: &str) -> LanguageFamily {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "rs" => LanguageFamily::Rust,
        "py" | "pyi" => LanguageFamily::Python,
        "js" | "jsx" | "mjs" | "cjs" => LanguageFamily::JavaScript,
        "ts" | "tsx" | "mts" | "cts" => LanguageFamily::TypeScript,
        "go" => LanguageFamily::Go,
        "java" => LanguageFamily::Java,
        "c" | "h" => LanguageFamily::C,
        "cc" | "cpp" | "cxx" | "hpp" | "hxx" => LanguageFamily::Cpp,
        "cs" => LanguageFamily::CSharp,
        "rb" => LanguageFamily::Ruby,
        "php" => LanguageFamily::Php,
        _ => LanguageFamily::Other,
    }
}

/// Families with a structural `LanguagePack` (tree-sitter grammar present in
/// the workspace). Every other recognised family is registered lexical-only:
/// discovery still creates a `Context` for it and the indexer still feeds its
/// bytes to the lexical index, but no `DefFact`/`RefFact` is produced.
pub fn supports_ast(family: LanguageFamily) -> bool {
    matches!(
        family,
        LanguageFamily::Rust
            | LanguageFamily::Python
            | LanguageFamily::JavaScript
            | LanguageFamily::TypeScript
    )
}

pub fn tree_sitter_language(family: LanguageFamily) -> crate::Result<tree_sitter::Language> {
    match family {
        LanguageFamily::Rust => Ok(tree_sitter_rust::LANGUAGE.into()),
        LanguageFamily::Python => Ok(tree_sitter_python::LANGUAGE.into()),
        LanguageFamily::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
        LanguageFamily::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        other => Err(crate::ExtractionError::NoGrammar(other)),
    }
}

/// Line-comment / doc-comment prefixes, used by the per-language packs to
/// scan backwards from a definition for its leading docstring.
pub fn doc_comment_prefixes(family: LanguageFamily) -> &'static [&'static str] {
    match family {
        LanguageFamily::Rust => &["///", "//!", "/**"],
        LanguageFamily::Python => &["#", "\"\"\"", "'''"],
        LanguageFamily::JavaScript | LanguageFamily::TypeScript => &["//", "/*", "*"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(detect_family("src/main.rs"), LanguageFamily::Rust);
        assert_eq!(detect_family("pkg/util.py"), LanguageFamily::Python);
        assert_eq!(detect_family("app/index.tsx"), LanguageFamily::TypeScript);
        assert_eq!(detect_family("lib/thing.go"), LanguageFamily::Go);
    }

    #[test]
    fn unknown_extension_routes_to_other() {
        assert_eq!(detect_family("README.md"), LanguageFamily::Other);
        assert_eq!(detect_family("Makefile"), LanguageFamily::Other);
    }

    #[test]
    fn ast_support_matches_available_grammars() {
        assert!(supports_ast(LanguageFamily::Rust));
        assert!(supports_ast(LanguageFamily::TypeScript));
        assert!(!supports_ast(LanguageFamily::Go));
        assert!(!supports_ast(LanguageFamily::Java));
    }

    #[test]
    fn grammar_lookup_fails_for_lexical_only_family() {
        assert!(tree_sitter_language(LanguageFamily::Go).is_err());
        assert!(tree_sitter_language(LanguageFamily::Rust).is_ok());
    }
}
