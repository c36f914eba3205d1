//! Phase A: scan the repo tree for marker files, producing one candidate
//! context per match (SPEC §4.3).

use std::path::Path;

use codeplane_protocol::LanguageFamily;
use ignore::WalkBuilder;

use crate::{CandidateContext, Result};

/// Prunable directories no context ever needs to see (SPEC §6).
pub const UNIVERSAL_EXCLUDES: &[&str] = &[
    ".git/**",
    "node_modules/**",
    "__pycache__/**",
    ".venv/**",
    "venv/**",
    "target/**",
    "dist/**",
    "build/**",
    ".next/**",
    "vendor/**",
    ".mypy_cache/**",
    ".pytest_cache/**",
];

fn universal_excludes() -> Vec<String> {
    UNIVERSAL_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

/// Marker file name -> the family it's authoritative for (SPEC §4.3 Phase A/B:
/// every marker here is unambiguous, so the authority filter is the identity
/// map over this table).
fn marker_family(file_name: &str) -> Option<LanguageFamily> {
    match file_name {
        "Cargo.toml" => Some(LanguageFamily::Rust),
        "pyproject.toml" | "setup.py" | "setup.cfg" => Some(LanguageFamily::Python),
        "package.json" => Some(LanguageFamily::JavaScript),
        "tsconfig.json" => Some(LanguageFamily::TypeScript),
        "go.mod" => Some(LanguageFamily::Go),
        "pom.xml" | "build.gradle" | "build.gradle.kts" => Some(LanguageFamily::Java),
        "CMakeLists.txt" => Some(LanguageFamily::Cpp),
        "Gemfile" => Some(LanguageFamily::Ruby),
        "composer.json" => Some(LanguageFamily::Php),
        _ => None,
    }
}

/// Extension -> family, for the fallback root context (SPEC §4.3 Phase E).
pub fn include_glob_for(family: LanguageFamily) -> Vec<String> {
    let exts: &[&str] = match family {
        LanguageFamily::Rust => &["**/*.rs"],
        LanguageFamily::Python => &["**/*.py", "**/*.pyi"],
        LanguageFamily::JavaScript => &["**/*.js", "**/*.jsx", "**/*.mjs", "**/*.cjs"],
        LanguageFamily::TypeScript => &["**/*.ts", "**/*.tsx", "**/*.mts", "**/*.cts"],
        LanguageFamily::Go => &["**/*.go"],
        LanguageFamily::Java => &["**/*.java"],
        LanguageFamily::C => &["**/*.c", "**/*.h"],
        LanguageFamily::Cpp => &["**/*.cc", "**/*.cpp", "**/*.cxx", "**/*.hpp", "**/*.hxx"],
        LanguageFamily::CSharp => &["**/*.cs"],
        LanguageFamily::Ruby => &["**/*.rb"],
        LanguageFamily::Php => &["**/*.php"],
        LanguageFamily::Other => &["**/*"],
    };
    exts.iter().map(|s| s.to_string()).collect()
}

/// Walk `root`, collecting a candidate context for every directory holding a
/// recognised marker file, plus the universal extension-based root fallback
/// context (Phase E).
pub fn scan(root: &Path) -> Result<Vec<CandidateContext>> {
    let mut candidates = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !UNIVERSAL_EXCLUDES.iter().any(|p| p.trim_end_matches("/**") == name)
        })
        .build();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let Some(family) = marker_family(&file_name) else { continue };

        let dir = entry.path().parent().unwrap_or(root);
        let rel = dir.strip_prefix(root).unwrap_or(dir);
        let root_path = rel.to_string_lossy().replace('\\', "/");
        let root_path = if root_path == "." { String::new() } else { root_path };

        if candidates.iter().any(|c: &CandidateContext| c.root_path == root_path && c.language_family == family) {
            continue;
        }
        let mut ctx = CandidateContext::new(root_path, family);
        ctx.include_glob = include_glob_for(family);
        candidates.push(ctx);
    }

    // Phase E fallback: an extension-routed root context always exists so an
    // unrouted file still lands somewhere.
    let mut fallback = CandidateContext::new(String::new(), LanguageFamily::Other);
    fallback.include_glob = include_glob_for(LanguageFamily::Other);
    candidates.push(fallback);

    Ok(candidates)
}

pub fn default_universal_excludes() -> Vec<String> {
    universal_excludes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_cargo_and_nested_python_marker() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();
        fs::create_dir_all(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("scripts/pyproject.toml"), "[project]\n").unwrap();

        let candidates = scan(dir.path()).unwrap();
        assert!(candidates.iter().any(|c| c.root_path.is_empty() && c.language_family == LanguageFamily::Rust));
        assert!(candidates.iter().any(|c| c.root_path == "scripts" && c.language_family == LanguageFamily::Python));
    }

    #[test]
    fn always_includes_fallback_root_context() {
        let dir = tempdir().unwrap();
        let candidates = scan(dir.path()).unwrap();
        assert!(candidates.iter().any(|c| c.language_family == LanguageFamily::Other && c.root_path.is_empty()));
    }
}
