//! Artifact classification shared by the resolver's star-import handling and
//! recon's edit-likelihood scoring (SPEC_FULL §C.2 — one classifier, two call
//! sites). Path-first, falls back to a cheap content sniff for `Barrel` and
//! `Generated`, which can't be told from the path alone.

use codeplane_protocol::ArtifactKind;

pub fn classify(repo_relative_path: &str, content: &str) -> ArtifactKind {
    let lower = repo_relative_path.to_ascii_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);

    if is_doc_path(&lower, file_name) {
        return ArtifactKind::Doc;
    }
    if is_config_path(&lower, file_name) {
        return ArtifactKind::Config;
    }
    if is_test_path(&lower, file_name) {
        return ArtifactKind::Test;
    }
    if is_generated(&lower, content) {
        return ArtifactKind::Generated;
    }
    if is_barrel(file_name, content) {
        return ArtifactKind::Barrel;
    }
    ArtifactKind::Production
}

fn is_test_path(lower: &str, file_name: &str) -> bool {
    lower.contains("/test/")
        || lower.contains("/tests/")
        || lower.contains("/__tests__/")
        || lower.contains("/spec/")
        || file_name.starts_with("test_")
        || file_name.ends_with("_test.rs")
        || file_name.ends_with("_test.py")
        || file_name.ends_with(".test.js")
        || file_name.ends_with(".test.ts")
        || file_name.ends_with(".spec.js")
        || file_name.ends_with(".spec.ts")
}

fn is_doc_path(lower: &str, file_name: &str) -> bool {
    lower.starts_with("docs/")
        || lower.contains("/docs/")
        || file_name.ends_with(".md")
        || file_name.ends_with(".rst")
        || file_name.ends_with(".adoc")
}

fn is_config_path(_lower: &str, file_name: &str) -> bool {
    matches!(
        file_name,
        "cargo.toml" | "package.json" | "pyproject.toml" | "tsconfig.json" | "go.mod"
    ) || file_name.ends_with(".toml")
        || file_name.ends_with(".yaml")
        || file_name.ends_with(".yml")
        || file_name.ends_with(".ini")
        || file_name.ends_with(".cfg")
}

fn is_generated(lower: &str, content: &str) -> bool {
    lower.contains("/generated/")
        || lower.contains("/.generated/")
        || lower.ends_with(".pb.rs")
        || lower.ends_with("_pb2.py")
        || content
            .lines()
            .take(5)
            .any(|l| l.contains("@generated") || l.contains("DO NOT EDIT"))
}

/// A barrel file re-exports other modules rather than defining behaviour
/// itself: `index.ts`/`__init__.py`/`mod.rs` whose body is overwhelmingly
/// import/export statements.
fn is_barrel(file_name: &str, content: &str) -> bool {
    let is_barrel_name = matches!(file_name, "index.ts" | "index.js" | "__init__.py" | "mod.rs");
    if !is_barrel_name {
        return false;
    }
    let mut code_lines = 0usize;
    let mut reexport_lines = 0usize;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
            continue;
        }
        code_lines += 1;
        if trimmed.starts_with("export ")
            || trimmed.starts_with("from ")
            || trimmed.starts_with("import ")
            || trimmed.starts_with("pub use ")
            || trimmed.starts_with("pub mod ")
            || trimmed.starts_with("mod ")
        {
            reexport_lines += 1;
        }
    }
    code_lines > 0 && reexport_lines * 4 >= code_lines * 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_test_paths() {
        assert_eq!(classify("crates/foo/tests/basic.rs", ""), ArtifactKind::Test);
        assert_eq!(classify("src/test_utils.py", ""), ArtifactKind::Test);
    }

    #[test]
    fn classifies_config_and_doc() {
        assert_eq!(classify("Cargo.toml", ""), ArtifactKind::Config);
        assert_eq!(classify("docs/guide.md", ""), ArtifactKind::Doc);
    }

    #[test]
    fn classifies_barrel_file() {
        let content = "pub mod a;\npub mod b;\npub use a::Thing;\n";
        assert_eq!(classify("crates/foo/src/mod.rs", content), ArtifactKind::Barrel);
    }

    #[test]
    fn non_barrel_mod_rs_is_production() {
        let content = "pub mod a;\n\nfn helper() -> i32 {\n    compute_real_logic()\n}\n";
        assert_eq!(classify("crates/foo/src/mod.rs", content), ArtifactKind::Production);
    }

    #[test]
    fn classifies_generated_marker() {
        let content = "// @generated by protoc\nstruct Foo;\n";
        assert_eq!(classify("src/foo.rs", content), ArtifactKind::Generated);
    }
}
