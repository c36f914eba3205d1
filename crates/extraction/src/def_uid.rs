//! Definition-UID hashing (SPEC §3): stable identity for a symbol across
//! commits, built from `(owning context, lexical_path, kind, signature_hash)`.
//! Two defs with the same name but a different signature (overload, arity
//! change) get different UIDs; the same def surviving an unrelated edit
//! elsewhere in the file keeps its UID.

use codeplane_protocol::DefKind;
use sha2::{Digest, Sha256};

pub fn signature_hash(signature_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signature_text.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn compute(context_id: i64, lexical_path: &str, kind: DefKind, signature_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(context_id.to_le_bytes());
    hasher.update(b"\0");
    hasher.update(lexical_path.as_bytes());
    hasher.update(b"\0");
    hasher.update(format!("{kind:?}").as_bytes());
    hasher.update(b"\0");
    hasher.update(signature_hash.as_bytes());
    hex::encode(hasher.finalize())
}

// Tiny local hex encoder: avoids pulling in the `hex` crate for eight lines
// of `{:02x}` formatting.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.as_ref().len() * 2);
        for b in bytes.as_ref() {
            let _ = write!(out, "{b:02x}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_signature_same_uid() {
        let sig = signature_hash("fn foo(x: i32) -> i32");
        let a = compute(1, "Foo.bar", DefKind::Function, &sig);
        let b = compute(1, "Foo.bar", DefKind::Function, &sig);
        assert_eq!(a, b);
    }

    #[test]
    fn different_signature_different_uid() {
        let sig_a = signature_hash("fn foo(x: i32) -> i32");
        let sig_b = signature_hash("fn foo(x: i32, y: i32) -> i32");
        let a = compute(1, "Foo.bar", DefKind::Function, &sig_a);
        let b = compute(1, "Foo.bar", DefKind::Function, &sig_b);
        assert_ne!(a, b);
    }

    #[test]
    fn different_context_different_uid() {
        let sig = signature_hash("fn foo()");
        let a = compute(1, "Foo.bar", DefKind::Function, &sig);
        let b = compute(2, "Foo.bar", DefKind::Function, &sig);
        assert_ne!(a, b);
    }
}
