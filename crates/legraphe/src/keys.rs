//! Deterministic vertex keys
//!
//! Keys are the first 16 hex characters of a BLAKE3 digest over a namespaced,
//! trimmed input. The same author name, tag identifier or caption always maps
//! to the same key, which is what makes ingestion an idempotent upsert.

/// Hex characters kept from the digest
const KEY_LEN: usize = 16;

fn derive(namespace: &str, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(text.trim().as_bytes());
    hasher.finalize().to_hex()[..KEY_LEN].to_string()
}

/// Key of the author with this display name
pub fn author_key(name: &str) -> String {
    derive("author", name)
}

/// Key of a tag, preferring the annotation model's identifier
pub fn tag_key(label: &str, model_id: Option<&str>) -> String {
    match model_id.map(str::trim).filter(|mid| !mid.is_empty()) {
        Some(mid) => derive("mid", mid),
        None => derive("tag", label),
    }
}

/// Key of a best-guess caption
pub fn guess_key(caption: &str) -> String {
    derive("guess", caption)
}

/// Key of the edge between a metadata vertex and an image
pub fn edge_key(metadata_key: &str, image_key: &str) -> String {
    format!("{}-{}", metadata_key, image_key)
}
