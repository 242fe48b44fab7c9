use sha2::{Digest, Sha256};

/// Deterministic fingerprint over a policy's content: SHA-256 of the title
/// bytes, then the body bytes if present, then the attachment bytes if
/// present, hex-encoded.
///
/// The concatenation order is fixed and absent optionals contribute nothing
/// (so `None` and `Some("")` produce the same digest). Any change here would
/// invalidate every stored fingerprint, so it must stay byte-for-byte
/// compatible.
pub fn content_fingerprint(title: &str, body: Option<&str>, file: Option<&[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    if let Some(body) = body {
        hasher.update(body.as_bytes());
    }
    if let Some(file) = file {
        hasher.update(file);
    }
    hex::encode(hasher.finalize())
}

/// Re-check stored content against a previously pinned fingerprint.
pub fn verify_fingerprint(
    expected: &str,
    title: &str,
    body: Option<&str>,
    file: Option<&[u8]>,
) -> bool {
    content_fingerprint(title, body, file) == expected
}
