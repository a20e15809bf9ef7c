//! Cell identity and artifact naming.
//!
//! A cell's identity is the first 12 hex characters of the SHA-1 digest of
//! the most specific signal the host offers, in priority order:
//!
//! 1. the stable cell identifier from the execute-request metadata
//!    (`cellId`, with `cell_id` accepted as an alias),
//! 2. the raw source text of the most recently executed input,
//! 3. the figure object's instance token (unstable across processes, and
//!    even across re-executions of the literal same cell).
//!
//! Artifact names are `{identity}_{sequence}.{extension}`, so the identity
//! can be recovered from any well-formed file name on disk.

use std::fmt;

use sha1::{Digest, Sha1};

use crate::figure::{Figure, ImageFormat};
use crate::host::HostSession;

/// Length of an identity in hex characters.
pub const IDENTITY_LEN: usize = 12;

/// Stable short digest identifying the logical cell that produced a figure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellIdentity(String);

impl CellIdentity {
    /// Derive the identity for the currently executing cell.
    pub fn derive(host: &dyn HostSession, figure: &dyn Figure) -> CellIdentity {
        if let Some(cell_id) = stable_cell_id(host) {
            return CellIdentity::digest(cell_id.as_bytes());
        }
        if let Some(raw) = host.last_raw_input() {
            if !raw.trim().is_empty() {
                return CellIdentity::digest(raw.as_bytes());
            }
        }
        CellIdentity::digest(figure.instance_token().to_string().as_bytes())
    }

    /// Digest arbitrary bytes into an identity.
    pub fn digest(input: &[u8]) -> CellIdentity {
        let hash = Sha1::digest(input);
        CellIdentity(hex::encode(&hash[..IDENTITY_LEN / 2]))
    }

    /// Validate a string already shaped like an identity.
    pub fn parse(s: &str) -> Option<CellIdentity> {
        if s.len() == IDENTITY_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(CellIdentity(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable cell identifier from the current request metadata, if offered.
fn stable_cell_id(host: &dyn HostSession) -> Option<String> {
    let metadata = host.request_metadata()?;
    let id = metadata
        .get("cellId")
        .or_else(|| metadata.get("cell_id"))?
        .as_str()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Current execution counter, falling back to wall-clock seconds.
///
/// The fallback keeps names unique but is not monotonic across clock
/// adjustments.
pub fn execution_counter(host: &dyn HostSession) -> u64 {
    match host.execution_count() {
        Some(n) => n,
        None => chrono::Utc::now().timestamp().max(0) as u64,
    }
}

/// Compose an artifact file name from its parts.
pub fn artifact_file_name(identity: &CellIdentity, sequence: u32, format: ImageFormat) -> String {
    format!("{}_{}.{}", identity, sequence, format.extension())
}

/// Recover `(identity, sequence)` from an artifact file name.
///
/// Returns `None` for anything that does not match the scheme exactly;
/// callers treat such files as foreign and leave them alone.
pub fn parse_artifact_name(file_name: &str, format: ImageFormat) -> Option<(CellIdentity, u32)> {
    let stem = file_name.strip_suffix(&format!(".{}", format.extension()))?;
    let (id_part, seq_part) = stem.split_once('_')?;
    let identity = CellIdentity::parse(id_part)?;
    if seq_part.is_empty() || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sequence = seq_part.parse().ok()?;
    Some((identity, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFigure, FakeHost};

    #[test]
    fn test_digest_is_truncated_sha1() {
        // sha1("abc123") = 6367c48dd193d56ea7b0baad25b19455e529f5ee
        assert_eq!(CellIdentity::digest(b"abc123").as_str(), "6367c48dd193");
    }

    #[test]
    fn test_derive_prefers_cell_id_metadata() {
        let mut host = FakeHost::default();
        host.metadata = Some(serde_json::json!({ "cellId": "abc123" }));
        host.raw_input = Some("plot(x)".to_string());
        let figure = FakeFigure::new(7);

        let identity = CellIdentity::derive(&host, &figure);
        assert_eq!(identity, CellIdentity::digest(b"abc123"));
    }

    #[test]
    fn test_derive_accepts_cell_id_alias() {
        let mut host = FakeHost::default();
        host.metadata = Some(serde_json::json!({ "cell_id": "xyz" }));
        let figure = FakeFigure::new(7);

        let identity = CellIdentity::derive(&host, &figure);
        assert_eq!(identity, CellIdentity::digest(b"xyz"));
    }

    #[test]
    fn test_derive_falls_back_to_raw_input() {
        let mut host = FakeHost::default();
        host.raw_input = Some("plot(x)".to_string());
        let figure = FakeFigure::new(7);

        let identity = CellIdentity::derive(&host, &figure);
        assert_eq!(identity, CellIdentity::digest(b"plot(x)"));
    }

    #[test]
    fn test_derive_last_resort_is_instance_token() {
        let host = FakeHost::default();
        let figure = FakeFigure::new(42);

        let identity = CellIdentity::derive(&host, &figure);
        assert_eq!(identity, CellIdentity::digest(b"42"));
    }

    #[test]
    fn test_blank_raw_input_does_not_count() {
        let mut host = FakeHost::default();
        host.raw_input = Some("   \n".to_string());
        let figure = FakeFigure::new(42);

        let identity = CellIdentity::derive(&host, &figure);
        assert_eq!(identity, CellIdentity::digest(b"42"));
    }

    #[test]
    fn test_identity_shape() {
        let identity = CellIdentity::digest(b"anything");
        assert_eq!(identity.as_str().len(), IDENTITY_LEN);
        assert!(identity.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(CellIdentity::parse("6367c48dd193").is_some());
        assert!(CellIdentity::parse("6367c48dd19").is_none()); // too short
        assert!(CellIdentity::parse("6367c48dd1933").is_none()); // too long
        assert!(CellIdentity::parse("6367c48dd19z").is_none()); // not hex
    }

    #[test]
    fn test_artifact_name_roundtrip() {
        let identity = CellIdentity::digest(b"abc123");
        let name = artifact_file_name(&identity, 3, ImageFormat::Png);
        assert_eq!(name, "6367c48dd193_3.png");

        let (parsed, seq) = parse_artifact_name(&name, ImageFormat::Png).unwrap();
        assert_eq!(parsed, identity);
        assert_eq!(seq, 3);
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(parse_artifact_name("notes.png", ImageFormat::Png).is_none());
        assert!(parse_artifact_name("6367c48dd193_1.jpg", ImageFormat::Png).is_none());
        assert!(parse_artifact_name("6367c48dd193_x.png", ImageFormat::Png).is_none());
        assert!(parse_artifact_name("6367c48dd193_.png", ImageFormat::Png).is_none());
        assert!(parse_artifact_name("short_1.png", ImageFormat::Png).is_none());
    }

    #[test]
    fn test_execution_counter_prefers_host() {
        let mut host = FakeHost::default();
        host.execution_count = Some(17);
        assert_eq!(execution_counter(&host), 17);
    }

    #[test]
    fn test_execution_counter_fallback_is_nonzero() {
        let host = FakeHost::default();
        assert!(execution_counter(&host) > 0);
    }
}
