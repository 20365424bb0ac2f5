//! Payload verification against the task's expected digest.

use crate::checksum::{digest_hex, ExpectedDigest};
use crate::error::{PipelineError, Result};
use crate::storage;
use std::io::Write;
use std::path::Path;

/// Checks `data` against `expected`.
///
/// On a mismatch the payload is written verbatim to `fallback_path` for later
/// inspection and `ChecksumMismatch` is returned. Console lines go to `console`.
pub fn verify_download(
    url: &str,
    data: &[u8],
    expected: &ExpectedDigest,
    fallback_path: &Path,
    console: &mut dyn Write,
) -> Result<()> {
    let actual = digest_hex(expected.algorithm(), data);
    if expected.matches(&actual) {
        tracing::info!(url, algorithm = %expected.algorithm(), "checksum ok");
        let _ = writeln!(console, "Verifying: OK");
        return Ok(());
    }

    tracing::warn!(
        url,
        expected = expected.as_hex(),
        actual = %actual,
        "checksum mismatch"
    );

    let preserved = match storage::write_file(fallback_path, data) {
        Ok(()) => {
            let _ = writeln!(
                console,
                "Verifying: Failed!  Download left in {}",
                fallback_path.display()
            );
            Some(fallback_path.to_path_buf())
        }
        Err(e) => {
            tracing::warn!("could not keep rejected download: {}", e);
            let _ = writeln!(console, "Verifying: Failed!");
            None
        }
    };

    Err(PipelineError::ChecksumMismatch {
        url: url.to_string(),
        expected: expected.as_hex().to_string(),
        actual,
        preserved,
    })
}
