use std::path::Path;
use tokio::fs;

/// Existence probe used by every conditional wiring step.
///
/// Any stat failure, including permission errors, coalesces into `false`;
/// callers only ever branch on "present or not".
pub async fn path_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}
