//! Human-readable formatting for history output

use localvcs_core::{Change, ContentRevision, Snapshot};

/// One-line summary of a snapshot, e.g.
/// `s3 | 2026-01-02 10:00:00 UTC | 2 entries | labels: release`
pub fn format_snapshot(snapshot: &Snapshot, labels: &[String]) -> String {
    let date = snapshot.timestamp().format("%Y-%m-%d %H:%M:%S UTC");
    let entries = match snapshot.len() {
        1 => "1 entry".to_string(),
        n => format!("{} entries", n),
    };

    let mut line = format!("{} | {} | {}", snapshot.id(), date, entries);
    if !labels.is_empty() {
        line.push_str(&format!(" | labels: {}", labels.join(", ")));
    }
    line
}

/// Status line for a change, e.g. `M  src/main.rs`
pub fn format_change(change: &Change) -> String {
    format!("{}  {}", change.kind.code(), change.path)
}

/// Listing line for a revision, e.g. `#4  notes.txt (12 B)`
pub fn format_revision(revision: &ContentRevision) -> String {
    format!(
        "{}  {} ({})",
        revision.object_id(),
        revision.path(),
        format_size(revision.content().len())
    )
}

/// Entry content length with a binary unit: `5 B`, `2.0 KiB`, `1.5 MiB`
pub fn format_size(len: usize) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if len < 1024 {
        return format!("{} B", len);
    }
    let mut size = len as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
