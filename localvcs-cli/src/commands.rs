//! Subcommand implementations
//!
//! Each command loads the repository, applies at most one operation and
//! saves it back. Output goes to the supplied writer.

use crate::output::{format_change, format_revision, format_snapshot};
use anyhow::{anyhow, bail, Context, Result};
use localvcs_core::{HistoryStore, LocalVcs, RevertAction, Snapshot, VcsConfig};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

fn open(repo: &Path) -> Result<(HistoryStore, LocalVcs)> {
    let store = HistoryStore::new(repo);
    if !store.exists() {
        bail!(
            "No repository at {:?}; run `localvcs init` first",
            repo
        );
    }
    let config = VcsConfig::load(repo)?;
    let vcs = store
        .load(config)
        .with_context(|| format!("Failed to load history from {:?}", repo))?;
    Ok((store, vcs))
}

/// Load, apply `f`, save
fn update<T>(repo: &Path, f: impl FnOnce(&mut LocalVcs) -> Result<T>) -> Result<T> {
    let (store, mut vcs) = open(repo)?;
    let value = f(&mut vcs)?;
    store.save(&vcs)?;
    Ok(value)
}

fn labels_of(vcs: &LocalVcs, snapshot: &Snapshot) -> Vec<String> {
    vcs.labels()
        .into_iter()
        .filter(|name| {
            vcs.snapshot_by_label(name)
                .is_some_and(|s| s.id() == snapshot.id())
        })
        .collect()
}

pub fn cmd_init(repo: &Path, out: &mut dyn Write) -> Result<()> {
    let store = HistoryStore::new(repo);
    if store.exists() {
        bail!("Repository already initialized at {:?}", repo);
    }

    let config = VcsConfig::load(repo)?;
    config.save(repo)?;
    let vcs = LocalVcs::with_config(config);
    store.save(&vcs)?;

    writeln!(
        out,
        "Repository initialized at {} (UUID: {})",
        repo.display(),
        vcs.uuid()
    )?;
    Ok(())
}

pub fn cmd_add(repo: &Path, path: &str, content: &str, out: &mut dyn Write) -> Result<()> {
    let id = update(repo, |vcs| Ok(vcs.add_file(path, content.to_string())?))?;
    writeln!(out, "A  {} ({})", path, id)?;
    Ok(())
}

pub fn cmd_change(repo: &Path, path: &str, content: &str, out: &mut dyn Write) -> Result<()> {
    let id = update(repo, |vcs| Ok(vcs.change_file(path, content.to_string())?))?;
    writeln!(out, "M  {} ({})", path, id)?;
    Ok(())
}

pub fn cmd_remove(repo: &Path, path: &str, out: &mut dyn Write) -> Result<()> {
    update(repo, |vcs| Ok(vcs.remove_file(path)?))?;
    writeln!(out, "D  {}", path)?;
    Ok(())
}

pub fn cmd_commit(repo: &Path, out: &mut dyn Write) -> Result<()> {
    let (snapshot, changes) = update(repo, |vcs| {
        let changes = vcs.pending_changes();
        Ok((vcs.commit(), changes))
    })?;

    writeln!(out, "Committed {}", format_snapshot(&snapshot, &[]))?;
    for change in &changes {
        writeln!(out, "  {}", format_change(change))?;
    }
    Ok(())
}

pub fn cmd_revert(repo: &Path, out: &mut dyn Write) -> Result<()> {
    let (action, latest) = update(repo, |vcs| {
        let action = vcs.revert();
        Ok((action, vcs.latest_snapshot()))
    })?;

    let at = latest
        .map(|s| s.id().to_string())
        .unwrap_or_else(|| "empty history".to_string());
    match action {
        RevertAction::RestoreLatest => writeln!(out, "Discarded pending changes (now at {})", at)?,
        RevertAction::PopThenRestore => writeln!(out, "Undid last commit (now at {})", at)?,
        RevertAction::Noop => writeln!(out, "Nothing to revert")?,
    }
    Ok(())
}

pub fn cmd_label(repo: &Path, name: &str, out: &mut dyn Write) -> Result<()> {
    let snapshot = update(repo, |vcs| Ok(vcs.put_label(name)?))?;
    writeln!(out, "Label '{}' -> {}", name, snapshot.id())?;
    Ok(())
}

pub fn cmd_labels(repo: &Path, out: &mut dyn Write) -> Result<()> {
    let (_, vcs) = open(repo)?;
    let names = vcs.labels();
    if names.is_empty() {
        writeln!(out, "No labels.")?;
        return Ok(());
    }
    for name in names {
        if let Some(snapshot) = vcs.snapshot_by_label(&name) {
            writeln!(out, "{}  {}", name, snapshot.id())?;
        }
    }
    Ok(())
}

pub fn cmd_log(repo: &Path, out: &mut dyn Write) -> Result<()> {
    let (_, vcs) = open(repo)?;
    let snapshots = vcs.snapshots();
    if snapshots.is_empty() {
        writeln!(out, "No snapshots.")?;
        return Ok(());
    }

    writeln!(out, "History ({} snapshots):", snapshots.len())?;
    writeln!(out, "{}", "-".repeat(60))?;
    for (i, snapshot) in snapshots.iter().enumerate() {
        let older = snapshots.get(i + 1).map(Arc::as_ref);
        writeln!(out, "{}", format_snapshot(snapshot, &labels_of(&vcs, snapshot)))?;
        for change in snapshot.changes_since(older) {
            writeln!(out, "  {}", format_change(&change))?;
        }
    }
    Ok(())
}

pub fn cmd_show(
    repo: &Path,
    label: Option<&str>,
    index: Option<usize>,
    path: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let (_, vcs) = open(repo)?;
    let snapshot = match (label, index) {
        (Some(name), _) => vcs
            .snapshot_by_label(name)
            .ok_or_else(|| anyhow!("Unknown label: {}", name))?,
        (None, Some(i)) => vcs
            .snapshot_at(i)
            .ok_or_else(|| anyhow!("No snapshot at index {}", i))?,
        (None, None) => vcs
            .latest_snapshot()
            .ok_or_else(|| anyhow!("No snapshots committed yet"))?,
    };

    match path {
        Some(p) => {
            let revision = snapshot
                .file_revision(p)
                .ok_or_else(|| anyhow!("{} not present in {}", p, snapshot.id()))?;
            out.write_all(revision.content())?;
            writeln!(out)?;
        }
        None => {
            writeln!(out, "{}", format_snapshot(&snapshot, &labels_of(&vcs, &snapshot)))?;
            for revision in snapshot.revisions() {
                writeln!(out, "  {}", format_revision(revision))?;
            }
        }
    }
    Ok(())
}

pub fn cmd_status(repo: &Path, out: &mut dyn Write) -> Result<()> {
    let (_, vcs) = open(repo)?;
    let changes = vcs.pending_changes();
    if vcs.is_clean() && changes.is_empty() {
        writeln!(out, "Clean.")?;
        return Ok(());
    }
    for change in &changes {
        writeln!(out, "{}", format_change(change))?;
    }
    if changes.is_empty() {
        writeln!(out, "Dirty (edits cancel out).")?;
    }
    Ok(())
}

pub fn cmd_cat(repo: &Path, path: &str, out: &mut dyn Write) -> Result<()> {
    let (_, vcs) = open(repo)?;
    let revision = vcs
        .file_revision(path)
        .ok_or_else(|| anyhow!("Not tracked: {}", path))?;
    out.write_all(revision.content())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_commands_require_init() {
        let dir = TempDir::new().unwrap();
        let mut buf = Vec::new();
        let err = cmd_log(dir.path(), &mut buf).unwrap_err();
        assert!(err.to_string().contains("localvcs init"));
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        run(|out| cmd_init(dir.path(), out));
        let mut buf = Vec::new();
        assert!(cmd_init(dir.path(), &mut buf).is_err());
    }

    #[test]
    fn test_edit_commit_revert_cycle() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path();
        run(|out| cmd_init(repo, out));

        let added = run(|out| cmd_add(repo, "notes.txt", "hello", out));
        assert!(added.starts_with("A  notes.txt"));

        let status = run(|out| cmd_status(repo, out));
        assert_eq!(status, "A  notes.txt\n");

        let committed = run(|out| cmd_commit(repo, out));
        assert!(committed.starts_with("Committed s1"));
        assert!(committed.contains("A  notes.txt"));
        assert_eq!(run(|out| cmd_status(repo, out)), "Clean.\n");

        run(|out| cmd_change(repo, "notes.txt", "changed", out));
        assert_eq!(run(|out| cmd_cat(repo, "notes.txt", out)), "changed\n");

        let reverted = run(|out| cmd_revert(repo, out));
        assert_eq!(reverted, "Discarded pending changes (now at s1)\n");
        assert_eq!(run(|out| cmd_cat(repo, "notes.txt", out)), "hello\n");

        let undone = run(|out| cmd_revert(repo, out));
        assert_eq!(undone, "Undid last commit (now at empty history)\n");
        assert_eq!(run(|out| cmd_revert(repo, out)), "Nothing to revert\n");
    }

    #[test]
    fn test_label_and_show() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path();
        run(|out| cmd_init(repo, out));
        run(|out| cmd_add(repo, "file", "content", out));
        run(|out| cmd_commit(repo, out));
        run(|out| cmd_label(repo, "label", out));
        run(|out| cmd_change(repo, "file", "new content", out));
        run(|out| cmd_commit(repo, out));

        let shown = run(|out| cmd_show(repo, Some("label"), None, Some("file"), out));
        assert_eq!(shown, "content\n");

        let latest = run(|out| cmd_show(repo, None, None, Some("file"), out));
        assert_eq!(latest, "new content\n");

        let listing = run(|out| cmd_show(repo, None, Some(1), None, out));
        assert!(listing.contains("labels: label"));
        assert!(listing.contains("file (7 B)"));

        assert_eq!(run(|out| cmd_labels(repo, out)), "label  s1\n");

        let mut buf = Vec::new();
        assert!(cmd_show(repo, Some("unknown"), None, None, &mut buf).is_err());
    }

    #[test]
    fn test_log_lists_newest_first() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path();
        run(|out| cmd_init(repo, out));
        run(|out| cmd_add(repo, "a", "1", out));
        run(|out| cmd_commit(repo, out));
        run(|out| cmd_change(repo, "a", "2", out));
        run(|out| cmd_commit(repo, out));

        let log = run(|out| cmd_log(repo, out));
        let s2 = log.find("s2 |").unwrap();
        let s1 = log.find("s1 |").unwrap();
        assert!(s2 < s1);
        assert!(log.starts_with("History (2 snapshots):"));
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path();
        let config = VcsConfig {
            deduplicate_commits: true,
            max_snapshots: Some(1),
        };
        config.save(repo).unwrap();

        run(|out| cmd_init(repo, out));
        assert_eq!(VcsConfig::load(repo).unwrap(), config);

        run(|out| cmd_add(repo, "f", "1", out));
        run(|out| cmd_commit(repo, out));
        run(|out| cmd_change(repo, "f", "2", out));
        run(|out| cmd_commit(repo, out));
        assert!(run(|out| cmd_log(repo, out)).starts_with("History (1 snapshots):"));
        assert_eq!(run(|out| cmd_revert(repo, out)), "Nothing to revert\n");
        assert_eq!(run(|out| cmd_cat(repo, "f", out)), "2\n");
    }

    #[test]
    fn test_label_without_history_fails() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path();
        run(|out| cmd_init(repo, out));

        let mut buf = Vec::new();
        let err = cmd_label(repo, "early", &mut buf).unwrap_err();
        assert!(err.to_string().contains("no snapshots"));
    }
}
