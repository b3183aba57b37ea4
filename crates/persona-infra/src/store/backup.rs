//! Timestamped registry backups with rotation.
//!
//! Backup names sort lexicographically in creation order, so the newest
//! backup is always the greatest name. A new backup is always named after
//! the current greatest one, even if the system clock has stepped back.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use std::io;
use std::path::{Path, PathBuf};

const PREFIX: &str = "registry-";
const SUFFIX: &str = ".json";
const TIMESTAMP: &str = "%Y%m%dT%H%M%S%.3fZ";

/// File name for a backup taken at `at`.
pub fn backup_name(at: DateTime<Utc>) -> String {
    format!("{PREFIX}{}{SUFFIX}", at.format(TIMESTAMP))
}

/// Timestamp encoded in a backup name.
fn backup_time(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP)
        .ok()
        .map(|t| t.and_utc())
}

/// True for names this module creates. Rejects anything with a path
/// separator so callers can join user input onto the backups directory.
pub fn is_backup_name(name: &str) -> bool {
    name.starts_with(PREFIX)
        && name.ends_with(SUFFIX)
        && name.len() > PREFIX.len() + SUFFIX.len()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

/// Copy `source` into `backups_dir` under a fresh timestamped name.
///
/// Returns `None` when there is nothing to back up yet.
pub async fn create_backup(source: &Path, backups_dir: &Path) -> io::Result<Option<PathBuf>> {
    if !tokio::fs::try_exists(source).await? {
        return Ok(None);
    }
    tokio::fs::create_dir_all(backups_dir).await?;

    let now = Utc::now();
    let newest = list_backups(backups_dir)
        .await?
        .first()
        .and_then(|name| backup_time(name));
    let mut at = match newest {
        Some(newest) if newest >= now => {
            tracing::debug!(%newest, %now, "newest backup is ahead of the clock");
            newest + Duration::milliseconds(1)
        }
        _ => now,
    };
    // Two saves in the same millisecond must not overwrite each other.
    let mut target = backups_dir.join(backup_name(at));
    while tokio::fs::try_exists(&target).await? {
        at += Duration::milliseconds(1);
        target = backups_dir.join(backup_name(at));
    }

    tokio::fs::copy(source, &target).await?;
    tracing::debug!(backup = %target.display(), "registry backed up");
    Ok(Some(target))
}

/// Backup names in `backups_dir`, newest first. A missing directory has none.
pub async fn list_backups(backups_dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(backups_dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if is_backup_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort_unstable_by(|a, b| b.cmp(a));
    Ok(names)
}

/// Delete the oldest backups beyond `keep`. Returns how many were removed.
pub async fn rotate_backups(backups_dir: &Path, keep: usize) -> io::Result<usize> {
    let names = list_backups(backups_dir).await?;
    let mut removed = 0;
    for name in names.iter().skip(keep) {
        tokio::fs::remove_file(backups_dir.join(name)).await?;
        removed += 1;
    }
    if removed > 0 {
        tracing::debug!(removed, keep, "rotated registry backups");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_backup_name_format() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap() + Duration::milliseconds(67);
        assert_eq!(backup_name(at), "registry-20260102T030405.067Z.json");
        assert!(is_backup_name(&backup_name(at)));
    }

    #[test]
    fn test_is_backup_name_rejects_paths() {
        assert!(!is_backup_name("registry.json"));
        assert!(!is_backup_name("registry-.json"));
        assert!(!is_backup_name("registry-../../etc.json"));
        assert!(!is_backup_name("registry-a/b.json"));
        assert!(!is_backup_name("notes.txt"));
    }

    #[tokio::test]
    async fn test_create_backup_without_source_is_noop() {
        let dir = tempdir().unwrap();
        let created = create_backup(&dir.path().join("registry.json"), &dir.path().join("backups"))
            .await
            .unwrap();
        assert!(created.is_none());
        assert!(list_backups(&dir.path().join("backups")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backups_are_distinct_and_rotate() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("registry.json");
        let backups = dir.path().join("backups");
        tokio::fs::write(&source, "{}").await.unwrap();

        let mut created = Vec::new();
        for _ in 0..4 {
            created.push(create_backup(&source, &backups).await.unwrap().unwrap());
        }
        assert_eq!(list_backups(&backups).await.unwrap().len(), 4);

        assert_eq!(rotate_backups(&backups, 2).await.unwrap(), 2);
        let remaining = list_backups(&backups).await.unwrap();
        assert_eq!(remaining.len(), 2);

        let newest = created.last().unwrap().file_name().unwrap().to_str().unwrap();
        assert_eq!(remaining[0], newest);
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("README"), "x").await.unwrap();
        tokio::fs::write(dir.path().join("registry-20260101T000000.000Z.json"), "{}")
            .await
            .unwrap();
        let names = list_backups(dir.path()).await.unwrap();
        assert_eq!(names, vec!["registry-20260101T000000.000Z.json".to_string()]);
    }

    #[tokio::test]
    async fn test_backup_after_clock_step_back_is_still_newest() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("registry.json");
        let backups = dir.path().join("backups");
        tokio::fs::write(&source, "{}").await.unwrap();
        tokio::fs::create_dir_all(&backups).await.unwrap();
        let ahead = "registry-29990101T000000.000Z.json";
        tokio::fs::write(backups.join(ahead), "{}").await.unwrap();

        let created = create_backup(&source, &backups).await.unwrap().unwrap();
        let created = created.file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(created, "registry-29990101T000000.001Z.json");

        rotate_backups(&backups, 1).await.unwrap();
        assert_eq!(list_backups(&backups).await.unwrap(), vec![created]);
    }

    #[test]
    fn test_backup_time_parses_names() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap() + Duration::milliseconds(67);
        assert_eq!(backup_time(&backup_name(at)), Some(at));
        assert_eq!(backup_time("registry-garbage.json"), None);
    }
}
