use std::{
    collections::HashMap,
    fmt::Write,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bot_commons::persist::write_file_atomically;
use tokio::sync::Mutex;

/// Per-chat count of flagged messages, kept in memory and mirrored to a file.
///
/// The file has one `chat_id:count` record per line and is rewritten in full after every
/// increment. That's a lot of writing for a busy bot, but fine for the amount of spam a
/// moderation bot sees.
#[derive(Debug)]
pub struct CounterStore {
    path: PathBuf,
    counts: Mutex<HashMap<String, u64>>,
}

impl CounterStore {
    /// Reads all records from the file at `path`.
    ///
    /// If the file is missing or unreadable, starts from nothing. Broken lines are skipped.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let counts = match tokio::fs::read_to_string(&path).await {
            Ok(data) => parse_records(&data, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "No flagged message counts at {}, starting from zero.",
                    path.display()
                );
                HashMap::new()
            }
            Err(e) => {
                log::warn!(
                    "Could not read flagged message counts from {}, starting from zero: {}",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        log::info!(
            "Loaded flagged message counts for {} chat(s) from {}",
            counts.len(),
            path.display()
        );

        Self {
            path,
            counts: Mutex::new(counts),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flagged message count of this chat. 0 if it was never flagged.
    pub async fn get(&self, chat_id: &str) -> u64 {
        self.counts.lock().await.get(chat_id).copied().unwrap_or(0)
    }

    /// Adds one to this chat's count, writes all counts to the file, and returns the new count.
    ///
    /// The whole read-modify-write-persist happens under one lock, so concurrent increments
    /// never lose each other and the file always ends up with the latest counts.
    ///
    /// If writing the file fails, this is logged and the new count is returned anyway.
    /// Memory and file then disagree until the next successful write.
    pub async fn increment(&self, chat_id: &str) -> u64 {
        let mut counts = self.counts.lock().await;

        let count = counts.entry(chat_id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        let new_count = *count;

        let records = render_records(&counts);
        let path = self.path.clone();

        match tokio::task::spawn_blocking(move || write_file_atomically(&path, records.as_bytes()))
            .await
        {
            Ok(Ok(())) => (),
            Ok(Err(e)) => log::error!(
                "Failed to save flagged message counts to {} (chat {} is now at {}): {}",
                self.path.display(),
                chat_id,
                new_count,
                e
            ),
            Err(e) => log::error!("Flagged message count writer task died: {}", e),
        }

        drop(counts);
        new_count
    }

    /// Copy of all counts.
    pub async fn snapshot(&self) -> HashMap<String, u64> {
        self.counts.lock().await.clone()
    }
}

/// Parses `chat_id:count` lines. The last record of a chat wins.
fn parse_records(data: &str, path: &Path) -> HashMap<String, u64> {
    let mut counts = HashMap::new();

    for (number, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = line
            .rsplit_once(':')
            .map(|(chat_id, count)| (chat_id.trim(), count.trim().parse::<u64>()))
            .filter(|(chat_id, _)| !chat_id.is_empty());

        match parsed {
            Some((chat_id, Ok(count))) => {
                counts.insert(chat_id.to_string(), count);
            }
            _ => log::warn!(
                "Skipping broken line {} in {}: {}",
                number + 1,
                path.display(),
                line
            ),
        }
    }

    counts
}

fn render_records(counts: &HashMap<String, u64>) -> String {
    // Sorted so the file doesn't shuffle around on every write.
    let mut records: Vec<_> = counts.iter().collect();
    records.sort_unstable();

    let mut out = String::with_capacity(records.len() * 24);
    for (chat_id, count) in records {
        writeln!(out, "{chat_id}:{count}").expect("Writing to a String never fails");
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::{fs, sync::Arc};

    use super::*;

    #[tokio::test]
    async fn counts_increments() {
        let dir = tempfile::tempdir().unwrap();
        let store = CounterStore::load(dir.path().join("flagged.txt")).await;

        assert_eq!(store.get("-100123").await, 0);
        for n in 1..=5 {
            assert_eq!(store.increment("-100123").await, n);
        }
        assert_eq!(store.get("-100123").await, 5);
        assert_eq!(store.get("-100456").await, 0);

        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "-100123:5\n"
        );
    }

    #[tokio::test]
    async fn reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flagged.txt");

        let store = CounterStore::load(&path).await;
        store.increment("a").await;
        store.increment("b").await;
        store.increment("b").await;
        store.increment("-1001").await;
        let before = store.snapshot().await;
        drop(store);

        let reloaded = CounterStore::load(&path).await;
        assert_eq!(reloaded.snapshot().await, before);
        assert_eq!(reloaded.get("b").await, 2);
    }

    #[tokio::test]
    async fn loads_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flagged.txt");
        fs::write(&path, "123:5\n456:0\n").unwrap();

        let store = CounterStore::load(&path).await;
        assert_eq!(store.get("123").await, 5);
        assert_eq!(store.get("456").await, 0);
        assert_eq!(store.get("789").await, 0);

        assert_eq!(store.increment("123").await, 6);
    }

    #[tokio::test]
    async fn last_record_wins_and_junk_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flagged.txt");
        fs::write(&path, "1:3\ngarbage\n2:x\n:7\n\n1:9\n 3 : 4 \n").unwrap();

        let store = CounterStore::load(&path).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["1"], 9);
        assert_eq!(snapshot["3"], 4);
    }

    #[tokio::test]
    async fn unreadable_storage_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory can't be read as a file.
        let store = CounterStore::load(dir.path()).await;
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn failed_write_still_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = CounterStore::load(dir.path().join("missing_dir").join("flagged.txt")).await;

        assert_eq!(store.increment("1").await, 1);
        assert_eq!(store.increment("1").await, 2);
        assert_eq!(store.get("1").await, 2);
        assert!(!store.path().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_increments_are_not_lost() {
        const TASKS: u64 = 64;
        const PER_TASK: u64 = 10;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flagged.txt");
        let store = Arc::new(CounterStore::load(&path).await);

        let handles: Vec<_> = (0..TASKS)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..PER_TASK {
                        store.increment("shared").await;
                        // Some noise on a separate chat.
                        if i % 2 == 0 {
                            store.increment("other").await;
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get("shared").await, TASKS * PER_TASK);
        assert_eq!(store.get("other").await, TASKS / 2 * PER_TASK);

        let reloaded = CounterStore::load(&path).await;
        assert_eq!(reloaded.get("shared").await, TASKS * PER_TASK);
        assert_eq!(reloaded.get("other").await, TASKS / 2 * PER_TASK);
    }
}
