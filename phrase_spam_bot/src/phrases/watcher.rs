use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use notify::{RecursiveMode, Watcher};

use super::PhraseCatalog;

/// Editors like to write files in several steps. Give them a moment before reading.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Watches the catalog's source and merges new phrases into it whenever it changes.
///
/// Runs until the catalog is dropped. Only holds a weak reference to it.
pub async fn watch_phrases(catalog: Weak<PhraseCatalog>) {
    let source = {
        let Some(catalog) = catalog.upgrade() else {
            return;
        };
        catalog.source().clone()
    };

    let update_notify = Arc::new(tokio::sync::Notify::new());
    let update_notify_watcher_clone = update_notify.clone();
    let source_watcher_clone = source.clone();

    let watcher = notify::recommended_watcher(move |event: Result<notify::Event, notify::Error>| {
        let event = match event {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Phrase source watcher error: {}", e);
                return;
            }
        };
        let k = event.kind;
        if (k.is_create() || k.is_modify() || k.is_other())
            && event
                .paths
                .iter()
                .any(|path| source_watcher_clone.is_affected_by(path))
        {
            // notify_one stores a permit, so a change during a reload isn't lost.
            update_notify_watcher_clone.notify_one();
        }
    });

    let mut watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            log::warn!("Could not create a watcher for spam phrases: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(source.watch_dir(), RecursiveMode::NonRecursive) {
        log::warn!(
            "Not watching {} for new spam phrases: {}",
            source.watch_dir().display(),
            e
        );
        return;
    }

    log::info!("Watching {} for new spam phrases.", source);

    loop {
        update_notify.notified().await;
        log::debug!("Notified of a phrase source change!");
        tokio::time::sleep(SETTLE_DELAY).await;

        let Some(catalog) = catalog.upgrade() else {
            // Catalog is gone, nobody to update.
            break;
        };

        let catalog_clone = catalog.clone();
        match tokio::task::spawn_blocking(move || catalog_clone.reload()).await {
            Ok(0) => log::debug!("No new spam phrases after the change."),
            Ok(added) => log::info!("Merged {} new spam phrase(s) from {}.", added, source),
            Err(e) => log::error!("Phrase reload task died: {}", e),
        }
    }

    drop(watcher);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::fs;

    use super::*;
    use crate::{language::LanguageDetector, phrases::PhraseSource};

    #[tokio::test(flavor = "multi_thread")]
    async fn picks_up_new_phrases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english.txt");
        fs::write(&path, "buy followers\n").unwrap();

        let catalog = Arc::new(PhraseCatalog::load(
            PhraseSource::Directory(dir.path().into()),
            LanguageDetector::default().profiles(),
        ));

        let task = tokio::spawn(watch_phrases(Arc::downgrade(&catalog)));
        // Let the watcher get going.
        tokio::time::sleep(Duration::from_millis(300)).await;

        fs::write(&path, "buy followers\nfree crypto\n").unwrap();

        let mut found = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if catalog.phrases_for("en").len() == 2 {
                found = true;
                break;
            }
        }
        assert!(found, "watcher never merged the new phrase");

        task.abort();
    }
}
