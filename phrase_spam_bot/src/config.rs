use std::{fs, io, path::PathBuf};

use teloxide::types::UserId;

use crate::phrases::PhraseSource;

const DEFAULT_PHRASES_DIR: &str = "spam_phrases";
const DEFAULT_COUNTER_FILE: &str = "flagged_messages.txt";

/// Where the bot key lives, unless it's in `BOT_TOKEN`.
pub const KEY_FILE: &str = match cfg!(debug_assertions) {
    true => "key_debug",
    false => "key",
};

/// Everything the bot needs to know at startup.
pub struct Config {
    pub key: String,
    /// The only user who may use owner commands like `/addphrase`.
    pub owner_id: Option<UserId>,
    pub phrase_source: PhraseSource,
    pub counter_path: PathBuf,
}

impl Config {
    /// Reads the config from the environment and the key file.
    ///
    /// Recognized variables are `BOT_TOKEN`, `ADMIN_ID`, `SPAM_PHRASES_DIR`,
    /// `SPAM_PHRASES_FILE` (overrides the directory) and `FLAGGED_MESSAGES_FILE`.
    ///
    /// # Errors
    ///
    /// Errors if there's no `BOT_TOKEN` and the key file can't be read.
    pub fn from_env() -> io::Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok(), || fs::read_to_string(KEY_FILE))
    }

    fn from_vars(
        var: impl Fn(&str) -> Option<String>,
        read_key_file: impl FnOnce() -> io::Result<String>,
    ) -> io::Result<Self> {
        let var = |name: &str| var(name).filter(|x| !x.trim().is_empty());

        let key = match var("BOT_TOKEN") {
            Some(key) => key,
            None => read_key_file()?,
        };

        let owner_id = var("ADMIN_ID").and_then(|x| match x.trim().parse() {
            Ok(id) => Some(UserId(id)),
            Err(e) => {
                log::warn!("Ignoring ADMIN_ID \"{}\": {}", x, e);
                None
            }
        });

        let phrase_source = match var("SPAM_PHRASES_FILE") {
            Some(file) => PhraseSource::Combined(file.into()),
            None => PhraseSource::Directory(
                var("SPAM_PHRASES_DIR")
                    .unwrap_or_else(|| DEFAULT_PHRASES_DIR.to_string())
                    .into(),
            ),
        };

        let counter_path = var("FLAGGED_MESSAGES_FILE")
            .unwrap_or_else(|| DEFAULT_COUNTER_FILE.to_string())
            .into();

        Ok(Config {
            key: key.trim().to_string(),
            owner_id,
            phrase_source,
            counter_path,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)], key_file: Option<&str>) -> io::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(
            |name| vars.get(name).cloned(),
            || {
                key_file
                    .map(str::to_string)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no key file"))
            },
        )
    }

    #[test]
    fn defaults() {
        let config = config_from(&[], Some("123:abc\n")).unwrap();
        assert_eq!(config.key, "123:abc");
        assert_eq!(config.owner_id, None);
        assert_eq!(
            config.phrase_source,
            PhraseSource::Directory("spam_phrases".into())
        );
        assert_eq!(config.counter_path, PathBuf::from("flagged_messages.txt"));
    }

    #[test]
    fn overrides() {
        let config = config_from(
            &[
                ("BOT_TOKEN", "456:def"),
                ("ADMIN_ID", " 1366743555 "),
                ("SPAM_PHRASES_DIR", "somewhere"),
                ("SPAM_PHRASES_FILE", "all_phrases.txt"),
                ("FLAGGED_MESSAGES_FILE", "/var/lib/bot/flagged.txt"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(config.key, "456:def");
        assert_eq!(config.owner_id, Some(UserId(1366743555)));
        assert_eq!(
            config.phrase_source,
            PhraseSource::Combined("all_phrases.txt".into())
        );
        assert_eq!(
            config.counter_path,
            PathBuf::from("/var/lib/bot/flagged.txt")
        );
    }

    #[test]
    fn bad_admin_id_is_ignored() {
        let config = config_from(&[("ADMIN_ID", "the boss")], Some("key")).unwrap();
        assert_eq!(config.owner_id, None);
    }

    #[test]
    fn no_key_anywhere() {
        assert!(config_from(&[], None).is_err());
    }
}
