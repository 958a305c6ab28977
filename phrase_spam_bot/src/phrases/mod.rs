mod parser;
pub mod watcher;

use std::{
    collections::BTreeMap,
    fmt::Display,
    fs::File,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::language::LanguageProfile;
use parser::Parser;

/// Where spam phrases get loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseSource {
    /// A directory with one file per language, named like `english.txt` or `en.txt`.
    Directory(PathBuf),
    /// A single file with `language:phrase` lines.
    Combined(PathBuf),
}

impl PhraseSource {
    /// The directory that has to be watched to spot changes to this source.
    pub fn watch_dir(&self) -> &Path {
        match self {
            PhraseSource::Directory(dir) => dir,
            PhraseSource::Combined(file) => match file.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            },
        }
    }

    /// Whether a change to `path` concerns this source.
    pub fn is_affected_by(&self, path: &Path) -> bool {
        match self {
            PhraseSource::Directory(_) => path.extension().is_some_and(|x| x == "txt"),
            PhraseSource::Combined(file) => file.file_name().is_some_and(|x| path.ends_with(x)),
        }
    }
}

impl Display for PhraseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhraseSource::Directory(dir) => write!(f, "directory {}", dir.display()),
            PhraseSource::Combined(file) => write!(f, "file {}", file.display()),
        }
    }
}

/// Shortest phrase [`PhraseCatalog::add_phrase`] accepts, in characters.
/// Anything shorter would match nearly every message.
pub const MIN_PHRASE_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPhraseError {
    /// Nothing left after trimming.
    EmptyPhrase,
    /// Shorter than [`MIN_PHRASE_CHARS`].
    TooShort,
    /// No language to add it to.
    NoLanguages,
}

impl Display for AddPhraseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddPhraseError::EmptyPhrase => write!(f, "Please provide a phrase to add."),
            AddPhraseError::TooShort => write!(
                f,
                "That phrase is too short and would catch normal messages. \
                 Please use at least {MIN_PHRASE_CHARS} characters."
            ),
            AddPhraseError::NoLanguages => write!(f, "Please specify a language for the phrase."),
        }
    }
}

impl std::error::Error for AddPhraseError {}

type PhraseMap = BTreeMap<String, Vec<String>>;

/// Lowercase spam phrases, per language code.
///
/// Grows at runtime through [`PhraseCatalog::add_phrase`] and [`PhraseCatalog::reload`], but
/// never shrinks. Nothing is ever written back to the source, so phrases added at runtime are
/// gone after a restart unless someone also puts them into the source.
#[derive(Debug)]
pub struct PhraseCatalog {
    phrases: RwLock<PhraseMap>,
    source: PhraseSource,
    /// Code and name of each language to look for in a [`PhraseSource::Directory`].
    languages: Vec<(String, String)>,
}

impl PhraseCatalog {
    /// Reads phrases for each of `languages` from `source`.
    ///
    /// A language whose source is missing or broken just ends up with no phrases.
    pub fn load(source: PhraseSource, languages: &[LanguageProfile]) -> Self {
        let languages: Vec<(String, String)> = languages
            .iter()
            .map(|p| (p.code().to_string(), p.name().to_string()))
            .collect();

        let phrases = read_source(&source, &languages);

        let catalog = Self {
            phrases: RwLock::new(phrases),
            source,
            languages,
        };

        log::info!(
            "Loaded spam phrases from {}: {}",
            catalog.source,
            catalog.summary_string()
        );

        catalog
    }

    pub fn source(&self) -> &PhraseSource {
        &self.source
    }

    /// Phrases registered for this language. Empty if the language is unknown.
    pub fn phrases_for(&self, language: &str) -> Vec<String> {
        self.read().get(language).cloned().unwrap_or_default()
    }

    /// Returns the first phrase of this language that occurs in `lowercase_text`, if any.
    pub fn find_match(&self, language: &str, lowercase_text: &str) -> Option<String> {
        self.read()
            .get(language)?
            .iter()
            .find(|phrase| lowercase_text.contains(phrase.as_str()))
            .cloned()
    }

    /// Trims and lowercases `phrase` and appends it to each of `languages`.
    ///
    /// Returns how many of the languages didn't already have it. Phrases from the sources
    /// aren't held to [`MIN_PHRASE_CHARS`], only these.
    pub fn add_phrase<S: AsRef<str>>(
        &self,
        phrase: &str,
        languages: &[S],
    ) -> Result<usize, AddPhraseError> {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            return Err(AddPhraseError::EmptyPhrase);
        }
        if phrase.chars().count() < MIN_PHRASE_CHARS {
            return Err(AddPhraseError::TooShort);
        }
        if languages.is_empty() {
            return Err(AddPhraseError::NoLanguages);
        }

        let mut added = 0;
        let mut phrases = self.write();
        for language in languages {
            let list = phrases.entry(language.as_ref().to_string()).or_default();
            if !list.contains(&phrase) {
                list.push(phrase.clone());
                added += 1;
            }
        }
        drop(phrases);

        log::info!(
            "Added phrase \"{}\" to {} language(s) out of {}",
            phrase,
            added,
            languages.len()
        );

        Ok(added)
    }

    /// Reads the source again and appends phrases that aren't known yet.
    /// Returns how many were appended.
    pub fn reload(&self) -> usize {
        let fresh = read_source(&self.source, &self.languages);

        let mut added = 0;
        let mut phrases = self.write();
        for (language, new_phrases) in fresh {
            let list = phrases.entry(language).or_default();
            for phrase in new_phrases {
                if !list.contains(&phrase) {
                    list.push(phrase);
                    added += 1;
                }
            }
        }

        added
    }

    /// Language codes and how many phrases each has, sorted by code.
    pub fn summary(&self) -> Vec<(String, usize)> {
        self.read()
            .iter()
            .map(|(language, list)| (language.clone(), list.len()))
            .collect()
    }

    fn summary_string(&self) -> String {
        let summary = self.summary();
        if summary.is_empty() {
            return "nothing".to_string();
        }
        summary
            .iter()
            .map(|(language, count)| format!("{language}={count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // Nothing panics while holding these locks, but a poisoned map is still a valid map anyway.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, PhraseMap> {
        self.phrases.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, PhraseMap> {
        self.phrases.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_source(source: &PhraseSource, languages: &[(String, String)]) -> PhraseMap {
    match source {
        PhraseSource::Directory(dir) => read_directory(dir, languages),
        PhraseSource::Combined(file) => read_combined(file, languages),
    }
}

fn read_directory(dir: &Path, languages: &[(String, String)]) -> PhraseMap {
    let mut phrases = PhraseMap::new();

    for (code, name) in languages {
        let by_name = dir.join(format!("{name}.txt"));
        let by_code = dir.join(format!("{code}.txt"));

        let list = match File::open(&by_name).or_else(|e| match e.kind() {
            ErrorKind::NotFound => File::open(&by_code),
            _ => Err(e),
        }) {
            Ok(file) => read_plain(file, code),
            Err(e) => {
                log::warn!(
                    "No spam phrases for '{}': could not open {} or {}: {}",
                    code,
                    by_name.display(),
                    by_code.display(),
                    e
                );
                Vec::new()
            }
        };

        phrases.insert(code.clone(), list);
    }

    phrases
}

fn read_plain(file: File, language: &str) -> Vec<String> {
    let mut parser = Parser::plain(BufReader::new(file));
    let mut list = Vec::new();

    while let Some(line) = parser.next_line() {
        match line {
            Ok(Some(line)) => {
                if !list.contains(&line.phrase) {
                    list.push(line.phrase);
                }
            }
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Error reading spam phrases for '{}': {}", language, e);
            }
        }
    }

    list
}

fn read_combined(path: &Path, languages: &[(String, String)]) -> PhraseMap {
    // Every known language gets an entry, even if the file has nothing for it.
    let mut phrases: PhraseMap = languages
        .iter()
        .map(|(code, _)| (code.clone(), Vec::new()))
        .collect();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            log::warn!(
                "Could not open spam phrase file {}, no phrases for any language: {}",
                path.display(),
                e
            );
            return phrases;
        }
    };

    let mut parser = Parser::combined(BufReader::new(file));

    while let Some(line) = parser.next_line() {
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Skipping a line in {}: {}", path.display(), e);
                continue;
            }
        };

        let Some(language) = line.language else {
            // Combined parser always gives a language.
            continue;
        };

        let list = phrases.entry(language).or_default();
        if !list.contains(&line.phrase) {
            list.push(line.phrase);
        }
    }

    phrases
}
