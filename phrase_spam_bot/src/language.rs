use std::collections::HashSet;

/// Characters typical of a language, used to guess what language some text is in.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    code: String,
    name: String,
    chars: HashSet<char>,
}

impl LanguageProfile {
    /// Makes a profile out of a short code like `"en"`, a human name like `"english"`, and a
    /// string containing every character typical of the language. The characters get lowercased.
    pub fn new(code: impl Into<String>, name: impl Into<String>, chars: &str) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            chars: chars.chars().flat_map(char::to_lowercase).collect(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many of these characters are typical of this language.
    fn overlap(&self, text_chars: &HashSet<char>) -> usize {
        // Iterate over whichever is smaller.
        if text_chars.len() < self.chars.len() {
            text_chars.iter().filter(|c| self.chars.contains(c)).count()
        } else {
            self.chars.iter().filter(|c| text_chars.contains(c)).count()
        }
    }
}

/// Built-in profiles, in registration order. Order matters: ties go to whichever comes first.
static DEFAULT_PROFILES: &[(&str, &str, &str)] = &[
    ("ru", "russian", "абвгдеёжзийклмнопрстуфхцчшщьыъэюя"),
    ("en", "english", "abcdefghijklmnopqrstuvwxyz"),
    ("es", "spanish", "abcdefghijklmnñopqrstuvwxyz"),
    ("de", "german", "abcdefghijklmnopqrstuvwxyzß"),
    ("fr", "french", "abcdefghijklmnopqrstuvwxyz"),
    (
        "zh",
        "chinese",
        "āáǎàēéěèīíǐìōóǒòūúǔùüǘǚǜㄅㄆㄇㄈㄉㄊㄋㄌㄍㄎㄏㄐㄑㄒㄓㄔㄕㄖㄗㄘㄙㄚㄛㄜㄝㄞㄟㄠㄡㄢㄣㄤㄥㄦㄧㄨㄩ",
    ),
    (
        "ja",
        "japanese",
        "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをん",
    ),
    ("vi", "vietnamese", "aăâbcdđeêghiklmnonpqrstuưvxy"),
    ("it", "italian", "abcdefghijklmnopqrstuvwxyz"),
    ("uk", "ukrainian", "абвгґдеєжзиїйклмнопрстуфхцчшщьюя"),
    (
        "hi",
        "hindi",
        "अआइईउऊऋऌएऐओऔकखगघङचछजझञटठडढणतथदधनपफबभमयरलवशषसह",
    ),
];

/// Guesses the language of some text by how many of its distinct characters
/// show up in each language's profile.
///
/// This is an approximation and always answers with *some* supported language. Short or
/// punctuation-only text ties everywhere and lands on the first registered language.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    profiles: Vec<LanguageProfile>,
}

impl LanguageDetector {
    /// # Panics
    ///
    /// Panics if `profiles` is empty, because then there's nothing to answer with.
    pub fn new(profiles: Vec<LanguageProfile>) -> Self {
        assert!(
            !profiles.is_empty(),
            "Language detector needs at least one language profile."
        );
        Self { profiles }
    }

    pub fn profiles(&self) -> &[LanguageProfile] {
        &self.profiles
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.profiles.iter().any(|p| p.code == code)
    }

    /// Returns the code of the language whose profile shares the most distinct
    /// characters with `text`. Ties go to the earliest registered profile.
    pub fn detect(&self, text: &str) -> &str {
        let text_chars: HashSet<char> = text.chars().flat_map(char::to_lowercase).collect();

        let mut best = &self.profiles[0];
        let mut best_score = best.overlap(&text_chars);

        for profile in &self.profiles[1..] {
            let score = profile.overlap(&text_chars);
            // Strictly greater, so the first one wins a tie.
            if score > best_score {
                best = profile;
                best_score = score;
            }
        }

        &best.code
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROFILES
                .iter()
                .map(|(code, name, chars)| LanguageProfile::new(*code, *name, chars))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_obvious_ones() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.detect("Buy Followers now!!"), "en");
        assert_eq!(detector.detect("hello friend, how are you"), "en");
        assert_eq!(detector.detect("Привет, как дела?"), "ru");
        assert_eq!(detector.detect("Ґанок і їжак, єнот"), "uk");
        assert_eq!(detector.detect("こんにちは"), "ja");
        assert_eq!(detector.detect("नमस्ते दोस्त"), "hi");
    }

    #[test]
    fn degenerate_text_goes_to_first_language() {
        let detector = LanguageDetector::default();
        assert_eq!(detector.detect(""), "ru");
        assert_eq!(detector.detect("!!! ??? 123"), "ru");
    }

    #[test]
    fn ties_go_to_first_registered() {
        let detector = LanguageDetector::new(vec![
            LanguageProfile::new("aa", "first", "abc"),
            LanguageProfile::new("bb", "second", "abc"),
            LanguageProfile::new("cc", "third", "abcd"),
        ]);
        assert_eq!(detector.detect("cab"), "aa");
        assert_eq!(detector.detect("dab"), "cc");

        let reordered = LanguageDetector::new(vec![
            LanguageProfile::new("bb", "second", "abc"),
            LanguageProfile::new("aa", "first", "abc"),
        ]);
        assert_eq!(reordered.detect("cab"), "bb");
    }

    #[test]
    fn profile_chars_are_lowercased() {
        let detector = LanguageDetector::new(vec![
            LanguageProfile::new("xx", "lower", "xyz"),
            LanguageProfile::new("up", "upper", "QRS"),
        ]);
        assert_eq!(detector.detect("qrs"), "up");
        assert_eq!(detector.detect("QRS"), "up");
        assert!(detector.is_supported("up"));
        assert!(!detector.is_supported("zz"));
    }

    #[test]
    #[should_panic]
    fn no_profiles_is_a_bug() {
        let _ = LanguageDetector::new(Vec::new());
    }
}
