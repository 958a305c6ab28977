use teloxide::types::BotCommand;

use crate::language::LanguageDetector;

/// Who may use a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anyone,
    /// Only the bot owner. For commands that change things for every chat at once.
    Owner,
}

pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub access: Access,
}

impl Command {
    pub fn allows(&self, sender_is_owner: bool) -> bool {
        match self.access {
            Access::Anyone => true,
            Access::Owner => sender_is_owner,
        }
    }
}

pub const START: Command = Command {
    name: "/start",
    description: "Say hi.",
    access: Access::Anyone,
};

pub const HELP: Command = Command {
    name: "/help",
    description: "What this bot does.",
    access: Access::Anyone,
};

pub const FSTAT: Command = Command {
    name: "/fstat",
    description: "How many spam messages were removed in this chat.",
    access: Access::Anyone,
};

pub const ADDPHRASE: Command = Command {
    name: "/addphrase",
    description: "Add a spam phrase: /addphrase [en,ru] <phrase>",
    access: Access::Owner,
};

pub const PHRASES: Command = Command {
    name: "/phrases",
    description: "How many spam phrases there are per language.",
    access: Access::Anyone,
};

pub const COMMANDS: &[Command] = &[START, HELP, FSTAT, ADDPHRASE, PHRASES];

/// Commands as Telegram wants them for `set_my_commands`.
pub fn generate_bot_commands() -> Vec<BotCommand> {
    COMMANDS
        .iter()
        .map(|c| BotCommand::new(c.name.trim_start_matches('/'), c.description))
        .collect()
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name == name)
}

pub static WELCOME_TEXT: &str =
    "Welcome! This bot filters spam messages and tracks spam stats for this chat.";

pub static HELP_TEXT: &str = concat!(
    "This bot automatically filters spam messages based on phrases ",
    "and tracks flagged spam messages in the chat. Use /fstat to view ",
    "the spam statistics for this group.\n\n",
    "To work, it needs to be an admin with \"Delete messages\" permission.\n\n",
    "The bot owner can add spam phrases with /addphrase, optionally starting with ",
    "comma-separated language codes, like \"/addphrase en,de buy followers\". ",
    "Phrases added this way last until the bot restarts."
);

/// Response to `/fstat`.
pub fn flagged_count_text(count: u64) -> String {
    match count {
        0 => "This group is spotless! Not a single spam message flagged.".to_string(),
        1..=5 => format!("Only {count} spam messages flagged... This group is rather clean."),
        6..=100 => format!("{count} spam messages flagged... Looks like the bot is doing its job!"),
        101..=500 => {
            format!("{count} spam messages flagged... This group has seen some activity!")
        }
        _ => format!("Wow! {count} spam messages flagged... Lots of hard work was done here!"),
    }
}

/// Parses `/addphrase` parameters into language codes and the phrase.
///
/// If the first word is a comma-separated list of supported language codes, those are the
/// languages. Otherwise the whole thing is the phrase, and it goes to whatever language it's
/// detected as. The phrase may come out empty; the catalog rejects that.
pub fn parse_add_phrase<'a>(
    params: &'a str,
    detector: &LanguageDetector,
) -> (Vec<String>, &'a str) {
    let params = params.trim();
    let (first, rest) = params
        .split_once(char::is_whitespace)
        .unwrap_or((params, ""));

    let codes: Vec<String> = first
        .split(',')
        .map(|code| code.trim().to_lowercase())
        .collect();

    if !first.is_empty() && codes.iter().all(|code| detector.is_supported(code)) {
        let mut unique = Vec::with_capacity(codes.len());
        for code in codes {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        return (unique, rest.trim());
    }

    (vec![detector.detect(params).to_string()], params)
}

/// Response to `/phrases`.
pub fn phrase_summary_text(summary: &[(String, usize)]) -> String {
    if summary.is_empty() {
        return "No spam phrases are loaded.".to_string();
    }

    let mut text = String::from("Spam phrases per language:");
    for (language, count) in summary {
        text.push_str(&format!("\n{language}: {count}"));
    }
    text
}
