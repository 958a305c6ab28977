use teloxide::types::Message;

pub trait MessageStuff {
    /// Text of the message, or its caption if it's media.
    fn text_full(&self) -> Option<&str>;

    /// ID of whoever sent this, as a string. Messages sent on behalf of a chat
    /// (anonymous admins, linked channels) yield that chat's ID.
    fn sender_id_string(&self) -> Option<String>;

    /// Splits a command message into the command name and its parameters.
    ///
    /// The name is lowercased and has the `@botname` suffix trimmed, but only if it's ours; a
    /// command addressed to some other bot yields [`None`]. Parameters are trimmed at the start.
    fn command_and_params(&self, bot_username: &str) -> Option<(String, &str)>;
}

impl MessageStuff for Message {
    fn text_full(&self) -> Option<&str> {
        self.text().or_else(|| self.caption())
    }

    fn sender_id_string(&self) -> Option<String> {
        if let Some(chat) = &self.sender_chat {
            Some(chat.id.to_string())
        } else {
            self.from.as_ref().map(|user| user.id.to_string())
        }
    }

    fn command_and_params(&self, bot_username: &str) -> Option<(String, &str)> {
        split_command(self.text()?, bot_username)
    }
}

/// Plain string part of [`MessageStuff::command_and_params`].
pub fn split_command<'a>(text: &'a str, bot_username: &str) -> Option<(String, &'a str)> {
    if !text.starts_with('/') {
        return None;
    }

    let command = text.split_whitespace().next()?;
    let params = text[command.len()..].trim_start();

    // "/fstat@Some_Bot" -> "/fstat", but only if that's us.
    // Bot names are guaranteed ASCII, so ignore ASCII case specifically.
    let callname = match command.split_once('@') {
        Some((callname, username)) => {
            if !username.eq_ignore_ascii_case(bot_username) {
                return None;
            }
            callname
        }
        None => command,
    };

    Some((callname.to_lowercase(), params))
}

#[cfg(test)]
mod tests {
    use super::split_command;

    #[test]
    fn command_splitting() {
        assert_eq!(
            split_command("/fstat", "Phrase_Bot"),
            Some(("/fstat".to_string(), ""))
        );
        assert_eq!(
            split_command("/AddPhrase@phrase_bot en  buy followers", "Phrase_Bot"),
            Some(("/addphrase".to_string(), "en  buy followers"))
        );
        assert_eq!(split_command("/fstat@other_bot", "Phrase_Bot"), None);
        assert_eq!(split_command("hi /fstat", "Phrase_Bot"), None);
    }
}
