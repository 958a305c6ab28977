fn main() {
    bot_commons::start_everything(
        phrase_spam_bot::DEFAULT_LOG_FILTER,
        phrase_spam_bot::entry(),
    );
}
