use std::sync::Arc;
use teloxide::{dptree::deps, prelude::*};

use crate::{
    classifier::SpamClassifier,
    commands::generate_bot_commands,
    config::Config,
    counter::CounterStore,
    handlers::{handle_edited_message, handle_message, Owner},
    language::LanguageDetector,
    phrases::{watcher::watch_phrases, PhraseCatalog},
    pipeline::ModerationPipeline,
};

/// # Panics
///
/// Panics if there's no bot key, or if the bot can't register its commands.
pub async fn entry() {
    log::info!("ASYNC WOOOO");
    let config = Config::from_env().expect("Could not load bot key file or BOT_TOKEN!");

    let bot = Bot::new(&config.key);

    bot.set_my_commands(generate_bot_commands())
        .await
        .expect("Failed to set bot commands!");

    let detector = LanguageDetector::default();
    let catalog = Arc::new(PhraseCatalog::load(
        config.phrase_source.clone(),
        detector.profiles(),
    ));
    let counters = Arc::new(CounterStore::load(&config.counter_path).await);

    tokio::spawn(watch_phrases(Arc::downgrade(&catalog)));

    let classifier = Arc::new(SpamClassifier::new(detector, catalog));
    let pipeline = Arc::new(ModerationPipeline::new(classifier, counters));
    let owner = Owner(config.owner_id);

    match owner.0 {
        Some(id) => log::info!("Owner is user {}", id),
        None => log::warn!("No ADMIN_ID set, so nobody can add phrases with /addphrase."),
    }

    log::info!("Creating the handler...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_edited_message().endpoint(handle_edited_message));

    log::info!("Dispatching the dispatcher!");

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(deps![pipeline, owner])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("it appears we have been bonked.");
}
