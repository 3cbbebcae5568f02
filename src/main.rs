use std::{error::Error, sync::Arc};

use config::Config;
use db::get_db_pool;
use handlers::{handle_callback_query, handle_message, BotState};
use scheduler::{Scheduler, WorkingHours};
use store::PgStore;
use teloxide::{prelude::*, types::CallbackQuery};

mod accounts;
mod catalog;
mod config;
mod db;
mod error;
mod favorites;
mod handlers;
mod keyboards;
mod models;
mod reviews;
mod scheduler;
mod store;

extern crate pretty_env_logger;
#[macro_use] extern crate log;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let config = Config::from_env()?;
    let pool = get_db_pool(&config).await?;
    info!(
        "Connected to database, salon hours {}:00-{}:00, slot {} min",
        config.open_hour, config.close_hour, config.slot_minutes
    );

    let scheduler = Scheduler::new(PgStore::new(pool), WorkingHours::from(&config));
    let state = Arc::new(BotState::new(scheduler));
    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let state = state.clone();
            move |bot: Bot, msg: Message| {
                let state = state.clone();
                async move {
                    let chat_id = msg.chat.id;
                    if let Err(e) = handle_message(bot, msg, &state).await {
                        error!("Failed to handle message from chat {}: {}", chat_id.0, e);
                    }
                    respond(())
                }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let state = state.clone();
            move |bot: Bot, q: CallbackQuery| {
                let state = state.clone();
                async move {
                    let data = q.data.clone();
                    if let Err(e) = handle_callback_query(bot, q, &state).await {
                        error!("Failed to handle callback {:?}: {}", data, e);
                    }
                    respond(())
                }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
