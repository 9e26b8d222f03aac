pub mod telegram;

pub use telegram::start_telegram_listener;
