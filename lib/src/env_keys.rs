pub static PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub static TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub static TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub static RETRY_TIME: &str = "RETRY_TIME";
