pub mod practicum_service;
pub mod telegram_service;
pub mod common_structs;

use anyhow::Result;

use crate::config::Config;


#[derive(Debug, Clone)]
pub struct CommonService {
    pub practicum: practicum_service::PracticumService,
    pub telegram: telegram_service::TelegramService,
}

impl CommonService {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            practicum: practicum_service::PracticumService::new(config)?,
            telegram: telegram_service::TelegramService::new(config),
        })
    }
}
