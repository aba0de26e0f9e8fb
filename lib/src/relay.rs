//! The polling loop: fetch, render, deduplicate, notify, sleep.
//!
//! The relay only talks to its two collaborators through `StatusSource` and
//! `Notifier`, so the loop can be driven by in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    config::Config,
    error::RelayError,
    homework::{check_response, current_date, parse_status},
    service::{practicum_service::PracticumService, telegram_service::TelegramService},
    utilities::{format_timestamp, poll_window_start},
};

pub const FAILURE_PREFIX: &str = "Сбой в работе программы";


/// Where homework statuses come from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, RelayError>;
}

/// Where rendered messages go.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl StatusSource for PracticumService {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, RelayError> {
        PracticumService::get_api_answer(self, from_date).await
    }
}

#[async_trait]
impl Notifier for TelegramService {
    async fn send_message(&self, text: &str) -> anyhow::Result<()> {
        TelegramService::send_message(self, text).await
    }
}


/// Delivers `message`, logging the outcome. Delivery errors never reach the caller.
pub async fn send_message<N: Notifier + ?Sized>(notifier: &N, message: &str) {
    match notifier.send_message(message).await {
        Ok(_) => info!("Bot sent message: {}", message),
        Err(error) => error!("Failed to send message to Telegram: {:#}", error),
    }
}


pub struct Relay<S, N> {
    source: S,
    notifier: N,
    retry_time: Duration,
    from_date: i64,
    last_message: String,
}

impl<S: StatusSource, N: Notifier> Relay<S, N> {
    pub fn new(source: S, notifier: N, config: &Config) -> Self {
        Self {
            source,
            notifier,
            retry_time: config.retry_time,
            from_date: poll_window_start(Utc::now()),
            last_message: String::new(),
        }
    }

    /// Lower bound of the next poll, unix seconds.
    pub fn from_date(&self) -> i64 {
        self.from_date
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Polls forever, sleeping `retry_time` after every iteration.
    pub async fn run(&mut self) {
        info!(
            retry_time_secs = self.retry_time.as_secs(),
            from_date = %format_timestamp(self.from_date),
            "Polling homework statuses"
        );
        loop {
            self.iterate().await;
            tokio::time::sleep(self.retry_time).await;
        }
    }

    /// One loop iteration; errors are reported, never returned.
    pub async fn iterate(&mut self) {
        match self.poll_once().await {
            Ok(()) => {}
            Err(RelayError::EmptyValue(key)) => {
                info!(from_date = %format_timestamp(self.from_date), "No {} changes in the poll window", key);
            }
            Err(failure) => {
                let message = format!("{}: {}", FAILURE_PREFIX, failure);
                self.notify_if_changed(message).await;
                error!("{:?}", failure);
            }
        }
    }

    /// Fetches the newest homework and relays its status if it changed.
    pub async fn poll_once(&mut self) -> Result<(), RelayError> {
        let response = self.source.get_api_answer(self.from_date).await?;
        if let Some(server_time) = current_date(&response) {
            self.from_date = server_time;
        }

        let homeworks = check_response(&response)?;
        let message = parse_status(&homeworks[0])?;
        self.notify_if_changed(message).await;
        Ok(())
    }

    async fn notify_if_changed(&mut self, message: String) {
        if message != self.last_message {
            send_message(&self.notifier, &message).await;
            self.last_message = message;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    type Answer = Result<Value, RelayError>;

    /// Replays scripted answers; repeats the last one once the script runs out.
    #[derive(Clone)]
    struct ScriptedSource {
        answers: Arc<Mutex<VecDeque<Answer>>>,
        fallback: Arc<dyn Fn() -> Answer + Send + Sync>,
        requested: Arc<Mutex<Vec<i64>>>,
    }

    impl ScriptedSource {
        fn new(answers: Vec<Answer>, fallback: impl Fn() -> Answer + Send + Sync + 'static) -> Self {
            Self {
                answers: Arc::new(Mutex::new(answers.into())),
                fallback: Arc::new(fallback),
                requested: Arc::new(Mutex::new(vec![])),
            }
        }

        fn calls(&self) -> usize {
            self.requested.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn get_api_answer(&self, from_date: i64) -> Result<Value, RelayError> {
            self.requested.lock().unwrap().push(from_date);
            let scripted = self.answers.lock().unwrap().pop_front();
            scripted.unwrap_or_else(|| (self.fallback)())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        attempts: Arc<AtomicUsize>,
        failing: bool,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(&self, text: &str) -> anyhow::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                bail!("chat not found");
            }
            self.sent.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    fn config(retry_secs: u64) -> Config {
        Config {
            practicum_token: "practicum".to_owned(),
            telegram_token: "telegram".to_owned(),
            telegram_chat_id: "42".to_owned(),
            endpoint: "http://unused".to_owned(),
            telegram_api_url: "http://unused".to_owned(),
            retry_time: Duration::from_secs(retry_secs),
        }
    }

    fn answer(status: &str) -> Value {
        json!({
            "homeworks": [{"homework_name": "hw05_final", "status": status}],
            "current_date": 1_700_000_000
        })
    }

    #[tokio::test]
    async fn unchanged_status_is_sent_once() {
        let source = ScriptedSource::new(vec![], || Ok(answer("reviewing")));
        let notifier = RecordingNotifier::default();
        let mut relay = Relay::new(source.clone(), notifier.clone(), &config(600));

        relay.iterate().await;
        relay.iterate().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(
            notifier.sent(),
            vec!["Изменился статус проверки работы \"hw05_final\". Работа взята на проверку ревьюером."]
        );
    }

    #[tokio::test]
    async fn status_change_is_sent_again() {
        let source = ScriptedSource::new(
            vec![Ok(answer("reviewing")), Ok(answer("approved"))],
            || Ok(answer("approved")),
        );
        let notifier = RecordingNotifier::default();
        let mut relay = Relay::new(source, notifier.clone(), &config(600));

        for _ in 0..3 {
            relay.iterate().await;
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].ends_with("ревьюеру всё понравилось. Ура!"));
    }

    #[tokio::test]
    async fn failures_are_relayed_once_and_deduplicated() {
        let source = ScriptedSource::new(vec![], || Err(RelayError::BadResponseStatus(500)));
        let notifier = RecordingNotifier::default();
        let mut relay = Relay::new(source, notifier.clone(), &config(600));

        relay.iterate().await;
        relay.iterate().await;

        assert_eq!(
            notifier.sent(),
            vec!["Сбой в работе программы: Неудовлетворительный статус ответа: 500"]
        );
        assert_eq!(relay.last_message(), notifier.sent()[0]);
    }

    #[tokio::test]
    async fn poll_once_surfaces_bad_status() {
        let source = ScriptedSource::new(vec![Err(RelayError::BadResponseStatus(404))], || Ok(answer("approved")));
        let mut relay = Relay::new(source, RecordingNotifier::default(), &config(600));

        let error = relay.poll_once().await.unwrap_err();
        assert!(matches!(error, RelayError::BadResponseStatus(404)));
    }

    #[tokio::test]
    async fn unknown_status_becomes_failure_message() {
        let source = ScriptedSource::new(vec![Ok(answer("lost"))], || Ok(answer("lost")));
        let notifier = RecordingNotifier::default();
        let mut relay = Relay::new(source, notifier.clone(), &config(600));

        relay.iterate().await;

        assert_eq!(notifier.sent(), vec!["Сбой в работе программы: Неизвестный статус: lost"]);
    }

    #[tokio::test]
    async fn empty_window_is_not_relayed() {
        let source = ScriptedSource::new(vec![], || Ok(json!({"homeworks": [], "current_date": 1_700_000_000})));
        let notifier = RecordingNotifier::default();
        let mut relay = Relay::new(source, notifier.clone(), &config(600));

        relay.iterate().await;

        assert!(notifier.sent().is_empty());
        assert_eq!(relay.last_message(), "");
    }

    #[tokio::test]
    async fn window_advances_to_server_time() {
        let source = ScriptedSource::new(
            vec![Ok(answer("reviewing")), Ok(json!({"homeworks": [], "current_date": 1_700_000_600}))],
            || Ok(json!({"homeworks": []})),
        );
        let mut relay = Relay::new(source.clone(), RecordingNotifier::default(), &config(600));
        let initial = relay.from_date();

        relay.iterate().await;
        relay.iterate().await;
        relay.iterate().await;

        let requested = source.requested.lock().unwrap().clone();
        assert_eq!(requested, vec![initial, 1_700_000_000, 1_700_000_600]);
        assert_eq!(relay.from_date(), 1_700_000_600);
    }

    #[tokio::test]
    async fn window_starts_thirty_days_back() {
        let relay = Relay::new(
            ScriptedSource::new(vec![], || Ok(answer("approved"))),
            RecordingNotifier::default(),
            &config(600),
        );
        let age = Utc::now().timestamp() - relay.from_date();
        assert!((30 * 24 * 3600..30 * 24 * 3600 + 60).contains(&age));
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let source = ScriptedSource::new(vec![], || Ok(answer("approved")));
        let notifier = RecordingNotifier { failing: true, ..Default::default() };
        let mut relay = Relay::new(source, notifier.clone(), &config(600));

        relay.poll_once().await.unwrap();
        relay.poll_once().await.unwrap();

        // the message still counts as sent, so it is not retried
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
        assert!(relay.last_message().contains("hw05_final"));
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_polling_after_errors() {
        let source = ScriptedSource::new(vec![], || Err(RelayError::MissingKey("homeworks")));
        let notifier = RecordingNotifier::default();
        let mut relay = Relay::new(source.clone(), notifier.clone(), &config(10));

        let outcome = tokio::time::timeout(Duration::from_secs(35), relay.run()).await;

        assert!(outcome.is_err(), "the loop never returns on its own");
        // iterations at t = 0, 10, 20, 30
        assert_eq!(source.calls(), 4);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_sleeps_between_successful_polls() {
        let source = ScriptedSource::new(vec![], || Ok(answer("approved")));
        let mut relay = Relay::new(source.clone(), RecordingNotifier::default(), &config(600));

        let _ = tokio::time::timeout(Duration::from_secs(599), relay.run()).await;

        assert_eq!(source.calls(), 1);
    }
}
