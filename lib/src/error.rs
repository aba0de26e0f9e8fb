use thiserror::Error;


/// Everything that can go wrong inside one polling iteration.
///
/// The display text ends up in the chat as part of the failure message, so it
/// is written for the person reading the notification.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Ошибка при запросе к основному API {endpoint}: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Неудовлетворительный статус ответа: {0}")]
    BadResponseStatus(u16),

    #[error("Ответ API не является JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Ответ API не является словарем: {0}")]
    WrongTypeResponse(String),

    #[error("Ключ {0} отсутствует")]
    MissingKey(&'static str),

    #[error("Значение {key} имеет неверный тип, ожидался {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("Список {0} пуст")]
    EmptyValue(&'static str),

    #[error("Неизвестный статус: {0}")]
    UnknownStatus(String),
}
