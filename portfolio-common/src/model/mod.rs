pub mod catalog;
pub mod filter;
pub mod post;
pub mod user;

pub use crate::id::Id;

use thiserror::Error;

/// A problem with user input, carrying the message shown to the user.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum ValidationError {
    #[error("Заполните все поля")]
    MissingFields,
    #[error("Введите корректный email")]
    InvalidEmail,
    #[error("Пароль должен быть не короче 6 символов и содержать латинские буквы")]
    WeakPassword,
    #[error("Пароли не совпадают")]
    PasswordMismatch,
    #[error("Заголовок обязателен")]
    MissingTitle,
    #[error("Выберите хотя бы один тег (ученика или урок)")]
    MissingTags,
}
