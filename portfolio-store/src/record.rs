//! Shapes of the blobs written to the key-value store.

use portfolio_common::model::{
    Id,
    user::{Role, User, is_valid_email},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Stored session had an invalid entry")]
pub struct SessionDataError;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub avatar: String,
    #[serde(rename = "type")]
    pub role: Role,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct SessionRecord {
    pub users: Vec<UserRecord>,
    pub user: Option<UserRecord>,
}

impl From<&User> for UserRecord {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.get().to_owned(),
            email: value.email.clone(),
            name: value.name.clone(),
            password: value.password.clone(),
            avatar: value.avatar.clone(),
            role: value.role,
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = SessionDataError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        if value.id.is_empty() || !is_valid_email(&value.email) {
            return Err(SessionDataError);
        }

        Ok(Self {
            id: Id::new(value.id),
            email: value.email,
            name: value.name,
            password: value.password,
            avatar: value.avatar,
            role: value.role,
        })
    }
}

impl SessionRecord {
    #[must_use]
    pub fn new(users: &[User], user: Option<&User>) -> Self {
        Self {
            users: users.iter().map(UserRecord::from).collect(),
            user: user.map(UserRecord::from),
        }
    }

    /// The registry and the signed-in identity. The identity is dropped when
    /// it is no longer part of the registry. Ids and emails must be unique
    /// within the registry.
    pub fn into_parts(self) -> Result<(Vec<User>, Option<User>), SessionDataError> {
        let users = self
            .users
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids = HashSet::new();
        let mut emails = HashSet::new();
        if !users
            .iter()
            .all(|user| ids.insert(&user.id) && emails.insert(user.email.as_str()))
        {
            return Err(SessionDataError);
        }

        let user = self
            .user
            .map(User::try_from)
            .transpose()?
            .filter(|user| users.iter().any(|known| known.id == user.id));

        Ok((users, user))
    }
}
