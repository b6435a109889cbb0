use crate::{
    persist::{self, KeyValueStore, PersistError, Result},
    record::SessionRecord,
};
use portfolio_common::{
    id::IdGenerator,
    model::{
        Id,
        user::{Credentials, Role, STUDENT_AVATAR, TEACHER_AVATAR, User, UserMarker},
    },
};
use std::sync::Arc;
use tracing::{info, warn};

pub const SESSION_KEY: &str = "auth-store";
pub const REMEMBERED_CREDENTIALS_KEY: &str = "rememberedCredentials";

#[must_use]
pub fn default_users() -> Vec<User> {
    vec![
        User {
            id: Id::new("teacher-1"),
            email: "teacher@school.com".to_owned(),
            name: "Айгүл Нурписова".to_owned(),
            password: "password123".to_owned(),
            avatar: TEACHER_AVATAR.to_owned(),
            role: Role::Teacher,
        },
        User {
            id: Id::new("student-1"),
            email: "student@school.com".to_owned(),
            name: "Алия Самигулова".to_owned(),
            password: "password123".to_owned(),
            avatar: STUDENT_AVATAR.to_owned(),
            role: Role::Student,
        },
    ]
}

/// The identity registry and the signed-in identity.
///
/// Both are written to the key-value store after every change and read back
/// once in [`SessionStore::open`].
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    users: Vec<User>,
    current: Option<User>,
    user_ids: IdGenerator<UserMarker>,
}

impl SessionStore {
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let stored = match persist::load::<SessionRecord>(storage.as_ref(), SESSION_KEY) {
            Ok(stored) => stored,
            Err(PersistError::Json(err)) => {
                warn!(%err, "Ignoring unreadable stored session");
                None
            }
            Err(err) => return Err(err),
        };

        let (users, current) = match stored.map(SessionRecord::into_parts).transpose() {
            Ok(Some(parts)) => parts,
            Ok(None) => (default_users(), None),
            Err(err) => {
                warn!(%err, "Ignoring invalid stored session");
                (default_users(), None)
            }
        };

        info!(
            users = users.len(),
            signed_in = ?current.as_ref().map(|user| &user.id),
            "Opened session store"
        );
        Ok(Self {
            storage,
            users,
            current,
            user_ids: IdGenerator::new(),
        })
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn current_user_id(&self) -> Option<&Id<UserMarker>> {
        self.current.as_ref().map(|user| &user.id)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<bool> {
        let Some(user) = self
            .users
            .iter()
            .find(|user| user.has_credentials(email, password))
            .cloned()
        else {
            return Ok(false);
        };

        self.save(&self.users, Some(&user))?;
        info!(user_id = %user.id, "Signed in");
        self.current = Some(user);
        Ok(true)
    }

    /// Adds a new identity and signs it in. Returns `false`, changing nothing,
    /// when the email is already registered.
    pub fn register(
        &mut self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
    ) -> Result<bool> {
        if self.users.iter().any(|user| user.email == email) {
            return Ok(false);
        }

        let user = User {
            id: self.user_ids.generate(role.as_str()),
            email: email.to_owned(),
            name: name.to_owned(),
            password: password.to_owned(),
            avatar: role.default_avatar().to_owned(),
            role,
        };
        let mut users = self.users.clone();
        users.push(user.clone());

        self.save(&users, Some(&user))?;
        info!(user_id = %user.id, %role, "Registered");
        self.users = users;
        self.current = Some(user);
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<()> {
        let Some(user_id) = self.current_user_id() else {
            return Ok(());
        };

        self.save(&self.users, None)?;
        info!(%user_id, "Signed out");
        self.current = None;
        Ok(())
    }

    /// Removes the signed-in identity from the registry and signs out.
    pub fn delete_account(&mut self) -> Result<Option<User>> {
        let Some(user) = self.current.as_ref() else {
            return Ok(None);
        };

        let users: Vec<User> = self
            .users
            .iter()
            .filter(|known| known.id != user.id)
            .cloned()
            .collect();
        self.save(&users, None)?;

        info!(user_id = %user.id, "Deleted account");
        self.users = users;
        Ok(self.current.take())
    }

    pub fn update_avatar(&mut self, avatar: &str) -> Result<Option<&User>> {
        let Some(current) = self.current.as_ref() else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.avatar = avatar.to_owned();
        let users: Vec<User> = self
            .users
            .iter()
            .map(|known| {
                if known.id == updated.id {
                    updated.clone()
                } else {
                    known.clone()
                }
            })
            .collect();
        self.save(&users, Some(&updated))?;

        self.users = users;
        self.current = Some(updated);
        Ok(self.current.as_ref())
    }

    /// Credentials saved by an opted-in login. A corrupt entry is removed.
    pub fn remembered_credentials(&self) -> Result<Option<Credentials>> {
        match persist::load(self.storage.as_ref(), REMEMBERED_CREDENTIALS_KEY) {
            Err(PersistError::Json(err)) => {
                warn!(%err, "Removing unreadable remembered credentials");
                self.forget_credentials()?;
                Ok(None)
            }
            result => result,
        }
    }

    pub fn remember_credentials(&self, credentials: &Credentials) -> Result<()> {
        persist::save(self.storage.as_ref(), REMEMBERED_CREDENTIALS_KEY, credentials)
    }

    pub fn forget_credentials(&self) -> Result<()> {
        self.storage.remove(REMEMBERED_CREDENTIALS_KEY)
    }

    /// Writes a candidate state. Callers only commit it once this succeeds.
    fn save(&self, users: &[User], current: Option<&User>) -> Result<()> {
        let record = SessionRecord::new(users, current);
        persist::save(self.storage.as_ref(), SESSION_KEY, &record)
    }
}
