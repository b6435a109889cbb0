use crate::model::{Id, ValidationError};
use crate::util::non_blank;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    sync::LazyLock,
};

pub const TEACHER_AVATAR: &str = "👩‍🏫";
pub const STUDENT_AVATAR: &str = "👩‍🎓";
/// Glyphs offered by the avatar picker.
pub const AVATAR_OPTIONS: [&str; 8] = ["👩‍🏫", "👨‍🏫", "👩‍🎓", "👨‍🎓", "😊", "🤓", "😎", "🙂"];

pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PASSWORD_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9!@#$%^&*()_+\-=\[\]{};':",.<>/?]+$"#).expect("valid password pattern")
});

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    #[must_use]
    pub fn default_avatar(self) -> &'static str {
        match self {
            Role::Teacher => TEACHER_AVATAR,
            Role::Student => STUDENT_AVATAR,
        }
    }

    /// Guesses the role from an id prefix such as `teacher-3`.
    #[must_use]
    pub fn from_id_prefix(id: &Id<UserMarker>) -> Option<Self> {
        [Role::Teacher, Role::Student]
            .into_iter()
            .find(|role| id.has_prefix(role.as_str()))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered identity. The password is kept verbatim and never serialized
/// into responses.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub avatar: String,
    #[serde(rename = "type")]
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn has_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

impl LoginForm {
    /// Reports the first problem only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if non_blank(&self.email).is_none() || non_blank(&self.password).is_none() {
            return Err(ValidationError::MissingFields);
        }
        check_email_and_password(&self.email, &self.password)
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(alias = "type")]
    pub role: Role,
}

impl RegistrationForm {
    /// Reports the first problem only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            &self.email,
            &self.name,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|field| non_blank(field).is_none()) {
            return Err(ValidationError::MissingFields);
        }
        check_email_and_password(&self.email, &self.password)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

fn check_email_and_password(email: &str, password: &str) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        Err(ValidationError::InvalidEmail)
    } else if !is_valid_password(password) {
        Err(ValidationError::WeakPassword)
    } else {
        Ok(())
    }
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// At least six characters from the allowed set, one of them a Latin letter.
#[must_use]
pub fn is_valid_password(value: &str) -> bool {
    value.len() >= PASSWORD_MIN_LEN
        && PASSWORD_CHARSET.is_match(value)
        && value.chars().any(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id, ValidationError,
        user::{LoginForm, RegistrationForm, Role, User, is_valid_email, is_valid_password},
    };

    #[test]
    fn emails() {
        assert!(is_valid_email("teacher@school.com"));
        assert!(is_valid_email("a.b@c.d"));
        assert!(!is_valid_email("teacher@school"));
        assert!(!is_valid_email("teacher school@x.com"));
        assert!(!is_valid_email("@school.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn passwords() {
        assert!(is_valid_password("password123"));
        assert!(is_valid_password("abc!@#"));
        assert!(!is_valid_password("abc12"));
        assert!(!is_valid_password("123456"));
        assert!(!is_valid_password("пароль123"));
        assert!(!is_valid_password("pass word"));
    }

    #[test]
    fn role_from_prefix() {
        assert_eq!(Role::from_id_prefix(&Id::new("teacher-1")), Some(Role::Teacher));
        assert_eq!(
            Role::from_id_prefix(&Id::new("student-1761303300000-0")),
            Some(Role::Student)
        );
        assert_eq!(Role::from_id_prefix(&Id::new("admin-1")), None);
    }

    #[test]
    fn password_is_not_serialized() {
        let user = User {
            id: Id::new("teacher-1"),
            email: "teacher@school.com".to_owned(),
            name: "A".to_owned(),
            password: "password123".to_owned(),
            avatar: Role::Teacher.default_avatar().to_owned(),
            role: Role::Teacher,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["type"], "teacher");
    }

    #[test]
    fn login_form_checks_in_order() {
        let mut form = LoginForm {
            email: " ".to_owned(),
            password: "password123".to_owned(),
            remember: false,
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));

        form.email = "teacher".to_owned();
        form.password = "123".to_owned();
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));

        form.email = "teacher@school.com".to_owned();
        assert_eq!(form.validate(), Err(ValidationError::WeakPassword));

        form.password = "password123".to_owned();
        assert_eq!(form.validate(), Ok(()));
        assert_eq!(form.credentials().email, "teacher@school.com");
    }

    #[test]
    fn registration_form() {
        let mut form = RegistrationForm {
            email: "new@school.com".to_owned(),
            name: "".to_owned(),
            password: "secret1".to_owned(),
            confirm_password: "secret2".to_owned(),
            role: Role::Student,
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));

        form.name = "Новый".to_owned();
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));

        form.confirm_password = "secret1".to_owned();
        assert_eq!(form.validate(), Ok(()));
    }
}
