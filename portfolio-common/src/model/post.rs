use crate::model::{
    Id, ValidationError,
    catalog::{LearningElementMarker, StudentMarker, TeacherMarker},
    user::{Role, User, UserMarker},
};
use crate::util::{non_blank, unix_millis};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

pub const PLACEHOLDER_IMAGE_URL: &str = "/educational-achievement.jpg";
pub const POST_ID_PREFIX: &str = "post";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct PostTags {
    pub students: Vec<Id<StudentMarker>>,
    pub teachers: Vec<Id<TeacherMarker>>,
    pub learning_elements: Vec<Id<LearningElementMarker>>,
}

/// One achievement record. The author fields are a copy of the identity taken
/// when the post was created.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub author_id: Id<UserMarker>,
    pub author_name: String,
    pub author_type: Role,
    #[serde(with = "unix_millis")]
    pub created_at: UtcDateTime,
    pub tags: PostTags,
}

impl Post {
    /// Whether `user_id` may edit or delete this post.
    #[must_use]
    pub fn is_authored_by(&self, user_id: Option<&Id<UserMarker>>) -> bool {
        user_id.is_some_and(|user_id| &self.author_id == user_id)
    }
}

/// Input of the post creation workflow.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub students: Vec<Id<StudentMarker>>,
    #[serde(default)]
    pub learning_elements: Vec<Id<LearningElementMarker>>,
}

impl CreatePost {
    /// Reports every problem at once, in display order.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if non_blank(&self.title).is_none() {
            errors.push(ValidationError::MissingTitle);
        }
        if self.students.is_empty() && self.learning_elements.is_empty() {
            errors.push(ValidationError::MissingTags);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether anything was typed or selected, i.e. cancelling loses input.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        non_blank(&self.title).is_some()
            || non_blank(&self.description).is_some()
            || self.image_url.as_deref().and_then(non_blank).is_some()
            || !self.students.is_empty()
            || !self.learning_elements.is_empty()
    }

    /// Builds the post, copying the author's identity into it.
    #[must_use]
    pub fn into_post(self, id: Id<PostMarker>, author: &User, created_at: UtcDateTime) -> Post {
        let image_url = self
            .image_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_owned());

        Post {
            id,
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            image_url,
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            author_type: author.role,
            created_at,
            tags: PostTags {
                students: self.students,
                teachers: Vec::new(),
                learning_elements: self.learning_elements,
            },
        }
    }
}

/// Input of the edit workflow. Tags and authorship cannot change.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct EditPost {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl EditPost {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_blank(&self.title)
            .map(|_| ())
            .ok_or(ValidationError::MissingTitle)
    }

    #[must_use]
    pub fn apply_to(self, post: &Post) -> Post {
        Post {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            image_url: self.image_url,
            ..post.clone()
        }
    }
}
