//! Feed filter descriptor and its matching rules.
//!
//! A post passes when it satisfies every active constraint: the ownership
//! flag, and for each non-empty tag set at least one shared id. Empty sets do
//! not constrain anything.

use crate::model::{
    Id,
    catalog::{LearningElementMarker, StudentMarker, TeacherMarker},
    post::Post,
    user::UserMarker,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub selected_students: Vec<Id<StudentMarker>>,
    pub selected_teachers: Vec<Id<TeacherMarker>>,
    pub selected_lessons: Vec<Id<LearningElementMarker>>,
    pub show_only_my_posts: bool,
}

impl FilterState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.show_only_my_posts
            || !self.selected_students.is_empty()
            || !self.selected_teachers.is_empty()
            || !self.selected_lessons.is_empty()
    }

    #[must_use]
    pub fn matches(&self, post: &Post, current_user_id: Option<&Id<UserMarker>>) -> bool {
        if self.show_only_my_posts && !post.is_authored_by(current_user_id) {
            return false;
        }

        intersects(&self.selected_students, &post.tags.students)
            && intersects(&self.selected_teachers, &post.tags.teachers)
            && intersects(&self.selected_lessons, &post.tags.learning_elements)
    }

    /// The posts passing this filter, in their original order.
    #[must_use]
    pub fn filter_posts(
        &self,
        posts: &[Post],
        current_user_id: Option<&Id<UserMarker>>,
    ) -> Vec<Post> {
        posts
            .iter()
            .filter(|post| self.matches(post, current_user_id))
            .cloned()
            .collect()
    }
}

fn intersects<Marker>(selected: &[Id<Marker>], tagged: &[Id<Marker>]) -> bool {
    selected.is_empty() || selected.iter().any(|id| tagged.contains(id))
}
