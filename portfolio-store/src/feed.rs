use portfolio_common::model::{
    Id,
    filter::FilterState,
    post::{Post, PostMarker},
    user::UserMarker,
};
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum StoreError {
    #[error("Post with id {0} was not found.")]
    PostNotFound(Id<PostMarker>),
    #[error("Post with id {0} already exists.")]
    DuplicatePostId(Id<PostMarker>),
}

/// The post collection and its filtered projection.
///
/// Filters are staged with [`FeedStore::set_filters`] and only take effect on
/// [`FeedStore::apply_filters`]. A change of the signed-in user recomputes the
/// projection right away.
#[derive(Clone, Debug, Default)]
pub struct FeedStore {
    posts: Vec<Post>,
    filtered: Vec<Post>,
    filters: FilterState,
    current_user_id: Option<Id<UserMarker>>,
    generation: u64,
}

impl FeedStore {
    /// `posts` are expected newest first.
    #[must_use]
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            filtered: posts.clone(),
            posts,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn filtered_posts(&self) -> &[Post] {
        &self.filtered
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn current_user_id(&self) -> Option<&Id<UserMarker>> {
        self.current_user_id.as_ref()
    }

    #[must_use]
    pub fn post(&self, id: &Id<PostMarker>) -> Option<&Post> {
        self.posts.iter().find(|post| &post.id == id)
    }

    /// Bumped whenever the filtered projection is replaced or loses or gains
    /// a post. In-place edits keep it.
    #[must_use]
    pub fn view_generation(&self) -> u64 {
        self.generation
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        debug!(?filters, "Staging filters");
        self.filters = filters;
    }

    pub fn apply_filters(&mut self) {
        self.recompute();
    }

    pub fn set_current_user_id(&mut self, user_id: Option<Id<UserMarker>>) {
        debug!(user_id = ?user_id, "Switching feed owner");
        self.current_user_id = user_id;
        self.recompute();
    }

    pub fn add_post(&mut self, post: Post) -> Result<()> {
        if self.post(&post.id).is_some() {
            return Err(StoreError::DuplicatePostId(post.id));
        }

        debug!(post_id = %post.id, "Adding post");
        self.posts.insert(0, post);
        self.recompute();
        Ok(())
    }

    /// Replaces the post in the collection and, without re-filtering, in the
    /// current projection.
    pub fn update_post(&mut self, id: &Id<PostMarker>, post: Post) -> Result<()> {
        let slot = self
            .posts
            .iter_mut()
            .find(|candidate| &candidate.id == id)
            .ok_or_else(|| StoreError::PostNotFound(id.clone()))?;
        *slot = post.clone();

        if let Some(slot) = self.filtered.iter_mut().find(|candidate| &candidate.id == id) {
            *slot = post;
        }

        debug!(post_id = %id, "Updated post");
        Ok(())
    }

    pub fn delete_post(&mut self, id: &Id<PostMarker>) -> Result<Post> {
        let index = self
            .posts
            .iter()
            .position(|post| &post.id == id)
            .ok_or_else(|| StoreError::PostNotFound(id.clone()))?;
        let removed = self.posts.remove(index);

        self.filtered.retain(|post| &post.id != id);
        self.generation += 1;

        debug!(post_id = %id, "Deleted post");
        Ok(removed)
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = self
            .filters
            .filter_posts(&self.posts, self.current_user_id.as_ref());
        self.generation += 1;

        debug!(
            total = self.posts.len(),
            matching = self.filtered.len(),
            generation = self.generation,
            "Recomputed feed"
        );
    }
}
