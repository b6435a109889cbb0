//! The portfolio application state behind a single service object.
//!
//! [`PortfolioClient`] owns the feed, the session and the pager, and runs the
//! user-facing workflows (signing in, posting, filtering, paging) with their
//! simulated latency and notifications.

use crate::{
    feed::{FeedStore, StoreError},
    notify::{NotificationSink, Severity},
    pager::{DEFAULT_PAGE_LATENCY, DEFAULT_PAGE_SIZE, FeedPager, LoadOutcome, PagerSnapshot},
    persist::PersistError,
    session::SessionStore,
};
use portfolio_common::{
    id::IdGenerator,
    model::{
        Id, ValidationError,
        filter::FilterState,
        post::{CreatePost, EditPost, POST_ID_PREFIX, Post, PostMarker},
        user::{Credentials, LoginForm, RegistrationForm, User, UserMarker},
    },
};
use serde::Serialize;
use std::{
    fmt::{Display, Formatter},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use thiserror::Error;
use time::UtcDateTime;
use tokio::{sync::RwLock, time::sleep};
use tracing::{info, warn};

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

const LOGIN_SUCCEEDED: &str = "Вход выполнен успешно";
const LOGIN_FAILED: &str = "Ошибка входа";
const REGISTRATION_SUCCEEDED: &str = "Регистрация выполнена успешно";
const REGISTRATION_FAILED: &str = "Ошибка регистрации";
const POST_CREATED: &str = "Пост успешно создан!";
const POST_DELETED: &str = "Пост удален";
const DRAFT_CANCELLED: &str = "Действие отменено";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("Неверный email или пароль")]
    InvalidCredentials,
    #[error("Пользователь с таким email уже существует")]
    EmailTaken,
    #[error("Не удалось определить автора. Войдите в систему и попробуйте снова.")]
    NotSignedIn,
    #[error("Only the author may change post {0}.")]
    NotAuthor(Id<PostMarker>),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut errors = self.0.iter();
        if let Some(first) = errors.next() {
            Display::fmt(first, f)?;
        }
        for error in errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl From<ValidationError> for ClientError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(ValidationErrors(vec![value]))
    }
}

impl From<Vec<ValidationError>> for ClientError {
    fn from(value: Vec<ValidationError>) -> Self {
        Self::Invalid(ValidationErrors(value))
    }
}

/// Simulated latency of each workflow.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Latencies {
    pub login: Duration,
    pub register: Duration,
    pub save_post: Duration,
    pub edit_post: Duration,
    pub delete_post: Duration,
    pub page: Duration,
}

impl Latencies {
    pub const NONE: Self = Self {
        login: Duration::ZERO,
        register: Duration::ZERO,
        save_post: Duration::ZERO,
        edit_post: Duration::ZERO,
        delete_post: Duration::ZERO,
        page: Duration::ZERO,
    };
}

impl Default for Latencies {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(600),
            register: Duration::from_millis(600),
            save_post: Duration::from_millis(300),
            edit_post: Duration::from_millis(200),
            delete_post: Duration::from_millis(200),
            page: DEFAULT_PAGE_LATENCY,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct ClientSettings {
    pub page_size: usize,
    pub latencies: Latencies,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            latencies: Latencies::default(),
        }
    }
}

/// A post together with whether the signed-in identity may change it.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub can_modify: bool,
}

impl PostView {
    #[must_use]
    pub fn new(post: Post, user_id: Option<&Id<UserMarker>>) -> Self {
        let can_modify = post.is_authored_by(user_id);
        Self { post, can_modify }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct FeedPage {
    pub posts: Vec<PostView>,
    pub pager: PagerSnapshot,
    pub total: usize,
    pub filters_active: bool,
}

#[derive(Debug)]
pub struct PortfolioClient {
    feed: RwLock<FeedStore>,
    session: RwLock<SessionStore>,
    pager: FeedPager,
    notifications: Arc<dyn NotificationSink>,
    post_ids: Mutex<IdGenerator<PostMarker>>,
    latencies: Latencies,
}

impl PortfolioClient {
    #[must_use]
    pub fn new(
        mut feed: FeedStore,
        session: SessionStore,
        notifications: Arc<dyn NotificationSink>,
        settings: ClientSettings,
    ) -> Self {
        feed.set_current_user_id(session.current_user_id().cloned());
        let pager = FeedPager::new(settings.page_size, settings.latencies.page);
        pager.reset(&feed);

        Self {
            feed: RwLock::new(feed),
            session: RwLock::new(session),
            pager,
            notifications,
            post_ids: Mutex::new(IdGenerator::new()),
            latencies: settings.latencies,
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.current_user().cloned()
    }

    pub async fn remembered_credentials(&self) -> Result<Option<Credentials>> {
        Ok(self.session.read().await.remembered_credentials()?)
    }

    pub async fn forget_credentials(&self) -> Result<()> {
        Ok(self.session.read().await.forget_credentials()?)
    }

    pub async fn login(&self, form: LoginForm) -> Result<User> {
        form.validate()?;
        sleep(self.latencies.login).await;

        let (user, remembered) = {
            let mut session = self.session.write().await;
            if !session.login(&form.email, &form.password)? {
                warn!(email = %form.email, "Rejected login");
                self.notifications.notify(Severity::Error, LOGIN_FAILED);
                return Err(ClientError::InvalidCredentials);
            }

            let remembered = if form.remember {
                session.remember_credentials(&form.credentials())
            } else {
                session.forget_credentials()
            };
            let user = session.current_user().cloned().ok_or(ClientError::NotSignedIn)?;
            (user, remembered)
        };

        self.switch_feed_owner(Some(user.id.clone())).await;
        if let Err(err) = remembered {
            warn!(%err, user_id = %user.id, "Could not update remembered credentials");
        }
        self.notifications.notify(Severity::Success, LOGIN_SUCCEEDED);
        Ok(user)
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<User> {
        form.validate()?;
        sleep(self.latencies.register).await;

        let user = {
            let mut session = self.session.write().await;
            if !session.register(&form.email, &form.name, &form.password, form.role)? {
                warn!(email = %form.email, "Rejected registration");
                self.notifications.notify(Severity::Error, REGISTRATION_FAILED);
                return Err(ClientError::EmailTaken);
            }
            session.current_user().cloned().ok_or(ClientError::NotSignedIn)?
        };

        self.switch_feed_owner(Some(user.id.clone())).await;
        self.notifications
            .notify(Severity::Success, REGISTRATION_SUCCEEDED);
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.write().await.logout()?;
        self.switch_feed_owner(None).await;
        Ok(())
    }

    /// Authored posts stay in the feed.
    pub async fn delete_account(&self) -> Result<User> {
        let deleted = self
            .session
            .write()
            .await
            .delete_account()?
            .ok_or(ClientError::NotSignedIn)?;

        self.switch_feed_owner(None).await;
        Ok(deleted)
    }

    pub async fn update_avatar(&self, avatar: &str) -> Result<User> {
        self.session
            .write()
            .await
            .update_avatar(avatar)?
            .cloned()
            .ok_or(ClientError::NotSignedIn)
    }

    pub async fn filters(&self) -> FilterState {
        self.feed.read().await.filters().clone()
    }

    /// Stages filters without touching the feed.
    pub async fn stage_filters(&self, filters: FilterState) {
        self.feed.write().await.set_filters(filters);
    }

    pub async fn apply_filters(&self) -> PagerSnapshot {
        let mut feed = self.feed.write().await;
        feed.apply_filters();
        self.pager.reset(&feed);
        self.pager.snapshot()
    }

    pub async fn reset_filters(&self) -> PagerSnapshot {
        let mut feed = self.feed.write().await;
        feed.reset_filters();
        self.pager.reset(&feed);
        self.pager.snapshot()
    }

    pub async fn feed_page(&self) -> FeedPage {
        let feed = self.feed.read().await;
        let user_id = feed.current_user_id();

        FeedPage {
            posts: self
                .pager
                .window(&feed)
                .iter()
                .map(|post| PostView::new(post.clone(), user_id))
                .collect(),
            pager: self.pager.snapshot(),
            total: feed.filtered_posts().len(),
            filters_active: feed.filters().is_active(),
        }
    }

    /// The scroll proximity signal.
    pub async fn load_more(&self) -> LoadOutcome {
        self.pager.on_proximity(&self.feed).await
    }

    pub async fn post(&self, id: &Id<PostMarker>) -> Option<PostView> {
        let feed = self.feed.read().await;
        feed.post(id)
            .map(|post| PostView::new(post.clone(), feed.current_user_id()))
    }

    pub async fn create_post(&self, draft: CreatePost) -> Result<Post> {
        draft.validate()?;
        let author = self
            .current_user()
            .await
            .ok_or(ClientError::NotSignedIn)?;

        let id = self
            .post_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(POST_ID_PREFIX);
        let post = draft.into_post(id, &author, UtcDateTime::now());
        sleep(self.latencies.save_post).await;

        {
            let mut feed = self.feed.write().await;
            feed.add_post(post.clone())?;
            self.pager.reset(&feed);
        }

        info!(post_id = %post.id, author = %author.id, "Created post");
        self.notifications.notify(Severity::Success, POST_CREATED);
        Ok(post)
    }

    /// Returns whether the draft had input worth telling the user about.
    pub fn cancel_draft(&self, draft: &CreatePost) -> bool {
        let dirty = draft.is_dirty();
        if dirty {
            self.notifications.notify(Severity::Info, DRAFT_CANCELLED);
        }
        dirty
    }

    pub async fn edit_post(&self, id: &Id<PostMarker>, edit: EditPost) -> Result<Post> {
        edit.validate()?;
        let original = self.owned_post(id).await?;
        let edited = edit.apply_to(&original);
        sleep(self.latencies.edit_post).await;

        self.feed.write().await.update_post(id, edited.clone())?;
        info!(post_id = %id, "Edited post");
        Ok(edited)
    }

    pub async fn delete_post(&self, id: &Id<PostMarker>) -> Result<Post> {
        self.owned_post(id).await?;
        sleep(self.latencies.delete_post).await;

        let removed = {
            let mut feed = self.feed.write().await;
            let removed = feed.delete_post(id)?;
            self.pager.reset(&feed);
            removed
        };

        info!(post_id = %id, "Deleted post");
        self.notifications.notify(Severity::Success, POST_DELETED);
        Ok(removed)
    }

    /// Tears down paging; pending page loads finish without effect.
    pub fn shutdown(&self) {
        self.pager.dispose();
    }

    async fn owned_post(&self, id: &Id<PostMarker>) -> Result<Post> {
        let user_id = self
            .session
            .read()
            .await
            .current_user_id()
            .cloned()
            .ok_or(ClientError::NotSignedIn)?;
        let post = self
            .feed
            .read()
            .await
            .post(id)
            .cloned()
            .ok_or_else(|| StoreError::PostNotFound(id.clone()))?;

        if post.is_authored_by(Some(&user_id)) {
            Ok(post)
        } else {
            Err(ClientError::NotAuthor(id.clone()))
        }
    }

    async fn switch_feed_owner(&self, user_id: Option<Id<UserMarker>>) {
        let mut feed = self.feed.write().await;
        feed.set_current_user_id(user_id);
        self.pager.reset(&feed);
    }
}
