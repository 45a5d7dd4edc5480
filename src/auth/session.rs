use crate::auth::models::User;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The signed-in user shared by every client built from one `FirebaseApp`.
#[derive(Clone, Default)]
pub struct Session {
    current: Arc<RwLock<Option<User>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn id_token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|user| user.id_token.clone())
    }

    pub(crate) async fn set(&self, user: User) {
        *self.current.write().await = Some(user);
    }

    pub(crate) async fn clear(&self) -> Option<User> {
        self.current.write().await.take()
    }
}
