//! File-backed store service: user registry and subscription mutations.
//!
//! One `TextStore` is constructed at startup and shared behind `Arc` by the
//! web server and the bot handlers. The in-memory data sits behind a
//! `std::sync::RwLock` that is only ever held across synchronous sections;
//! every mutation awaits the durable save before reporting success.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::state::{RawState, StoreData, Texts, UserRecord};
use crate::core::error::{AppError, AppResult};
use crate::core::subscription;

pub struct TextStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl TextStore {
    /// Loads the store from `path`, creating and persisting an empty one
    /// when the file does not exist yet.
    ///
    /// Unreadable storage or invalid JSON syntax is fatal. Malformed
    /// individual records are repaired instead — see [`RawState::normalize`].
    pub async fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs_err::tokio::create_dir_all(dir).await?;
            }
        }

        match fs_err::tokio::read_to_string(&path).await {
            Ok(contents) => {
                let raw: RawState = serde_json::from_str(&contents)?;
                Ok(Self {
                    path,
                    data: RwLock::new(raw.normalize()),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let store = Self {
                    path,
                    data: RwLock::new(StoreData::default()),
                };
                store.save().await?;
                Ok(store)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persists the current in-memory state.
    ///
    /// The snapshot is serialized under the lock, then written to a sibling
    /// temp file that is renamed over the data file, so a load never
    /// observes a partial write.
    pub async fn save(&self) -> AppResult<()> {
        let payload = {
            let data = self.read();
            serde_json::to_string_pretty(&*data)?
        };

        let tmp = self.path.with_extension("tmp");
        fs_err::tokio::write(&tmp, payload).await?;
        fs_err::tokio::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Returns the user for `identity`, creating and persisting a fresh
    /// record exactly once on first contact. Repeat calls are idempotent
    /// and do not touch the file.
    pub async fn ensure_user(&self, identity: &str) -> AppResult<UserRecord> {
        let (user, created) = {
            let mut data = self.write();
            match data.users.get(identity) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let user = UserRecord::new();
                    data.tokens.insert(user.token.clone(), identity.to_string());
                    data.users.insert(identity.to_string(), user.clone());
                    (user, true)
                }
            }
        };

        if created {
            log::info!("Created user {identity}");
            self.save().await?;
        }
        Ok(user)
    }

    /// O(1) token lookup via the derived index. A stale index entry whose
    /// user vanished resolves to `None`, never an error.
    pub fn find_by_token(&self, token: &str) -> Option<(String, UserRecord)> {
        let data = self.read();
        let identity = data.tokens.get(token)?;
        let user = data.users.get(identity)?;
        Some((identity.clone(), user.clone()))
    }

    pub fn get_user(&self, identity: &str) -> Option<UserRecord> {
        self.read().users.get(identity).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.read().users.len()
    }

    /// Full copy of the current state, for tests and diagnostics.
    pub fn snapshot(&self) -> StoreData {
        self.read().clone()
    }

    /// Applies `update` to the user's texts, stamps `updatedAt` and persists.
    pub async fn update_texts<F>(&self, identity: &str, now: DateTime<Utc>, update: F) -> AppResult<Texts>
    where
        F: FnOnce(&mut Texts),
    {
        let texts = {
            let mut data = self.write();
            let user = data
                .users
                .get_mut(identity)
                .ok_or_else(|| AppError::Validation(format!("unknown user: {identity}")))?;
            update(&mut user.texts);
            user.updated_at = Some(now);
            user.texts.clone()
        };

        self.save().await?;
        Ok(texts)
    }

    /// Extends the user's subscription by `days` whole UTC days and
    /// persists the new expiry. Invalid `days` is rejected before any
    /// state is touched.
    pub async fn extend_subscription(&self, identity: &str, days: i64, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let expires_at = {
            let mut data = self.write();
            let user = data
                .users
                .get_mut(identity)
                .ok_or_else(|| AppError::Validation(format!("unknown user: {identity}")))?;
            let next = subscription::extend(user.subscription_expires_at, days, now)?;
            user.subscription_expires_at = Some(next);
            next
        };

        self.save().await?;
        log::info!("Subscription for {identity} extended by {days} days, now expires {expires_at}");
        Ok(expires_at)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}
