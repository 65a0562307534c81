//! User accounts and playlists.
//!
//! An in-memory document store: users keyed by lowercase username, each
//! owning a set of playlists. Every mutation is pushed to subscribers as a
//! [`LibraryEvent`], so views can re-render from the latest snapshot instead
//! of polling.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, LibraryError, Result};
use crate::track::{DEFAULT_PLAYLIST_COVER, Playlist, Track};

/// Reserved administrator username.
pub const ADMIN_USERNAME: &str = "admin";

/// Minimum username length.
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[allow(clippy::expect_used)]
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username regex"));

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Lowercase username, also the account key.
    pub username: String,
    /// Whether the account may use admin operations.
    pub is_admin: bool,
    /// Whether the account is blocked from signing in.
    pub blocked: bool,
    /// Creation timestamp (Unix millis).
    pub created_at: u64,
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    // Creation order, breaks ties between equal timestamps.
    seq: u64,
    salt: String,
    password_hash: String,
}

impl Account {
    fn new(username: String, password: &str, is_admin: bool, seq: u64) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&salt, password);
        Self {
            user: User {
                username,
                is_admin,
                blocked: false,
                created_at: now_millis(),
            },
            seq,
            salt,
            password_hash,
        }
    }

    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

/// Change notifications pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryEvent {
    /// An account was created.
    UserCreated {
        /// The new username.
        username: String,
    },
    /// An account was blocked or unblocked.
    UserBlockChanged {
        /// The affected username.
        username: String,
        /// New blocked flag.
        blocked: bool,
    },
    /// An account and its playlists were removed.
    UserDeleted {
        /// The removed username.
        username: String,
    },
    /// A playlist was created.
    PlaylistAdded {
        /// Owner.
        username: String,
        /// New playlist.
        playlist_id: String,
    },
    /// A playlist was removed.
    PlaylistDeleted {
        /// Owner.
        username: String,
        /// Removed playlist.
        playlist_id: String,
    },
    /// A track was added to a playlist.
    TrackAdded {
        /// Owner.
        username: String,
        /// Target playlist.
        playlist_id: String,
        /// The added track.
        track_id: String,
    },
}

#[derive(Debug, Default)]
struct LibraryData {
    accounts: HashMap<String, Account>,
    next_seq: u64,
    playlists: Vec<Playlist>,
}

impl LibraryData {
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// In-memory user and playlist store.
pub struct Library {
    data: RwLock<LibraryData>,
    events: broadcast::Sender<LibraryEvent>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            data: RwLock::new(LibraryData::default()),
            events,
        }
    }

    /// Receive every subsequent change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: LibraryEvent) {
        debug!("Library event: {:?}", event);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create a regular account.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password fails validation, the
    /// username is reserved, or the account already exists.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        validate_credentials(username, password)?;
        let key = username.to_lowercase();

        let user = {
            let mut data = self.data.write().await;
            if data.accounts.contains_key(&key) {
                return Err(LibraryError::UserExists(key).into());
            }
            let seq = data.next_seq();
            let account = Account::new(key.clone(), password, false, seq);
            let user = account.user.clone();
            data.accounts.insert(key.clone(), account);
            user
        };

        info!("Created user {}", key);
        self.emit(LibraryEvent::UserCreated { username: key });
        Ok(user)
    }

    /// Create the administrator account if it does not exist yet.
    ///
    /// Returns `true` when the account was created.
    pub async fn seed_admin(&self, password: &str) -> bool {
        {
            let mut data = self.data.write().await;
            if data.accounts.contains_key(ADMIN_USERNAME) {
                return false;
            }
            let seq = data.next_seq();
            data.accounts.insert(
                ADMIN_USERNAME.to_string(),
                Account::new(ADMIN_USERNAME.to_string(), password, true, seq),
            );
        }

        info!("Seeded administrator account");
        self.emit(LibraryEvent::UserCreated {
            username: ADMIN_USERNAME.to_string(),
        });
        true
    }

    /// Check credentials and return the account.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for unknown users, `AccountBlocked` for blocked
    /// accounts, and `WrongPassword` when the password does not match.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<User> {
        let key = username.trim().to_lowercase();
        let data = self.data.read().await;
        let account = data
            .accounts
            .get(&key)
            .ok_or_else(|| Error::user_not_found(&key))?;

        if account.user.blocked {
            warn!("Sign-in refused for blocked account {}", key);
            return Err(LibraryError::AccountBlocked(key).into());
        }
        if !account.verify(password) {
            return Err(LibraryError::WrongPassword(key).into());
        }

        debug!("User {} signed in", key);
        Ok(account.user.clone())
    }

    /// Look up an account.
    pub async fn user(&self, username: &str) -> Option<User> {
        let data = self.data.read().await;
        data.accounts
            .get(&username.to_lowercase())
            .map(|a| a.user.clone())
    }

    /// All non-admin accounts, oldest first.
    ///
    /// Accounts created within the same millisecond keep creation order.
    pub async fn list_users(&self) -> Vec<User> {
        let data = self.data.read().await;
        let mut accounts: Vec<&Account> = data
            .accounts
            .values()
            .filter(|a| a.user.username != ADMIN_USERNAME)
            .collect();
        accounts.sort_by_key(|a| (a.user.created_at, a.seq));
        accounts.into_iter().map(|a| a.user.clone()).collect()
    }

    /// Block or unblock an account.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the account does not exist.
    pub async fn set_blocked(&self, username: &str, blocked: bool) -> Result<User> {
        let key = username.to_lowercase();
        let user = {
            let mut data = self.data.write().await;
            let account = data
                .accounts
                .get_mut(&key)
                .ok_or_else(|| Error::user_not_found(&key))?;
            account.user.blocked = blocked;
            account.user.clone()
        };

        info!("User {} {}", key, if blocked { "blocked" } else { "unblocked" });
        self.emit(LibraryEvent::UserBlockChanged {
            username: key,
            blocked,
        });
        Ok(user)
    }

    /// Remove an account together with its playlists.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the account does not exist.
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let key = username.to_lowercase();
        let removed = {
            let mut data = self.data.write().await;
            if data.accounts.remove(&key).is_none() {
                return Err(Error::user_not_found(key));
            }
            let before = data.playlists.len();
            data.playlists.retain(|p| p.username != key);
            before - data.playlists.len()
        };

        info!("Deleted user {} and {} playlist(s)", key, removed);
        self.emit(LibraryEvent::UserDeleted { username: key });
        Ok(())
    }

    // =========================================================================
    // Playlists
    // =========================================================================

    /// Create a playlist for a user.
    ///
    /// Tracks without an id get one; the cover comes from the first track,
    /// falling back to a stock image.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the user does not exist.
    pub async fn add_playlist(
        &self,
        username: &str,
        name: &str,
        tracks: Vec<Track>,
    ) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::InvalidPlaylistName("name is required".to_string()).into());
        }
        let key = username.to_lowercase();

        let tracks: Vec<Track> = tracks.into_iter().map(with_track_id).collect();
        let cover = tracks
            .first()
            .map(|t| t.album_cover.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_PLAYLIST_COVER)
            .to_string();

        let playlist = Playlist {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            cover,
            tracks,
            username: key.clone(),
            created_at: now_millis(),
        };

        {
            let mut data = self.data.write().await;
            if !data.accounts.contains_key(&key) {
                return Err(Error::user_not_found(key));
            }
            data.playlists.push(playlist.clone());
        }

        info!(
            "Created playlist '{}' for {} with {} track(s)",
            playlist.name,
            key,
            playlist.tracks.len()
        );
        self.emit(LibraryEvent::PlaylistAdded {
            username: key,
            playlist_id: playlist.id.clone(),
        });
        Ok(playlist)
    }

    /// Remove one of a user's playlists.
    ///
    /// # Errors
    ///
    /// Returns `PlaylistNotFound` if the user has no such playlist.
    pub async fn delete_playlist(&self, username: &str, playlist_id: &str) -> Result<()> {
        let key = username.to_lowercase();
        {
            let mut data = self.data.write().await;
            let index = data
                .playlists
                .iter()
                .position(|p| p.id == playlist_id && p.username == key)
                .ok_or_else(|| Error::playlist_not_found(playlist_id))?;
            data.playlists.remove(index);
        }

        info!("Deleted playlist {} of {}", playlist_id, key);
        self.emit(LibraryEvent::PlaylistDeleted {
            username: key,
            playlist_id: playlist_id.to_string(),
        });
        Ok(())
    }

    /// Append a track to one of a user's playlists.
    ///
    /// A track whose id is already present replaces the existing entry.
    ///
    /// # Errors
    ///
    /// Returns `PlaylistNotFound` if the user has no such playlist.
    pub async fn add_track_to_playlist(
        &self,
        username: &str,
        playlist_id: &str,
        track: Track,
    ) -> Result<Track> {
        let key = username.to_lowercase();
        let track = with_track_id(track);
        {
            let mut data = self.data.write().await;
            let playlist = data
                .playlists
                .iter_mut()
                .find(|p| p.id == playlist_id && p.username == key)
                .ok_or_else(|| Error::playlist_not_found(playlist_id))?;

            if let Some(existing) = playlist.tracks.iter_mut().find(|t| t.id == track.id) {
                *existing = track.clone();
            } else {
                playlist.tracks.push(track.clone());
            }
        }

        debug!("Added track {} to playlist {}", track.id, playlist_id);
        self.emit(LibraryEvent::TrackAdded {
            username: key,
            playlist_id: playlist_id.to_string(),
            track_id: track.id.clone(),
        });
        Ok(track)
    }

    /// Get one playlist by id.
    pub async fn playlist(&self, playlist_id: &str) -> Option<Playlist> {
        let data = self.data.read().await;
        data.playlists.iter().find(|p| p.id == playlist_id).cloned()
    }

    /// A user's playlists, oldest first.
    pub async fn user_playlists(&self, username: &str) -> Vec<Playlist> {
        let key = username.to_lowercase();
        let data = self.data.read().await;
        let mut playlists: Vec<Playlist> = data
            .playlists
            .iter()
            .filter(|p| p.username == key)
            .cloned()
            .collect();
        playlists.sort_by_key(|p| p.created_at);
        playlists
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    let invalid = |reason: &str| LibraryError::InvalidUsername {
        username: username.to_string(),
        reason: reason.to_string(),
    };

    if username.is_empty() || password.is_empty() {
        return Err(invalid("username and password are required").into());
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(invalid("must be at least 3 characters").into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(
            LibraryError::InvalidPassword("must be at least 6 characters".to_string()).into(),
        );
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            invalid("may only contain letters, numbers, underscores, and hyphens").into(),
        );
    }
    if username.eq_ignore_ascii_case(ADMIN_USERNAME) {
        return Err(invalid("this username is reserved").into());
    }
    Ok(())
}

fn with_track_id(mut track: Track) -> Track {
    if track.id.is_empty() {
        track.id = Uuid::new_v4().to_string();
    }
    track
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
