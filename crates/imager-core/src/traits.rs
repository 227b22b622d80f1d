//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use secrecy::SecretString;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, Album, Photo, Profile};

/// Data persistence contract for accounts, profiles, photos and albums.
///
/// Implementations map unique-key violations to `AppError::Conflict` and
/// keep multi-row writes atomic.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImagerRepo: Send + Sync {
    // Account Operations

    /// Atomic: inserts the account and its provisioned profile together.
    async fn create_account(&self, account: Account, profile: Profile) -> Result<()>;
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>>;
    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    /// Writes the name, email and active flag.
    async fn update_account(&self, account: &Account) -> Result<()>;
    /// Cascades to the profile and everything it owns.
    async fn delete_account(&self, id: Uuid) -> Result<()>;

    // Profile Operations
    async fn insert_profile(&self, profile: Profile) -> Result<()>;
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn get_profile_by_account(&self, account_id: Uuid) -> Result<Option<Profile>>;
    async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>>;
    /// Atomic: the account's name and email together with the profile row.
    async fn update_profile(&self, account: &Account, profile: &Profile) -> Result<()>;
    async fn list_active_profiles(&self) -> Result<Vec<Profile>>;

    // Photo Operations (collections ordered by date_uploaded, oldest first)

    /// Atomic: the row and its tags.
    async fn insert_photo(&self, photo: &Photo) -> Result<()>;
    async fn get_photo(&self, id: Uuid) -> Result<Option<Photo>>;
    async fn get_photos(&self, ids: &[Uuid]) -> Result<Vec<Photo>>;
    /// Atomic: the row and its tags.
    async fn update_photo(&self, photo: &Photo) -> Result<()>;
    /// Detaches the photo from albums and clears covers pointing at it.
    async fn delete_photo(&self, id: Uuid) -> Result<()>;
    async fn list_photos_by_owner(&self, owner_id: Uuid) -> Result<Vec<Photo>>;
    async fn list_public_photos(&self) -> Result<Vec<Photo>>;
    async fn list_photos_tagged(&self, tag: &str) -> Result<Vec<Photo>>;
    async fn random_public_photo(&self) -> Result<Option<Photo>>;

    // Album Operations

    /// Atomic: the row and its membership.
    async fn insert_album(&self, album: &Album) -> Result<()>;
    async fn get_album(&self, id: Uuid) -> Result<Option<Album>>;
    /// Atomic: the row and its membership.
    async fn update_album(&self, album: &Album) -> Result<()>;
    async fn delete_album(&self, id: Uuid) -> Result<()>;
    async fn list_albums_by_owner(&self, owner_id: Uuid) -> Result<Vec<Album>>;
    async fn list_public_albums(&self) -> Result<Vec<Album>>;
}

/// Password hashing contract.
pub trait Credentials: Send + Sync {
    /// Returns a self-describing hash string suitable for storage.
    fn hash_password(&self, password: &SecretString) -> Result<String>;

    /// `false` on mismatch or on a malformed stored hash.
    fn verify_password(&self, password: &SecretString, hash: &str) -> bool;
}
