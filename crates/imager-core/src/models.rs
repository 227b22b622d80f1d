//! # Domain Models
//!
//! These structs represent the core entities of Imager.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Controls who may read a photo or album.
///
/// `Shared` is accepted and stored but currently grants nothing beyond
/// `Private`: there is no "shared with" relation yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Publication {
    #[default]
    Private,
    Shared,
    Public,
}

impl Publication {
    pub fn as_str(&self) -> &'static str {
        match self {
            Publication::Private => "PRIVATE",
            Publication::Shared => "SHARED",
            Publication::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Publication {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PRIVATE" => Ok(Publication::Private),
            "SHARED" => Ok(Publication::Shared),
            "PUBLIC" => Ok(Publication::Public),
            other => Err(AppError::ValidationError(format!(
                "unknown publication state {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhotographyStyle {
    Nature,
    Urban,
    Portrait,
}

impl PhotographyStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotographyStyle::Nature => "NATURE",
            PhotographyStyle::Urban => "URBAN",
            PhotographyStyle::Portrait => "PORTRAIT",
        }
    }
}

impl FromStr for PhotographyStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NATURE" => Ok(PhotographyStyle::Nature),
            "URBAN" => Ok(PhotographyStyle::Urban),
            "PORTRAIT" => Ok(PhotographyStyle::Portrait),
            other => Err(AppError::ValidationError(format!(
                "unknown photography style {other:?}"
            ))),
        }
    }
}

/// A login identity. Owns exactly one [`Profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Argon2 PHC string. Never leaves the process.
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// The owning identity for content, one per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Read from the owning account at query time
    pub username: String,
    /// Read from the owning account at query time
    pub is_active: bool,
    pub camera_type: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub hireable: bool,
    /// Miles, two decimal places, at most 999.99
    pub travel_radius: Option<f64>,
    pub phone: Option<String>,
    pub photography_style: Option<PhotographyStyle>,
}

impl Profile {
    /// The blank profile every new account starts with.
    pub fn provision(account: &Account) -> Self {
        Self {
            id: Uuid::now_v7(),
            account_id: account.id,
            username: account.username.clone(),
            is_active: account.is_active,
            camera_type: None,
            address: None,
            bio: None,
            website: None,
            hireable: true,
            travel_radius: None,
            phone: None,
            photography_style: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Opaque reference to the stored image payload
    pub image: String,
    pub published: Publication,
    pub date_uploaded: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_published: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
}

impl Photo {
    pub fn set_publication(&mut self, next: Publication, now: DateTime<Utc>) {
        transition(&mut self.published, &mut self.date_published, next, now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.date_modified = now;
    }
}

/// A titled, owner-curated set of photos with an optional cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub published: Publication,
    pub date_uploaded: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_published: Option<DateTime<Utc>>,
    /// Member photos, oldest upload first
    pub photo_ids: Vec<Uuid>,
    /// Always one of `photo_ids` when set
    pub cover_photo_id: Option<Uuid>,
}

impl Album {
    pub fn set_publication(&mut self, next: Publication, now: DateTime<Utc>) {
        transition(&mut self.published, &mut self.date_published, next, now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.date_modified = now;
    }

    pub fn contains(&self, photo_id: Uuid) -> bool {
        self.photo_ids.contains(&photo_id)
    }

    /// Returns `false` when the photo was already a member.
    pub fn add_photo(&mut self, photo_id: Uuid) -> bool {
        if self.contains(photo_id) {
            return false;
        }
        self.photo_ids.push(photo_id);
        true
    }

    /// Drops a member, clearing the cover if it pointed at it.
    /// Returns `false` when the photo was not a member.
    pub fn remove_photo(&mut self, photo_id: Uuid) -> bool {
        let before = self.photo_ids.len();
        self.photo_ids.retain(|id| *id != photo_id);
        if self.cover_photo_id == Some(photo_id) {
            self.cover_photo_id = None;
        }
        self.photo_ids.len() != before
    }

    /// Replaces the member set. A cover that is no longer a member is cleared.
    pub fn replace_photos(&mut self, photo_ids: Vec<Uuid>) {
        let mut seen = BTreeSet::new();
        self.photo_ids = photo_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if let Some(cover) = self.cover_photo_id {
            if !self.contains(cover) {
                self.cover_photo_id = None;
            }
        }
    }

    pub fn set_cover_photo(&mut self, photo_id: Option<Uuid>) -> Result<()> {
        if let Some(id) = photo_id {
            if !self.contains(id) {
                return Err(AppError::Conflict(format!(
                    "photo {id} is not a member of album {}",
                    self.id
                )));
            }
        }
        self.cover_photo_id = photo_id;
        Ok(())
    }
}

/// Moves an item between publication states, keeping `date_published`
/// in step: stamped on entering PUBLIC, cleared on leaving it.
fn transition(
    published: &mut Publication,
    date_published: &mut Option<DateTime<Utc>>,
    next: Publication,
    now: DateTime<Utc>,
) {
    match (*published, next) {
        (Publication::Public, Publication::Public) => {}
        (_, Publication::Public) => *date_published = Some(now),
        _ => *date_published = None,
    }
    *published = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album_with(photos: &[Uuid]) -> Album {
        let now = Utc::now();
        Album {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            title: "Trip".into(),
            description: None,
            published: Publication::default(),
            date_uploaded: now,
            date_modified: now,
            date_published: None,
            photo_ids: photos.to_vec(),
            cover_photo_id: None,
        }
    }

    #[test]
    fn publication_defaults_to_private_and_parses_its_own_text() {
        assert_eq!(Publication::default(), Publication::Private);
        for state in [Publication::Private, Publication::Shared, Publication::Public] {
            assert_eq!(state.as_str().parse::<Publication>().unwrap(), state);
        }
        assert!(matches!(
            "public".parse::<Publication>(),
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(serde_json::to_string(&Publication::Shared).unwrap(), "\"SHARED\"");
    }

    #[test]
    fn publishing_stamps_and_unpublishing_clears_date() {
        let mut album = album_with(&[]);
        let first = Utc::now();
        album.set_publication(Publication::Public, first);
        assert_eq!(album.date_published, Some(first));

        // Re-publishing keeps the original stamp
        album.set_publication(Publication::Public, first + chrono::Duration::seconds(5));
        assert_eq!(album.date_published, Some(first));

        album.set_publication(Publication::Shared, Utc::now());
        assert_eq!(album.published, Publication::Shared);
        assert_eq!(album.date_published, None);
    }

    #[test]
    fn removing_cover_clears_it() {
        let (p1, p2) = (Uuid::now_v7(), Uuid::now_v7());
        let mut album = album_with(&[p1, p2]);
        album.set_cover_photo(Some(p1)).unwrap();

        assert!(album.remove_photo(p1));
        assert_eq!(album.cover_photo_id, None);
        assert_eq!(album.photo_ids, vec![p2]);
        assert!(!album.remove_photo(p1));
    }

    #[test]
    fn cover_must_be_a_member() {
        let p1 = Uuid::now_v7();
        let mut album = album_with(&[p1]);
        let err = album.set_cover_photo(Some(Uuid::now_v7())).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(album.cover_photo_id, None);
    }

    #[test]
    fn replacing_members_dedupes_and_drops_stale_cover() {
        let (p1, p2) = (Uuid::now_v7(), Uuid::now_v7());
        let mut album = album_with(&[p1]);
        album.set_cover_photo(Some(p1)).unwrap();

        album.replace_photos(vec![p2, p2]);
        assert_eq!(album.photo_ids, vec![p2]);
        assert_eq!(album.cover_photo_id, None);
    }
}
