//! Request and response shapes for [`crate::ImagerService`].

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Album, PhotographyStyle, Photo, Publication};

#[derive(Debug)]
pub struct NewAccount {
    pub username: String,
    pub password: SecretString,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPhoto {
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: Publication,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub published: Publication,
    #[serde(default)]
    pub photo_ids: Vec<Uuid>,
    pub cover_photo_id: Option<Uuid>,
}

/// Partial photo edit. `None` leaves a field untouched; for `description`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PhotoUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<Publication>,
}

/// Partial album edit. `photo_ids` replaces the whole member set;
/// `cover_photo_id: Some(None)` clears the cover.
#[derive(Debug, Clone, Default)]
pub struct AlbumUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub published: Option<Publication>,
    pub photo_ids: Option<Vec<Uuid>>,
    pub cover_photo_id: Option<Option<Uuid>>,
}

/// Full replacement of the editable profile and account fields, the way the
/// profile edit form submits them.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub camera_type: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub hireable: bool,
    pub travel_radius: Option<f64>,
    pub phone: Option<String>,
    pub photography_style: Option<PhotographyStyle>,
}

impl Default for ProfileUpdate {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: None,
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

/// Addresses either kind of publishable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemId {
    Photo(Uuid),
    Album(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Photo(Photo),
    Album(Album),
}

/// Photos and albums belonging to one profile, or matching one filter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Owned {
    pub photos: Vec<Photo>,
    pub albums: Vec<Album>,
}

/// An album together with the member photos the viewer may see.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumDetail {
    pub album: Album,
    pub photos: Vec<Photo>,
    pub cover: Option<Photo>,
}
