//! JSON shapes returned by the handlers.
//!
//! Owners are rendered by username, images by their stored reference.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use imager_core::{
    Album, AlbumDetail, ImagerService, Owned, Photo, PhotographyStyle, Profile, Publication, Result,
    Viewer,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct PhotoResource {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub date_uploaded: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_published: Option<DateTime<Utc>>,
    pub published: Publication,
    pub photo: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AlbumResource {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub date_uploaded: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_published: Option<DateTime<Utc>>,
    pub published: Publication,
    pub photos: Vec<PhotoResource>,
    pub cover_photo: Option<PhotoResource>,
}

/// Public face of a profile. Address and phone stay off the wire.
#[derive(Debug, Serialize)]
pub struct ProfileResource {
    pub username: String,
    pub camera_type: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub hireable: bool,
    pub travel_radius: Option<f64>,
    pub photography_style: Option<PhotographyStyle>,
    pub photos: Vec<PhotoResource>,
    pub albums: Vec<AlbumResource>,
}

#[derive(Debug, Serialize)]
pub struct LibraryResource {
    pub photos: Vec<PhotoResource>,
    pub albums: Vec<AlbumResource>,
}

fn photo_resource(photo: Photo, names: &HashMap<Uuid, String>) -> PhotoResource {
    PhotoResource {
        owner: names.get(&photo.owner_id).cloned().unwrap_or_default(),
        id: photo.id,
        title: photo.title,
        description: photo.description,
        date_uploaded: photo.date_uploaded,
        date_modified: photo.date_modified,
        date_published: photo.date_published,
        published: photo.published,
        photo: photo.image,
        tags: photo.tags.into_iter().collect(),
    }
}

pub async fn photos(service: &ImagerService, photos: Vec<Photo>) -> Result<Vec<PhotoResource>> {
    let owners: Vec<Uuid> = photos.iter().map(|p| p.owner_id).collect();
    let names = service.usernames(&owners).await?;
    Ok(photos
        .into_iter()
        .map(|p| photo_resource(p, &names))
        .collect())
}

pub async fn photo(service: &ImagerService, photo: Photo) -> Result<PhotoResource> {
    let names = service.usernames(&[photo.owner_id]).await?;
    Ok(photo_resource(photo, &names))
}

fn album_resource(detail: AlbumDetail, names: &HashMap<Uuid, String>) -> AlbumResource {
    let AlbumDetail {
        album,
        photos,
        cover,
    } = detail;

    // Members always share the album's owner.
    AlbumResource {
        owner: names.get(&album.owner_id).cloned().unwrap_or_default(),
        id: album.id,
        title: album.title,
        description: album.description,
        date_uploaded: album.date_uploaded,
        date_modified: album.date_modified,
        date_published: album.date_published,
        published: album.published,
        photos: photos
            .into_iter()
            .map(|p| photo_resource(p, names))
            .collect(),
        cover_photo: cover.map(|p| photo_resource(p, names)),
    }
}

pub async fn album(service: &ImagerService, detail: AlbumDetail) -> Result<AlbumResource> {
    let names = service.usernames(&[detail.album.owner_id]).await?;
    Ok(album_resource(detail, &names))
}

/// Expands each album with the members the viewer may see.
pub async fn albums(
    service: &ImagerService,
    viewer: &Viewer,
    albums: Vec<Album>,
) -> Result<Vec<AlbumResource>> {
    let details = service.album_details(viewer, albums).await?;
    let owners: Vec<Uuid> = details.iter().map(|d| d.album.owner_id).collect();
    let names = service.usernames(&owners).await?;
    Ok(details
        .into_iter()
        .map(|d| album_resource(d, &names))
        .collect())
}

pub async fn library(
    service: &ImagerService,
    viewer: &Viewer,
    owned: Owned,
) -> Result<LibraryResource> {
    Ok(LibraryResource {
        photos: photos(service, owned.photos).await?,
        albums: albums(service, viewer, owned.albums).await?,
    })
}

pub async fn profile(
    service: &ImagerService,
    viewer: &Viewer,
    profile: Profile,
    owned: Owned,
) -> Result<ProfileResource> {
    let LibraryResource { photos, albums } = library(service, viewer, owned).await?;
    Ok(ProfileResource {
        username: profile.username,
        camera_type: profile.camera_type,
        bio: profile.bio,
        website: profile.website,
        hireable: profile.hireable,
        travel_radius: profile.travel_radius,
        photography_style: profile.photography_style,
        photos,
        albums,
    })
}
