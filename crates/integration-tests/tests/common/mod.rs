#![allow(dead_code)]

use std::sync::Arc;

use imager_auth_simple::Argon2Credentials;
use imager_core::{
    Album, ImagerService, NewAccount, NewAlbum, NewPhoto, Photo, Profile, Publication, Viewer,
};
use imager_db_sqlite::SqliteImagerRepo;
use secrecy::SecretString;
use uuid::Uuid;

pub const PASSWORD: &str = "billyspassword";

pub async fn service() -> ImagerService {
    let repo = SqliteImagerRepo::new("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    ImagerService::new(Arc::new(repo), Arc::new(Argon2Credentials::new()))
}

pub async fn register(service: &ImagerService, username: &str) -> Profile {
    let (_, profile) = service
        .register_account(NewAccount {
            username: username.to_string(),
            password: SecretString::from(PASSWORD.to_string()),
            email: Some(format!("{username}@example.com")),
            first_name: None,
            last_name: None,
        })
        .await
        .expect("registration");
    profile
}

pub async fn upload(
    service: &ImagerService,
    owner: &Profile,
    title: &str,
    published: Publication,
) -> Photo {
    service
        .create_photo(
            &Viewer::from(owner),
            NewPhoto {
                title: title.to_string(),
                image: format!("{}.jpg", title.to_lowercase()),
                published,
                ..Default::default()
            },
        )
        .await
        .expect("upload")
}

pub async fn album_of(
    service: &ImagerService,
    owner: &Profile,
    photos: &[&Photo],
    cover: Option<Uuid>,
    published: Publication,
) -> Album {
    service
        .create_album(
            &Viewer::from(owner),
            NewAlbum {
                title: "Trip".to_string(),
                published,
                photo_ids: photos.iter().map(|p| p.id).collect(),
                cover_photo_id: cover,
                ..Default::default()
            },
        )
        .await
        .expect("album")
}
