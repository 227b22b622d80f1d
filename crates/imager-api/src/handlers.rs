//! # imager-api Handlers
//!
//! Each handler resolves the viewer, asks [`ImagerService`] for the data and
//! renders it through [`crate::resources`].

use actix_web::{web, HttpRequest, HttpResponse};
use imager_core::ImagerService;
use serde_json::json;
use uuid::Uuid;

use crate::auth::resolve_viewer;
use crate::error::ApiError;
use crate::resources;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub service: ImagerService,
}

type HandlerResult = Result<HttpResponse, ApiError>;

/// Home page: one random public photo, or null when there are none.
pub async fn index(data: web::Data<AppState>) -> HandlerResult {
    let service = &data.service;
    let random_photo = match service.random_public_photo().await? {
        Some(photo) => Some(resources::photo(service, photo).await?),
        None => None,
    };
    Ok(HttpResponse::Ok().json(json!({ "random_photo": random_photo })))
}

pub async fn photo_gallery(data: web::Data<AppState>) -> HandlerResult {
    let service = &data.service;
    let photos = service.public_photos().await?;
    Ok(HttpResponse::Ok().json(resources::photos(service, photos).await?))
}

pub async fn photo_detail(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let photo = service.get_photo(&viewer, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resources::photo(service, photo).await?))
}

pub async fn tagged_photos(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let photos = service.photos_tagged(&viewer, &path).await?;
    Ok(HttpResponse::Ok().json(resources::photos(service, photos).await?))
}

pub async fn album_gallery(data: web::Data<AppState>, req: HttpRequest) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let albums = service.public_albums().await?;
    Ok(HttpResponse::Ok().json(resources::albums(service, &viewer, albums).await?))
}

pub async fn album_detail(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let detail = service.get_album(&viewer, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resources::album(service, detail).await?))
}

pub async fn profile_detail(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let profile = service.profile_by_username(&path).await?;
    let owned = service.list_owned(&viewer, profile.id).await?;
    Ok(HttpResponse::Ok().json(resources::profile(service, &viewer, profile, owned).await?))
}

pub async fn library(data: web::Data<AppState>, req: HttpRequest) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let owned = service.library(&viewer).await?;
    Ok(HttpResponse::Ok().json(resources::library(service, &viewer, owned).await?))
}

pub async fn api_photos(data: web::Data<AppState>, req: HttpRequest) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let owned = service.library(&viewer).await?;
    Ok(HttpResponse::Ok().json(resources::photos(service, owned.photos).await?))
}

pub async fn api_albums(data: web::Data<AppState>, req: HttpRequest) -> HandlerResult {
    let service = &data.service;
    let viewer = resolve_viewer(&req, service).await?;
    let owned = service.library(&viewer).await?;
    Ok(HttpResponse::Ok().json(resources::albums(service, &viewer, owned.albums).await?))
}
