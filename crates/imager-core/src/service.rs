//! # ImagerService
//!
//! Orchestrates the flow between callers and the core ports. Every operation
//! takes the caller's [`Viewer`] explicitly; the HTTP layer resolves it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::commands::{
    AlbumDetail, AlbumUpdate, Item, ItemId, NewAccount, NewAlbum, NewPhoto, Owned, PhotoUpdate,
    ProfileUpdate,
};
use crate::error::{AppError, Result};
use crate::models::{Account, Album, Photo, Profile, Publication};
use crate::policy::{ensure_edit, ensure_view, filter_visible, Viewer};
use crate::traits::{Credentials, ImagerRepo};
use crate::validate;

pub struct ImagerService {
    repo: Arc<dyn ImagerRepo>,
    credentials: Arc<dyn Credentials>,
    /// Checked against when the username is unknown, so both paths pay
    /// for one verification.
    decoy_hash: OnceCell<String>,
}

impl ImagerService {
    pub fn new(repo: Arc<dyn ImagerRepo>, credentials: Arc<dyn Credentials>) -> Self {
        Self {
            repo,
            credentials,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Password hashing is memory-hard; it runs on the blocking pool.
    async fn hash_password(&self, password: &SecretString) -> Result<String> {
        let credentials = Arc::clone(&self.credentials);
        let password = SecretString::from(password.expose_secret().to_string());
        tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &SecretString, hash: &str) -> Result<bool> {
        let credentials = Arc::clone(&self.credentials);
        let password = SecretString::from(password.expose_secret().to_string());
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || credentials.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))
    }

    async fn decoy(&self) -> Result<&str> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| async {
                let throwaway = SecretString::from(Uuid::now_v7().to_string());
                self.hash_password(&throwaway).await
            })
            .await?;
        Ok(hash.as_str())
    }
}

// Accounts & provisioning
impl ImagerService {
    /// Creates an account and its profile in one transaction.
    pub async fn register_account(&self, new: NewAccount) -> Result<(Account, Profile)> {
        let username = validate::username(&new.username)?;
        validate::password(&new.password)?;

        if self.repo.get_account_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(format!("username {username:?} is taken")));
        }

        let account = Account {
            id: Uuid::now_v7(),
            username,
            email: validate::email(new.email)?,
            first_name: validate::profile_text("first name", new.first_name)?,
            last_name: validate::profile_text("last name", new.last_name)?,
            password_hash: self.hash_password(&new.password).await?,
            is_active: true,
            date_joined: Utc::now(),
        };
        let profile = Profile::provision(&account);

        self.repo
            .create_account(account.clone(), profile.clone())
            .await?;
        info!("registered account {} ({})", account.username, account.id);
        Ok((account, profile))
    }

    /// Provisions the profile of an account that has none yet.
    /// A second call for the same account is a `Conflict`.
    pub async fn on_account_created(&self, account: &Account) -> Result<Profile> {
        let account = self
            .repo
            .get_account(account.id)
            .await?
            .ok_or_else(|| AppError::not_found("Account", account.id))?;

        if self
            .repo
            .get_profile_by_account(account.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "account {} already has a profile",
                account.id
            )));
        }

        let profile = Profile::provision(&account);
        self.repo.insert_profile(profile.clone()).await?;
        info!("provisioned profile {} for account {}", profile.id, account.id);
        Ok(profile)
    }

    /// Resolves a username/password pair to the caller's profile.
    /// Unknown users, wrong passwords and inactive accounts look the same,
    /// and every path runs one password verification.
    pub async fn authenticate(&self, username: &str, password: &SecretString) -> Result<Profile> {
        let denied = || AppError::Unauthenticated("invalid username or password".into());

        let Some(account) = self.repo.get_account_by_username(username).await? else {
            let decoy = self.decoy().await?;
            self.verify_password(password, decoy).await?;
            debug!("rejected credentials for unknown user {username:?}");
            return Err(denied());
        };

        let verified = self.verify_password(password, &account.password_hash).await?;
        if !verified || !account.is_active {
            debug!("rejected credentials for {username:?}");
            return Err(denied());
        }

        self.repo
            .get_profile_by_account(account.id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", format!("account {}", account.id)))
    }

    /// Administrative switch; deactivated accounts drop out of the active
    /// profile list and can no longer log in.
    pub async fn set_account_active(&self, account_id: Uuid, active: bool) -> Result<Account> {
        let mut account = self
            .repo
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account", account_id))?;
        account.is_active = active;
        self.repo.update_account(&account).await?;
        info!("account {} active={}", account.id, active);
        Ok(account)
    }

    /// Deletes the viewer's own account, profile, photos and albums.
    pub async fn delete_account(&self, viewer: &Viewer) -> Result<()> {
        let profile = self.load_profile(viewer.require_profile()?).await?;
        ensure_edit(viewer, &profile)?;
        self.repo.delete_account(profile.account_id).await?;
        info!("deleted account {} with profile {}", profile.account_id, profile.id);
        Ok(())
    }
}

// Profiles
impl ImagerService {
    /// Active profiles only; an inactive one reads as missing.
    pub async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        match self.repo.get_profile(id).await? {
            Some(profile) if profile.is_active => Ok(profile),
            _ => Err(AppError::not_found("Profile", id)),
        }
    }

    pub async fn profile_by_username(&self, username: &str) -> Result<Profile> {
        match self.repo.get_profile_by_username(username).await? {
            Some(profile) if profile.is_active => Ok(profile),
            _ => Err(AppError::not_found("Profile", username)),
        }
    }

    pub async fn list_active_profiles(&self) -> Result<Vec<Profile>> {
        self.repo.list_active_profiles().await
    }

    pub async fn update_profile(&self, viewer: &Viewer, update: ProfileUpdate) -> Result<Profile> {
        let mut profile = self.load_profile(viewer.require_profile()?).await?;
        ensure_edit(viewer, &profile)?;
        let mut account = self
            .repo
            .get_account(profile.account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account", profile.account_id))?;

        account.first_name = validate::profile_text("first name", update.first_name)?;
        account.last_name = validate::profile_text("last name", update.last_name)?;
        account.email = validate::email(update.email)?;

        profile.camera_type = validate::optional_text("camera type", update.camera_type, 128)?;
        profile.address = validate::profile_text("address", update.address)?;
        profile.bio = validate::optional_text("bio", update.bio, 4096)?;
        profile.website = validate::profile_text("website", update.website)?;
        profile.hireable = update.hireable;
        profile.travel_radius = validate::travel_radius(update.travel_radius)?;
        profile.phone = validate::phone(update.phone)?;
        profile.photography_style = update.photography_style;

        self.repo.update_profile(&account, &profile).await?;
        info!("profile {} updated", profile.id);
        Ok(profile)
    }
}

// Queries
impl ImagerService {
    /// A profile's photos and albums, reduced to what the viewer may see.
    pub async fn list_owned(&self, viewer: &Viewer, profile_id: Uuid) -> Result<Owned> {
        let profile = self.get_profile(profile_id).await?;
        let photos = self.repo.list_photos_by_owner(profile.id).await?;
        let albums = self.repo.list_albums_by_owner(profile.id).await?;
        Ok(Owned {
            photos: filter_visible(viewer, photos),
            albums: filter_visible(viewer, albums),
        })
    }

    /// The viewer's own photos and albums, private ones included.
    pub async fn library(&self, viewer: &Viewer) -> Result<Owned> {
        let profile_id = viewer.require_profile()?;
        self.list_owned(viewer, profile_id).await
    }

    pub async fn public_photos(&self) -> Result<Vec<Photo>> {
        self.repo.list_public_photos().await
    }

    pub async fn public_albums(&self) -> Result<Vec<Album>> {
        self.repo.list_public_albums().await
    }

    pub async fn list_public(&self) -> Result<Owned> {
        Ok(Owned {
            photos: self.public_photos().await?,
            albums: self.public_albums().await?,
        })
    }

    pub async fn get_photo(&self, viewer: &Viewer, id: Uuid) -> Result<Photo> {
        let photo = self.load_photo(id).await?;
        ensure_view(viewer, &photo)?;
        Ok(photo)
    }

    /// The album plus whichever of its members the viewer may see.
    pub async fn get_album(&self, viewer: &Viewer, id: Uuid) -> Result<AlbumDetail> {
        let album = self.load_album(id).await?;
        ensure_view(viewer, &album)?;
        let mut details = self.album_details(viewer, vec![album]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal(format!("album {id} vanished while loading")))
    }

    /// Expands albums already in hand, loading all their members in one
    /// batch. Albums the viewer may not see are dropped.
    pub async fn album_details(
        &self,
        viewer: &Viewer,
        albums: Vec<Album>,
    ) -> Result<Vec<AlbumDetail>> {
        let albums = filter_visible(viewer, albums);
        let member_ids: Vec<Uuid> = albums
            .iter()
            .flat_map(|a| a.photo_ids.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let loaded = self.repo.get_photos(&member_ids).await?;
        let members: HashMap<Uuid, Photo> = filter_visible(viewer, loaded)
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(albums
            .into_iter()
            .map(|album| {
                let photos: Vec<Photo> = album
                    .photo_ids
                    .iter()
                    .filter_map(|id| members.get(id).cloned())
                    .collect();
                let cover = album
                    .cover_photo_id
                    .and_then(|cover| photos.iter().find(|p| p.id == cover).cloned());
                AlbumDetail {
                    album,
                    photos,
                    cover,
                }
            })
            .collect())
    }

    pub async fn photos_tagged(&self, viewer: &Viewer, tag: &str) -> Result<Vec<Photo>> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Ok(Vec::new());
        }
        let photos = self.repo.list_photos_tagged(tag).await?;
        Ok(filter_visible(viewer, photos))
    }

    pub async fn random_public_photo(&self) -> Result<Option<Photo>> {
        self.repo.random_public_photo().await
    }

    /// Owner usernames for display. Inactive owners are included since their
    /// public work stays visible.
    pub async fn usernames(&self, profile_ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let mut names = HashMap::new();
        for id in profile_ids {
            if names.contains_key(id) {
                continue;
            }
            let profile = self.load_profile(*id).await?;
            names.insert(profile.id, profile.username);
        }
        Ok(names)
    }
}

// Photo mutations
impl ImagerService {
    pub async fn create_photo(&self, viewer: &Viewer, new: NewPhoto) -> Result<Photo> {
        let owner = self.load_profile(viewer.require_profile()?).await?;
        let now = Utc::now();
        let mut photo = Photo {
            id: Uuid::now_v7(),
            owner_id: owner.id,
            title: validate::title(&new.title)?,
            description: validate::description(new.description)?,
            image: validate::image(&new.image)?,
            published: Publication::Private,
            date_uploaded: now,
            date_modified: now,
            date_published: None,
            tags: validate::tags(new.tags)?,
        };
        photo.set_publication(new.published, now);

        self.repo.insert_photo(&photo).await?;
        info!("profile {} uploaded photo {}", owner.id, photo.id);
        Ok(photo)
    }

    pub async fn update_photo(
        &self,
        viewer: &Viewer,
        id: Uuid,
        update: PhotoUpdate,
    ) -> Result<Photo> {
        let mut photo = self.editable_photo(viewer, id).await?;

        if let Some(title) = update.title {
            photo.title = validate::title(&title)?;
        }
        if let Some(description) = update.description {
            photo.description = validate::description(description)?;
        }
        if let Some(image) = update.image {
            photo.image = validate::image(&image)?;
        }
        if let Some(tags) = update.tags {
            photo.tags = validate::tags(tags)?;
        }
        let now = Utc::now();
        if let Some(state) = update.published {
            photo.set_publication(state, now);
        }
        photo.touch(now);

        self.repo.update_photo(&photo).await?;
        info!("photo {} updated", photo.id);
        Ok(photo)
    }

    /// Also detaches the photo from every album, clearing covers that
    /// pointed at it.
    pub async fn delete_photo(&self, viewer: &Viewer, id: Uuid) -> Result<()> {
        let photo = self.editable_photo(viewer, id).await?;
        self.repo.delete_photo(photo.id).await?;
        info!("photo {} deleted", photo.id);
        Ok(())
    }
}

// Album mutations
impl ImagerService {
    pub async fn create_album(&self, viewer: &Viewer, new: NewAlbum) -> Result<Album> {
        let owner = self.load_profile(viewer.require_profile()?).await?;
        let now = Utc::now();
        let mut album = Album {
            id: Uuid::now_v7(),
            owner_id: owner.id,
            title: validate::title(&new.title)?,
            description: validate::description(new.description)?,
            published: Publication::Private,
            date_uploaded: now,
            date_modified: now,
            date_published: None,
            photo_ids: Vec::new(),
            cover_photo_id: None,
        };

        let members = self.member_photos(viewer, &new.photo_ids).await?;
        album.replace_photos(members.iter().map(|p| p.id).collect());
        self.assign_cover(viewer, &mut album, new.cover_photo_id).await?;
        album.set_publication(new.published, now);

        self.repo.insert_album(&album).await?;
        info!(
            "profile {} created album {} with {} photos",
            owner.id,
            album.id,
            album.photo_ids.len()
        );
        Ok(album)
    }

    pub async fn update_album(
        &self,
        viewer: &Viewer,
        id: Uuid,
        update: AlbumUpdate,
    ) -> Result<Album> {
        let mut album = self.editable_album(viewer, id).await?;

        if let Some(title) = update.title {
            album.title = validate::title(&title)?;
        }
        if let Some(description) = update.description {
            album.description = validate::description(description)?;
        }
        if let Some(photo_ids) = update.photo_ids {
            let members = self.member_photos(viewer, &photo_ids).await?;
            album.replace_photos(members.iter().map(|p| p.id).collect());
        }
        if let Some(cover) = update.cover_photo_id {
            self.assign_cover(viewer, &mut album, cover).await?;
        }
        let now = Utc::now();
        if let Some(state) = update.published {
            album.set_publication(state, now);
        }
        album.touch(now);

        self.repo.update_album(&album).await?;
        info!("album {} updated", album.id);
        self.load_album(album.id).await
    }

    pub async fn add_photo(&self, viewer: &Viewer, album_id: Uuid, photo_id: Uuid) -> Result<Album> {
        let mut album = self.editable_album(viewer, album_id).await?;
        let photo = self.load_photo(photo_id).await?;
        ensure_edit(viewer, &photo)?;

        if album.add_photo(photo.id) {
            album.touch(Utc::now());
            self.repo.update_album(&album).await?;
            info!("photo {} added to album {}", photo.id, album.id);
        }
        self.load_album(album.id).await
    }

    /// Removing the cover photo also clears the cover.
    pub async fn remove_photo(
        &self,
        viewer: &Viewer,
        album_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Album> {
        let mut album = self.editable_album(viewer, album_id).await?;

        if album.remove_photo(photo_id) {
            album.touch(Utc::now());
            self.repo.update_album(&album).await?;
            info!("photo {} removed from album {}", photo_id, album.id);
        }
        self.load_album(album.id).await
    }

    /// `None` clears the cover. A photo outside the album is a `Conflict`.
    pub async fn set_cover_photo(
        &self,
        viewer: &Viewer,
        album_id: Uuid,
        photo_id: Option<Uuid>,
    ) -> Result<Album> {
        let mut album = self.editable_album(viewer, album_id).await?;
        self.assign_cover(viewer, &mut album, photo_id).await?;
        album.touch(Utc::now());
        self.repo.update_album(&album).await?;
        self.load_album(album.id).await
    }

    pub async fn delete_album(&self, viewer: &Viewer, id: Uuid) -> Result<()> {
        let album = self.editable_album(viewer, id).await?;
        self.repo.delete_album(album.id).await?;
        info!("album {} deleted", album.id);
        Ok(())
    }
}

// Publication
impl ImagerService {
    /// Makes the item PUBLIC and stamps `date_published`.
    pub async fn publish(&self, viewer: &Viewer, item: ItemId) -> Result<Item> {
        self.set_publication(viewer, item, Publication::Public).await
    }

    /// Makes the item PRIVATE and clears `date_published`.
    pub async fn unpublish(&self, viewer: &Viewer, item: ItemId) -> Result<Item> {
        self.set_publication(viewer, item, Publication::Private).await
    }

    async fn set_publication(
        &self,
        viewer: &Viewer,
        item: ItemId,
        state: Publication,
    ) -> Result<Item> {
        let now = Utc::now();
        match item {
            ItemId::Photo(id) => {
                let mut photo = self.editable_photo(viewer, id).await?;
                photo.set_publication(state, now);
                photo.touch(now);
                self.repo.update_photo(&photo).await?;
                info!("photo {} is now {}", photo.id, state);
                Ok(Item::Photo(photo))
            }
            ItemId::Album(id) => {
                let mut album = self.editable_album(viewer, id).await?;
                album.set_publication(state, now);
                album.touch(now);
                self.repo.update_album(&album).await?;
                info!("album {} is now {}", album.id, state);
                Ok(Item::Album(album))
            }
        }
    }
}

// Loading helpers
impl ImagerService {
    async fn load_profile(&self, id: Uuid) -> Result<Profile> {
        self.repo
            .get_profile(id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", id))
    }

    async fn load_photo(&self, id: Uuid) -> Result<Photo> {
        self.repo
            .get_photo(id)
            .await?
            .ok_or_else(|| AppError::not_found("Photo", id))
    }

    async fn load_album(&self, id: Uuid) -> Result<Album> {
        self.repo
            .get_album(id)
            .await?
            .ok_or_else(|| AppError::not_found("Album", id))
    }

    /// Anonymous callers fail before the lookup, strangers after it.
    async fn editable_photo(&self, viewer: &Viewer, id: Uuid) -> Result<Photo> {
        viewer.require_profile()?;
        let photo = self.load_photo(id).await?;
        ensure_edit(viewer, &photo)?;
        Ok(photo)
    }

    async fn editable_album(&self, viewer: &Viewer, id: Uuid) -> Result<Album> {
        viewer.require_profile()?;
        let album = self.load_album(id).await?;
        ensure_edit(viewer, &album)?;
        Ok(album)
    }

    /// Loads prospective album members, oldest upload first. Each must exist
    /// and belong to the viewer.
    async fn member_photos(&self, viewer: &Viewer, ids: &[Uuid]) -> Result<Vec<Photo>> {
        let wanted: BTreeSet<Uuid> = ids.iter().copied().collect();
        let ids: Vec<Uuid> = wanted.iter().copied().collect();
        let photos = self.repo.get_photos(&ids).await?;

        if let Some(missing) = wanted
            .iter()
            .find(|id| !photos.iter().any(|p| p.id == **id))
        {
            return Err(AppError::not_found("Photo", missing));
        }
        for photo in &photos {
            ensure_edit(viewer, photo)?;
        }
        Ok(photos)
    }

    async fn assign_cover(
        &self,
        viewer: &Viewer,
        album: &mut Album,
        photo_id: Option<Uuid>,
    ) -> Result<()> {
        if let Some(id) = photo_id {
            let photo = self.load_photo(id).await?;
            ensure_edit(viewer, &photo)?;
        }
        album.set_cover_photo(photo_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockImagerRepo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PlainCredentials;

    impl Credentials for PlainCredentials {
        fn hash_password(&self, password: &SecretString) -> Result<String> {
            Ok(format!("plain:{}", password.expose_secret()))
        }

        fn verify_password(&self, password: &SecretString, hash: &str) -> bool {
            hash == format!("plain:{}", password.expose_secret())
        }
    }

    fn service(repo: MockImagerRepo) -> ImagerService {
        ImagerService::new(Arc::new(repo), Arc::new(PlainCredentials))
    }

    fn account(active: bool) -> Account {
        Account {
            id: Uuid::now_v7(),
            username: "bill".into(),
            email: None,
            first_name: None,
            last_name: None,
            password_hash: "plain:billyspassword".into(),
            is_active: active,
            date_joined: Utc::now(),
        }
    }

    fn photo(owner: Uuid) -> Photo {
        let now = Utc::now();
        Photo {
            id: Uuid::now_v7(),
            owner_id: owner,
            title: "P1".into(),
            description: None,
            image: "p1.jpg".into(),
            published: Publication::Public,
            date_uploaded: now,
            date_modified: now,
            date_published: Some(now),
            tags: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn anonymous_uploads_never_reach_the_store() {
        // No expectations: any repository call would panic.
        let svc = service(MockImagerRepo::new());
        let new = NewPhoto {
            title: "P1".into(),
            image: "p1.jpg".into(),
            ..Default::default()
        };
        let err = svc.create_photo(&Viewer::Anonymous, new).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let err = svc
            .publish(&Viewer::Anonymous, ItemId::Album(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn second_provisioning_is_a_conflict() {
        let acc = account(true);
        let existing = Profile::provision(&acc);

        let mut repo = MockImagerRepo::new();
        let stored = acc.clone();
        repo.expect_get_account()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_get_profile_by_account()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_insert_profile().times(0);

        let err = service(repo).on_account_created(&acc).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn strangers_cannot_edit_public_photos() {
        let owner = Uuid::now_v7();
        let target = photo(owner);
        let id = target.id;

        let mut repo = MockImagerRepo::new();
        repo.expect_get_photo()
            .returning(move |_| Ok(Some(target.clone())));
        repo.expect_update_photo().times(0);

        let update = PhotoUpdate {
            title: Some("mine now".into()),
            ..Default::default()
        };
        let err = service(repo)
            .update_photo(&Viewer::Profile(Uuid::now_v7()), id, update)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn inactive_accounts_cannot_log_in() {
        let mut repo = MockImagerRepo::new();
        repo.expect_get_account_by_username()
            .returning(|_| Ok(Some(account(false))));
        repo.expect_get_profile_by_account().times(0);

        let err = service(repo)
            .authenticate("bill", &SecretString::from("billyspassword".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[derive(Default)]
    struct CountingCredentials {
        hashes: AtomicUsize,
        verifies: AtomicUsize,
    }

    impl Credentials for CountingCredentials {
        fn hash_password(&self, password: &SecretString) -> Result<String> {
            self.hashes.fetch_add(1, Ordering::SeqCst);
            PlainCredentials.hash_password(password)
        }

        fn verify_password(&self, password: &SecretString, hash: &str) -> bool {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            PlainCredentials.verify_password(password, hash)
        }
    }

    #[tokio::test]
    async fn unknown_users_cost_one_verification() {
        let mut repo = MockImagerRepo::new();
        repo.expect_get_account_by_username()
            .returning(|_| Ok(None));
        let counting = Arc::new(CountingCredentials::default());
        let svc = ImagerService::new(Arc::new(repo), counting.clone());
        let password = SecretString::from("billyspassword".to_string());

        for _ in 0..2 {
            let err = svc.authenticate("nobody", &password).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthenticated(_)));
        }
        assert_eq!(counting.verifies.load(Ordering::SeqCst), 2);
        // The decoy hash is computed once and reused.
        assert_eq!(counting.hashes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn known_users_with_wrong_password_cost_one_verification() {
        let mut repo = MockImagerRepo::new();
        repo.expect_get_account_by_username()
            .returning(|_| Ok(Some(account(true))));
        repo.expect_get_profile_by_account().times(0);
        let counting = Arc::new(CountingCredentials::default());
        let svc = ImagerService::new(Arc::new(repo), counting.clone());

        let err = svc
            .authenticate("bill", &SecretString::from("wrong-password".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
        assert_eq!(counting.verifies.load(Ordering::SeqCst), 1);
        assert_eq!(counting.hashes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected_before_hashing() {
        let mut repo = MockImagerRepo::new();
        repo.expect_get_account_by_username()
            .returning(|_| Ok(Some(account(true))));
        repo.expect_create_account().times(0);

        let new = NewAccount {
            username: "bill".into(),
            password: SecretString::from("billyspassword".to_string()),
            email: None,
            first_name: None,
            last_name: None,
        };
        let err = service(repo).register_account(new).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn album_detail_hides_private_members_from_strangers() {
        let owner = Uuid::now_v7();
        let shown = photo(owner);
        let mut hidden = photo(owner);
        hidden.published = Publication::Private;
        let now = Utc::now();
        let album = Album {
            id: Uuid::now_v7(),
            owner_id: owner,
            title: "Trip".into(),
            description: None,
            published: Publication::Public,
            date_uploaded: now,
            date_modified: now,
            date_published: Some(now),
            photo_ids: vec![shown.id, hidden.id],
            cover_photo_id: Some(hidden.id),
        };
        let album_id = album.id;
        let members = vec![shown.clone(), hidden];

        let mut repo = MockImagerRepo::new();
        repo.expect_get_album()
            .returning(move |_| Ok(Some(album.clone())));
        repo.expect_get_photos()
            .returning(move |_| Ok(members.clone()));

        let detail = service(repo)
            .get_album(&Viewer::Anonymous, album_id)
            .await
            .unwrap();
        assert_eq!(detail.photos, vec![shown]);
        assert_eq!(detail.cover, None);
    }

    #[tokio::test]
    async fn album_listings_load_members_in_one_batch() {
        let owner = Uuid::now_v7();
        let (p1, p2, p3) = (photo(owner), photo(owner), photo(owner));
        let now = Utc::now();
        let album = |photo_ids: Vec<Uuid>, cover: Option<Uuid>| Album {
            id: Uuid::now_v7(),
            owner_id: owner,
            title: "Trip".into(),
            description: None,
            published: Publication::Public,
            date_uploaded: now,
            date_modified: now,
            date_published: Some(now),
            photo_ids,
            cover_photo_id: cover,
        };
        let first = album(vec![p1.id, p2.id], Some(p2.id));
        let second = album(vec![p2.id, p3.id], None);
        let all = vec![p1.clone(), p2.clone(), p3.clone()];

        let mut repo = MockImagerRepo::new();
        repo.expect_get_album().times(0);
        repo.expect_get_photos()
            .times(1)
            .withf(|ids| ids.len() == 3)
            .returning(move |_| Ok(all.clone()));

        let details = service(repo)
            .album_details(&Viewer::Anonymous, vec![first, second])
            .await
            .unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].photos, vec![p1, p2.clone()]);
        assert_eq!(details[0].cover, Some(p2.clone()));
        assert_eq!(details[1].photos, vec![p2, p3]);
    }
}
