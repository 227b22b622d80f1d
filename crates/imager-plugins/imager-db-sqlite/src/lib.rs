//! # imager-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `imager-core` domain models.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use async_trait::async_trait;
use imager_core::error::{AppError, Result};
use imager_core::models::{Account, Album, Photo, PhotographyStyle, Profile, Publication};
use imager_core::traits::ImagerRepo;
use log::{debug, error};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

const ACCOUNT_SELECT: &str = "SELECT id, username, email, first_name, last_name, password_hash, \
     is_active, date_joined FROM accounts";

const PROFILE_SELECT: &str = "SELECT p.id, p.account_id, a.username, a.is_active, p.camera_type, \
     p.address, p.bio, p.website, p.hireable, p.travel_radius, p.phone, p.photography_style \
     FROM profiles p JOIN accounts a ON a.id = p.account_id";

const PHOTO_SELECT: &str = "SELECT p.id, p.owner_id, p.title, p.description, p.image, \
     p.published, p.date_uploaded, p.date_modified, p.date_published FROM photos p";

const ALBUM_SELECT: &str = "SELECT al.id, al.owner_id, al.title, al.description, al.published, \
     al.date_uploaded, al.date_modified, al.date_published, al.cover_photo_id FROM albums al";

/// Ids bound per `IN (...)` list, well below SQLite's variable limit.
const BIND_CHUNK: usize = 500;

pub struct SqliteImagerRepo {
    pool: SqlitePool,
}

impl SqliteImagerRepo {
    /// Opens (or creates) the database at `url` and applies the embedded
    /// migrations. In-memory databases are pinned to one connection so every
    /// query sees the same data.
    pub async fn new(url: &str, max_connections: u32) -> sqlx::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("sqlite store ready at {url}");
        Ok(Self { pool })
    }

    /// Fills in `tags` for a batch of photos, one query per chunk of ids.
    async fn attach_tags(&self, photos: &mut [Photo]) -> Result<()> {
        let mut tags: HashMap<Uuid, BTreeSet<String>> = HashMap::new();
        for chunk in photos.chunks(BIND_CHUNK) {
            let mut qb =
                QueryBuilder::<Sqlite>::new("SELECT photo_id, tag FROM photo_tags WHERE photo_id IN (");
            let mut ids = qb.separated(", ");
            for photo in chunk {
                ids.push_bind(photo.id);
            }
            qb.push(")");

            for row in qb.build().fetch_all(&self.pool).await.map_err(db_err)? {
                let photo_id: Uuid = row.try_get("photo_id").map_err(db_err)?;
                let tag: String = row.try_get("tag").map_err(db_err)?;
                tags.entry(photo_id).or_default().insert(tag);
            }
        }
        for photo in photos.iter_mut() {
            photo.tags = tags.remove(&photo.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Fills in `photo_ids` for a batch of albums, members oldest first.
    async fn attach_members(&self, albums: &mut [Album]) -> Result<()> {
        let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for chunk in albums.chunks(BIND_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new(
                "SELECT ap.album_id, ap.photo_id FROM album_photos ap \
                 JOIN photos p ON p.id = ap.photo_id WHERE ap.album_id IN (",
            );
            let mut ids = qb.separated(", ");
            for album in chunk {
                ids.push_bind(album.id);
            }
            qb.push(") ORDER BY p.date_uploaded ASC, p.id ASC");

            // Each album falls in exactly one chunk, so per-album order holds.
            for row in qb.build().fetch_all(&self.pool).await.map_err(db_err)? {
                let album_id: Uuid = row.try_get("album_id").map_err(db_err)?;
                let photo_id: Uuid = row.try_get("photo_id").map_err(db_err)?;
                members.entry(album_id).or_default().push(photo_id);
            }
        }
        for album in albums.iter_mut() {
            album.photo_ids = members.remove(&album.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn fetch_photos(&self, sql: &str, bind: Option<&str>) -> Result<Vec<Photo>> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let mut photos = query
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(photo_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_err)?;
        self.attach_tags(&mut photos).await?;
        Ok(photos)
    }

    async fn fetch_albums(&self, sql: &str, owner_id: Option<Uuid>) -> Result<Vec<Album>> {
        let mut query = sqlx::query(sql);
        if let Some(owner_id) = owner_id {
            query = query.bind(owner_id);
        }
        let mut albums = query
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(album_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_err)?;
        self.attach_members(&mut albums).await?;
        Ok(albums)
    }
}

/// Maps driver failures onto the core taxonomy: unique keys become
/// conflicts, everything else is internal.
fn db_err(err: sqlx::Error) -> AppError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return AppError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound("referenced row".into(), db.message().to_string());
        }
    }
    error!("sqlite error: {err}");
    AppError::Internal(err.to_string())
}

fn decode_enum<T: FromStr<Err = AppError>>(raw: &str) -> sqlx::Result<T> {
    raw.parse::<T>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn account_from_row(row: &SqliteRow) -> sqlx::Result<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        date_joined: row.try_get("date_joined")?,
    })
}

fn profile_from_row(row: &SqliteRow) -> sqlx::Result<Profile> {
    let style: Option<String> = row.try_get("photography_style")?;
    Ok(Profile {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        username: row.try_get("username")?,
        is_active: row.try_get("is_active")?,
        camera_type: row.try_get("camera_type")?,
        address: row.try_get("address")?,
        bio: row.try_get("bio")?,
        website: row.try_get("website")?,
        hireable: row.try_get("hireable")?,
        travel_radius: row.try_get("travel_radius")?,
        phone: row.try_get("phone")?,
        photography_style: style
            .as_deref()
            .map(decode_enum::<PhotographyStyle>)
            .transpose()?,
    })
}

/// Tags are attached separately.
fn photo_from_row(row: &SqliteRow) -> sqlx::Result<Photo> {
    Ok(Photo {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        published: decode_enum::<Publication>(row.try_get("published")?)?,
        date_uploaded: row.try_get("date_uploaded")?,
        date_modified: row.try_get("date_modified")?,
        date_published: row.try_get("date_published")?,
        tags: BTreeSet::new(),
    })
}

/// Members are attached separately.
fn album_from_row(row: &SqliteRow) -> sqlx::Result<Album> {
    Ok(Album {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        published: decode_enum::<Publication>(row.try_get("published")?)?,
        date_uploaded: row.try_get("date_uploaded")?,
        date_modified: row.try_get("date_modified")?,
        date_published: row.try_get("date_published")?,
        photo_ids: Vec::new(),
        cover_photo_id: row.try_get("cover_photo_id")?,
    })
}

async fn write_tags(tx: &mut sqlx::SqliteConnection, photo: &Photo) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM photo_tags WHERE photo_id = ?")
        .bind(photo.id)
        .execute(&mut *tx)
        .await?;
    for tag in &photo.tags {
        sqlx::query("INSERT INTO photo_tags (photo_id, tag) VALUES (?, ?)")
            .bind(photo.id)
            .bind(tag)
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}

async fn write_members(tx: &mut sqlx::SqliteConnection, album: &Album) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM album_photos WHERE album_id = ?")
        .bind(album.id)
        .execute(&mut *tx)
        .await?;
    for photo_id in &album.photo_ids {
        sqlx::query("INSERT INTO album_photos (album_id, photo_id) VALUES (?, ?)")
            .bind(album.id)
            .bind(photo_id)
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ImagerRepo for SqliteImagerRepo {
    /// Atomic operation to create an account and its profile.
    ///
    /// # Developer Note
    /// Using a Transaction (tx) ensures we never end up with an account
    /// that has no profile if the second insert fails.
    async fn create_account(&self, account: Account, profile: Profile) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 1. Insert Account
        sqlx::query("INSERT INTO accounts (id, username, email, first_name, last_name, password_hash, is_active, date_joined) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.password_hash)
            .bind(account.is_active)
            .bind(account.date_joined)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        // 2. Insert its Profile
        insert_profile_row(&mut tx, &profile).await.map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("{ACCOUNT_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(account_from_row).transpose().map_err(db_err)
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("{ACCOUNT_SELECT} WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(account_from_row).transpose().map_err(db_err)
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let done = sqlx::query("UPDATE accounts SET email = ?, first_name = ?, last_name = ?, is_active = ? WHERE id = ?")
            .bind(&account.email)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.is_active)
            .bind(account.id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(AppError::not_found("Account", account.id));
        }
        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_profile(&self, profile: Profile) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        insert_profile_row(&mut conn, &profile).await.map_err(db_err)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!("{PROFILE_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(profile_from_row).transpose().map_err(db_err)
    }

    async fn get_profile_by_account(&self, account_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!("{PROFILE_SELECT} WHERE p.account_id = ?"))
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(profile_from_row).transpose().map_err(db_err)
    }

    async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!("{PROFILE_SELECT} WHERE a.username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(profile_from_row).transpose().map_err(db_err)
    }

    async fn update_profile(&self, account: &Account, profile: &Profile) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("UPDATE accounts SET email = ?, first_name = ?, last_name = ? WHERE id = ?")
            .bind(&account.email)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let done = sqlx::query("UPDATE profiles SET camera_type = ?, address = ?, bio = ?, website = ?, hireable = ?, travel_radius = ?, phone = ?, photography_style = ? WHERE id = ?")
            .bind(&profile.camera_type)
            .bind(&profile.address)
            .bind(&profile.bio)
            .bind(&profile.website)
            .bind(profile.hireable)
            .bind(profile.travel_radius)
            .bind(&profile.phone)
            .bind(profile.photography_style.map(|s| s.as_str()))
            .bind(profile.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(AppError::not_found("Profile", profile.id));
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn list_active_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query(&format!(
            "{PROFILE_SELECT} WHERE a.is_active = 1 ORDER BY a.date_joined ASC, p.id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter()
            .map(profile_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_err)
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("INSERT INTO photos (id, owner_id, title, description, image, published, date_uploaded, date_modified, date_published) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(photo.id)
            .bind(photo.owner_id)
            .bind(&photo.title)
            .bind(&photo.description)
            .bind(&photo.image)
            .bind(photo.published.as_str())
            .bind(photo.date_uploaded)
            .bind(photo.date_modified)
            .bind(photo.date_published)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        write_tags(&mut tx, photo).await.map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_photo(&self, id: Uuid) -> Result<Option<Photo>> {
        let row = sqlx::query(&format!("{PHOTO_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut photos = vec![photo_from_row(&row).map_err(db_err)?];
        self.attach_tags(&mut photos).await?;
        Ok(photos.pop())
    }

    async fn get_photos(&self, ids: &[Uuid]) -> Result<Vec<Photo>> {
        let mut photos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(BIND_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new(PHOTO_SELECT);
            qb.push(" WHERE p.id IN (");
            let mut list = qb.separated(", ");
            for id in chunk {
                list.push_bind(*id);
            }
            qb.push(")");

            let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;
            for row in &rows {
                photos.push(photo_from_row(row).map_err(db_err)?);
            }
        }
        photos.sort_by(|a, b| (a.date_uploaded, a.id).cmp(&(b.date_uploaded, b.id)));
        self.attach_tags(&mut photos).await?;
        Ok(photos)
    }

    async fn update_photo(&self, photo: &Photo) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let done = sqlx::query("UPDATE photos SET title = ?, description = ?, image = ?, published = ?, date_modified = ?, date_published = ? WHERE id = ?")
            .bind(&photo.title)
            .bind(&photo.description)
            .bind(&photo.image)
            .bind(photo.published.as_str())
            .bind(photo.date_modified)
            .bind(photo.date_published)
            .bind(photo.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(AppError::not_found("Photo", photo.id));
        }
        write_tags(&mut tx, photo).await.map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Membership rows cascade; covers pointing here are set to NULL by the
    /// foreign key.
    async fn delete_photo(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_photos_by_owner(&self, owner_id: Uuid) -> Result<Vec<Photo>> {
        let sql = format!(
            "{PHOTO_SELECT} WHERE p.owner_id = ? ORDER BY p.date_uploaded ASC, p.id ASC"
        );
        let mut photos = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(photo_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_err)?;
        self.attach_tags(&mut photos).await?;
        Ok(photos)
    }

    async fn list_public_photos(&self) -> Result<Vec<Photo>> {
        let sql = format!(
            "{PHOTO_SELECT} WHERE p.published = 'PUBLIC' ORDER BY p.date_uploaded ASC, p.id ASC"
        );
        self.fetch_photos(&sql, None).await
    }

    async fn list_photos_tagged(&self, tag: &str) -> Result<Vec<Photo>> {
        let sql = format!(
            "{PHOTO_SELECT} JOIN photo_tags t ON t.photo_id = p.id WHERE t.tag = ? \
             ORDER BY p.date_uploaded ASC, p.id ASC"
        );
        self.fetch_photos(&sql, Some(tag)).await
    }

    async fn random_public_photo(&self) -> Result<Option<Photo>> {
        let sql = format!("{PHOTO_SELECT} WHERE p.published = 'PUBLIC' ORDER BY RANDOM() LIMIT 1");
        Ok(self.fetch_photos(&sql, None).await?.pop())
    }

    async fn insert_album(&self, album: &Album) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("INSERT INTO albums (id, owner_id, title, description, published, date_uploaded, date_modified, date_published, cover_photo_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(album.id)
            .bind(album.owner_id)
            .bind(&album.title)
            .bind(&album.description)
            .bind(album.published.as_str())
            .bind(album.date_uploaded)
            .bind(album.date_modified)
            .bind(album.date_published)
            .bind(album.cover_photo_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        write_members(&mut tx, album).await.map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_album(&self, id: Uuid) -> Result<Option<Album>> {
        let row = sqlx::query(&format!("{ALBUM_SELECT} WHERE al.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut albums = vec![album_from_row(&row).map_err(db_err)?];
        self.attach_members(&mut albums).await?;
        Ok(albums.pop())
    }

    async fn update_album(&self, album: &Album) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let done = sqlx::query("UPDATE albums SET title = ?, description = ?, published = ?, date_modified = ?, date_published = ?, cover_photo_id = ? WHERE id = ?")
            .bind(&album.title)
            .bind(&album.description)
            .bind(album.published.as_str())
            .bind(album.date_modified)
            .bind(album.date_published)
            .bind(album.cover_photo_id)
            .bind(album.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(AppError::not_found("Album", album.id));
        }
        write_members(&mut tx, album).await.map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_album(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_albums_by_owner(&self, owner_id: Uuid) -> Result<Vec<Album>> {
        let sql = format!(
            "{ALBUM_SELECT} WHERE al.owner_id = ? ORDER BY al.date_uploaded ASC, al.id ASC"
        );
        self.fetch_albums(&sql, Some(owner_id)).await
    }

    async fn list_public_albums(&self) -> Result<Vec<Album>> {
        let sql = format!(
            "{ALBUM_SELECT} WHERE al.published = 'PUBLIC' ORDER BY al.date_uploaded ASC, al.id ASC"
        );
        self.fetch_albums(&sql, None).await
    }
}

async fn insert_profile_row(conn: &mut sqlx::SqliteConnection, profile: &Profile) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO profiles (id, account_id, camera_type, address, bio, website, hireable, travel_radius, phone, photography_style) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
        .bind(profile.id)
        .bind(profile.account_id)
        .bind(&profile.camera_type)
        .bind(&profile.address)
        .bind(&profile.bio)
        .bind(&profile.website)
        .bind(profile.hireable)
        .bind(profile.travel_radius)
        .bind(&profile.phone)
        .bind(profile.photography_style.map(|s| s.as_str()))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn repo() -> SqliteImagerRepo {
        SqliteImagerRepo::new("sqlite::memory:", 1).await.unwrap()
    }

    fn account(username: &str) -> Account {
        Account {
            id: Uuid::now_v7(),
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
            password_hash: "hash".into(),
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    fn photo(owner_id: Uuid, title: &str, published: Publication) -> Photo {
        let now = Utc::now();
        Photo {
            id: Uuid::now_v7(),
            owner_id,
            title: title.into(),
            description: None,
            image: format!("{title}.jpg"),
            published,
            date_uploaded: now,
            date_modified: now,
            date_published: None,
            tags: ["beach".to_string(), "sea".to_string()].into_iter().collect(),
        }
    }

    async fn seeded_profile(repo: &SqliteImagerRepo, username: &str) -> Profile {
        let acc = account(username);
        let profile = Profile::provision(&acc);
        repo.create_account(acc, profile.clone()).await.unwrap();
        profile
    }

    #[tokio::test]
    async fn test_create_account_with_profile() {
        let repo = repo().await;
        let acc = account("bill");
        let profile = Profile::provision(&acc);
        repo.create_account(acc.clone(), profile.clone()).await.expect("Failed to create account");

        let stored = repo.get_profile_by_account(acc.id).await.unwrap().unwrap();
        assert_eq!(stored, profile);
        assert_eq!(repo.get_account_by_username("bill").await.unwrap().unwrap().id, acc.id);
    }

    #[tokio::test]
    async fn test_second_profile_for_account_is_conflict() {
        let repo = repo().await;
        let acc = account("bill");
        repo.create_account(acc.clone(), Profile::provision(&acc)).await.unwrap();

        let err = repo.insert_profile(Profile::provision(&acc)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_profile_insert_rolls_back_account() {
        let repo = repo().await;
        let first = account("bill");
        let profile = Profile::provision(&first);
        repo.create_account(first, profile.clone()).await.unwrap();

        // Reusing the profile id makes the second insert fail
        let second = account("ted");
        let mut clash = Profile::provision(&second);
        clash.id = profile.id;
        assert!(repo.create_account(second, clash).await.is_err());
        assert!(repo.get_account_by_username("ted").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_photo_round_trip_with_tags() {
        let repo = repo().await;
        let owner = seeded_profile(&repo, "bill").await;
        let p = photo(owner.id, "p1", Publication::Private);
        repo.insert_photo(&p).await.unwrap();

        let stored = repo.get_photo(p.id).await.unwrap().unwrap();
        assert_eq!(stored.tags, p.tags);
        assert_eq!(stored.published, Publication::Private);
        assert_eq!(repo.list_photos_tagged("sea").await.unwrap().len(), 1);
        assert!(repo.list_photos_tagged("mountain").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_cover_photo_clears_cover() {
        let repo = repo().await;
        let owner = seeded_profile(&repo, "bill").await;
        let p1 = photo(owner.id, "p1", Publication::Public);
        let p2 = photo(owner.id, "p2", Publication::Public);
        repo.insert_photo(&p1).await.unwrap();
        repo.insert_photo(&p2).await.unwrap();

        let now = Utc::now();
        let album = Album {
            id: Uuid::now_v7(),
            owner_id: owner.id,
            title: "Trip".into(),
            description: None,
            published: Publication::Public,
            date_uploaded: now,
            date_modified: now,
            date_published: Some(now),
            photo_ids: vec![p1.id, p2.id],
            cover_photo_id: Some(p1.id),
        };
        repo.insert_album(&album).await.unwrap();

        repo.delete_photo(p1.id).await.unwrap();
        let stored = repo.get_album(album.id).await.unwrap().unwrap();
        assert_eq!(stored.cover_photo_id, None);
        assert_eq!(stored.photo_ids, vec![p2.id]);
    }

    #[tokio::test]
    async fn test_deleting_account_cascades() {
        let repo = repo().await;
        let owner = seeded_profile(&repo, "bill").await;
        let p = photo(owner.id, "p1", Publication::Public);
        repo.insert_photo(&p).await.unwrap();

        repo.delete_account(owner.account_id).await.unwrap();
        assert!(repo.get_profile(owner.id).await.unwrap().is_none());
        assert!(repo.get_photo(p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listings_larger_than_one_bind_chunk() {
        let repo = repo().await;
        let owner = seeded_profile(&repo, "bill").await;
        let count = BIND_CHUNK * 2 + 7;

        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let p = photo(owner.id, &format!("p{i}"), Publication::Public);
            repo.insert_photo(&p).await.unwrap();
            ids.push(p.id);
        }

        let public = repo.list_public_photos().await.unwrap();
        assert_eq!(public.len(), count);
        assert!(public.iter().all(|p| p.tags.len() == 2));

        let fetched = repo.get_photos(&ids).await.unwrap();
        assert_eq!(fetched.iter().map(|p| p.id).collect::<Vec<_>>(), ids);

        let now = Utc::now();
        for (i, photo_id) in ids.iter().take(BIND_CHUNK + 1).enumerate() {
            let album = Album {
                id: Uuid::now_v7(),
                owner_id: owner.id,
                title: format!("a{i}"),
                description: None,
                published: Publication::Public,
                date_uploaded: now,
                date_modified: now,
                date_published: Some(now),
                photo_ids: vec![*photo_id],
                cover_photo_id: None,
            };
            repo.insert_album(&album).await.unwrap();
        }
        let albums = repo.list_public_albums().await.unwrap();
        assert_eq!(albums.len(), BIND_CHUNK + 1);
        assert!(albums.iter().all(|a| a.photo_ids.len() == 1));
    }
}
