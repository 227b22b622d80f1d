//! # Ownership & Visibility Policy
//!
//! The single authorization predicate used wherever content is read or
//! written. The caller resolves who is asking and passes a [`Viewer`] in;
//! nothing here reads ambient request state.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Album, Photo, Profile, Publication};

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    /// An authenticated caller, identified by their profile id
    Profile(Uuid),
}

impl Viewer {
    pub fn profile_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Profile(id) => Some(*id),
        }
    }

    /// The viewer's profile id, or `Unauthenticated` for anonymous callers.
    pub fn require_profile(&self) -> Result<Uuid> {
        self.profile_id()
            .ok_or_else(|| AppError::Unauthenticated("this action requires a login".into()))
    }
}

impl From<&Profile> for Viewer {
    fn from(profile: &Profile) -> Self {
        Viewer::Profile(profile.id)
    }
}

/// Anything with a single owning profile and a publication state.
pub trait Ownable {
    fn owner_id(&self) -> Uuid;
    fn publication(&self) -> Publication;
    /// Human-readable kind, used in error messages
    fn kind(&self) -> &'static str;
    fn id(&self) -> Uuid;
}

impl Ownable for Photo {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
    fn publication(&self) -> Publication {
        self.published
    }
    fn kind(&self) -> &'static str {
        "Photo"
    }
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Ownable for Album {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
    fn publication(&self) -> Publication {
        self.published
    }
    fn kind(&self) -> &'static str {
        "Album"
    }
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A profile owns itself and is always readable.
impl Ownable for Profile {
    fn owner_id(&self) -> Uuid {
        self.id
    }
    fn publication(&self) -> Publication {
        Publication::Public
    }
    fn kind(&self) -> &'static str {
        "Profile"
    }
    fn id(&self) -> Uuid {
        self.id
    }
}

fn is_owner<T: Ownable + ?Sized>(viewer: &Viewer, item: &T) -> bool {
    viewer.profile_id() == Some(item.owner_id())
}

/// PUBLIC items are readable by everyone, anything else only by its owner.
/// SHARED grants nothing beyond PRIVATE.
pub fn can_view<T: Ownable + ?Sized>(viewer: &Viewer, item: &T) -> bool {
    item.publication() == Publication::Public || is_owner(viewer, item)
}

/// Only the owner may edit, whatever the publication state.
pub fn can_edit<T: Ownable + ?Sized>(viewer: &Viewer, item: &T) -> bool {
    is_owner(viewer, item)
}

/// Keeps the items the viewer may see, in their original order.
pub fn filter_visible<T: Ownable>(viewer: &Viewer, items: impl IntoIterator<Item = T>) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| can_view(viewer, item))
        .collect()
}

/// Reads hard-deny: anonymous and non-owning viewers alike get `Forbidden`.
pub fn ensure_view<T: Ownable + ?Sized>(viewer: &Viewer, item: &T) -> Result<()> {
    if can_view(viewer, item) {
        return Ok(());
    }
    log::warn!("denied read of {} {} to {:?}", item.kind(), item.id(), viewer);
    Err(AppError::Forbidden(format!(
        "{} {} is not visible to you",
        item.kind(),
        item.id()
    )))
}

/// Writes tell "log in first" apart from "not yours".
pub fn ensure_edit<T: Ownable + ?Sized>(viewer: &Viewer, item: &T) -> Result<()> {
    viewer.require_profile()?;
    if can_edit(viewer, item) {
        return Ok(());
    }
    log::warn!("denied write of {} {} to {:?}", item.kind(), item.id(), viewer);
    Err(AppError::Forbidden(format!(
        "only the owner may modify {} {}",
        item.kind(),
        item.id()
    )))
}
