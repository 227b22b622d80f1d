//! imager/crates/imager-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Imager.

pub mod commands;
pub mod error;
pub mod models;
pub mod policy;
pub mod service;
pub mod traits;
pub mod validate;

// Re-exporting for easier access in other crates
pub use commands::*;
pub use error::*;
pub use models::*;
pub use policy::{can_edit, can_view, ensure_edit, ensure_view, filter_visible, Ownable, Viewer};
pub use service::ImagerService;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_profile_provisioned_from_account() {
        let account = Account {
            id: Uuid::now_v7(),
            username: "bill".to_string(),
            email: None,
            first_name: None,
            last_name: None,
            password_hash: String::new(),
            is_active: true,
            date_joined: Utc::now(),
        };
        let profile = Profile::provision(&account);
        assert_eq!(profile.account_id, account.id);
        assert_eq!(profile.username, "bill");
        assert!(profile.hireable);
        assert!(profile.bio.is_none() && profile.photography_style.is_none());
    }
}
