//! Field-level checks shared by every create/update path.
//! Each function returns the cleaned value or a `ValidationError`.

use std::collections::BTreeSet;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{AppError, Result};

pub const TITLE_MAX: usize = 128;
pub const DESCRIPTION_MAX: usize = 255;
pub const TAG_MAX: usize = 100;
pub const USERNAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 8;
const TEXT_MAX: usize = 255;
const TRAVEL_RADIUS_MAX: f64 = 999.99;

fn invalid(msg: impl Into<String>) -> AppError {
    AppError::ValidationError(msg.into())
}

fn too_long(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(invalid(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

pub fn title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(invalid("title is required"));
    }
    too_long("title", title, TITLE_MAX)?;
    Ok(title.to_string())
}

/// Blank text is stored as absent.
pub fn optional_text(field: &str, raw: Option<String>, max: usize) -> Result<Option<String>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            too_long(field, text, max)?;
            Ok(Some(text.to_string()))
        }
    }
}

pub fn description(raw: Option<String>) -> Result<Option<String>> {
    optional_text("description", raw, DESCRIPTION_MAX)
}

pub fn image(raw: &str) -> Result<String> {
    let image = raw.trim();
    if image.is_empty() {
        return Err(invalid("an image is required"));
    }
    Ok(image.to_string())
}

/// Trims each tag, drops blanks and collapses duplicates.
pub fn tags(raw: Vec<String>) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        too_long("tag", tag, TAG_MAX)?;
        out.insert(tag.to_string());
    }
    Ok(out)
}

pub fn username(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(invalid("username is required"));
    }
    too_long("username", name, USERNAME_MAX)?;
    let allowed = |c: char| c.is_ascii_alphanumeric() || "@.+-_".contains(c);
    if !name.chars().all(allowed) {
        return Err(invalid(
            "username may only contain letters, digits and @/./+/-/_",
        ));
    }
    Ok(name.to_string())
}

pub fn password(raw: &SecretString) -> Result<()> {
    if raw.expose_secret().chars().count() < PASSWORD_MIN {
        return Err(invalid(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

pub fn email(raw: Option<String>) -> Result<Option<String>> {
    let email = optional_text("email", raw, 254)?;
    if let Some(addr) = &email {
        match addr.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(invalid(format!("{addr:?} is not a valid email address"))),
        }
    }
    Ok(email)
}

pub fn phone(raw: Option<String>) -> Result<Option<String>> {
    let phone = optional_text("phone", raw, 32)?;
    if let Some(number) = &phone {
        let digits = number.chars().filter(char::is_ascii_digit).count();
        let allowed = |c: char| c.is_ascii_digit() || " +-().".contains(c);
        if !number.chars().all(allowed) || !(7..=15).contains(&digits) {
            return Err(invalid(format!("{number:?} is not a valid phone number")));
        }
    }
    Ok(phone)
}

pub fn travel_radius(raw: Option<f64>) -> Result<Option<f64>> {
    match raw {
        None => Ok(None),
        Some(r) if r.is_finite() && (0.0..=TRAVEL_RADIUS_MAX).contains(&r) => {
            Ok(Some((r * 100.0).round() / 100.0))
        }
        Some(r) => Err(invalid(format!(
            "travel radius {r} must be between 0 and {TRAVEL_RADIUS_MAX}"
        ))),
    }
}

pub fn profile_text(field: &str, raw: Option<String>) -> Result<Option<String>> {
    optional_text(field, raw, TEXT_MAX)
}
