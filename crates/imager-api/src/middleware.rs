//! imager/crates/imager-api/src/middleware.rs Middleware
//!
//! Access logging, CORS and response hardening headers.

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};

// Default access log format:
// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// The API never accepts writes, so only GET crosses origins.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET"])
        .allowed_header(actix_web::http::header::AUTHORIZATION)
        .max_age(3600)
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("Content-Security-Policy", "default-src 'none'"))
}
