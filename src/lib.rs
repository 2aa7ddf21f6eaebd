//! # Gatehouse (Request Gate)
//!
//! `gatehouse` sits in front of a web application and decides, for every
//! incoming request, whether it may reach application code or must be
//! redirected first.
//!
//! ## Gate Policy
//!
//! The policy is a small decision table over three facts about a request:
//! whether the caller is authenticated, whether the path is public, and
//! whether the path is the home page.
//!
//! - **Signed-in users** visiting a public page (other than home) are sent to
//!   the home page.
//! - **Anonymous users** visiting anything that is neither a public page nor a
//!   public API endpoint are sent to the sign-in page.
//! - Everything else passes through.
//!
//! ## Identity
//!
//! Authentication is delegated to an external identity provider. Gatehouse
//! only forwards the session token it finds on the request and receives back a
//! user identifier, or nothing. The sign-up and sign-in pages mount the
//! provider's hosted widget and never handle credentials themselves.

pub mod api;
pub mod cli;
pub mod gate;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
