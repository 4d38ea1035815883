//! Request authentication and route-level access control.
//!
//! Two layers run on every API request, in this order:
//!
//! 1. [`auth::authenticate_request`] reads the `Authorization: Bearer <token>`
//!    header and attaches a [`auth::SecurityContext`]. A bad or missing token
//!    leaves the request anonymous; it is never rejected here.
//! 2. [`access::require_authentication`] returns 401 for anonymous callers on
//!    any route that is not public.
//!
//! Handlers that need the caller take an [`auth::AuthUser`] extractor:
//!
//! ```ignore
//! async fn get_profile(AuthUser(identity): AuthUser) -> Json<Profile> {
//!     // ...
//! }
//! ```

pub mod access;
pub mod auth;
