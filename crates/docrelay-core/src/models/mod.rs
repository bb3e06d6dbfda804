//! Typed models for the entities the proxy relays.
//!
//! The backend owns these shapes; list payloads are relayed as opaque JSON
//! and only fixture data and library consumers use the typed forms.

pub mod category;
pub mod document;
pub mod news;
pub mod user;

pub use category::Category;
pub use document::DocumentRecord;
pub use news::NewsItem;
pub use user::User;
