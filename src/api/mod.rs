//! REST wrappers around the Spotify Web API and the companion backends
//!
//! - `http`: authenticated adapter, one base URL per backend
//! - `album`, `artist`, `playlist`, `search`: Spotify catalogue lookups
//! - `system`: remote player control behind the `PlaybackApi` trait
//! - `library`: liked library on the custom backend (Spotify `/me` fallback)
//! - `movie`: local video backend
//! - `lyrics`: Happi lyrics search

pub mod album;
pub mod artist;
mod error;
mod http;
pub mod library;
pub mod lyrics;
pub mod movie;
pub mod playlist;
pub mod search;
pub mod system;

pub use error::{ApiError, ApiResult};
pub use http::{Backend, BaseUrls, HttpClient};
pub use lyrics::LyricsApi;
pub use system::{PlaybackApi, SystemApi};
