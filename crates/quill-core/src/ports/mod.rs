//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod assets;
mod auth;
mod repository;

pub use assets::{AssetError, AssetStore};
pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use repository::{
    BaseRepository, CategoryRepository, CommentRepository, PagedRepository, PostRepository,
    UserRepository,
};
