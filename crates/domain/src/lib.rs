mod errors;
mod key;
mod models;
mod render;
mod text;

pub use errors::{Error, Result};
pub use key::CommentSecret;
pub use models::{CommentMetadata, CommentStatus, CommentSubmission, Site, SiteId};
pub use render::{comment_block, render_comment};
pub use text::{end_marker, insert_block, remove_block, start_marker};
