mod api;
mod commenter;
mod editor;
mod github;
mod status;

pub use api::{FileContent, ForgeApi, ProposalSummary, ProposalView};
pub use commenter::{Commenter, PROPOSAL_TITLE_PREFIX};
pub use editor::edit_file;
pub use github::GithubClient;
pub use status::resolve_status;
