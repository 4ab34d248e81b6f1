use domain::{CommentStatus, Result, Site};

use crate::api::ForgeApi;

/// Map the forge state of a previously created proposal onto the comment
/// lifecycle. A missing proposal propagates as NotFound, never as Rejected.
pub async fn resolve_status(
    forge: &dyn ForgeApi,
    site: &Site,
    number: u64,
) -> Result<CommentStatus> {
    let proposal = forge.get_proposal(&site.owner, &site.repo, number).await?;
    Ok(if proposal.open {
        CommentStatus::Pending
    } else if proposal.merged {
        CommentStatus::Accepted
    } else {
        CommentStatus::Rejected
    })
}
