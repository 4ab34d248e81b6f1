use std::sync::Arc;

use chrono::Utc;
use domain::{Error, Result, Site};
use tracing::{info, warn};

use crate::api::{ForgeApi, ProposalSummary};
use crate::editor::edit_file;

/// Title prefix namespacing this system's pull requests; the reuse scan keys
/// off it.
pub const PROPOSAL_TITLE_PREFIX: &str = "prattle: ";

const NEW_COMMENTS_TITLE: &str = "prattle: New comments";
const RETRACT_TITLE: &str = "prattle: Retract comment";
const BRANCH_CREATE_ATTEMPTS: u32 = 5;

/// Turns one comment submission (or retraction) into a durable branch plus
/// pull request against the site repository. Stateless: everything durable
/// lives on the forge.
pub struct Commenter {
    forge: Arc<dyn ForgeApi>,
    site: Site,
    /// Forge account the server commits as. Differs from `site.owner` when
    /// commenting through a fork.
    author: String,
}

impl Commenter {
    pub fn new(forge: Arc<dyn ForgeApi>, site: Site, author: impl Into<String>) -> Self {
        Self {
            forge,
            site,
            author: author.into(),
        }
    }

    /// Commit the rendered comment block into `source_path` and return the
    /// number of the pull request tracking it.
    ///
    /// An open proposal of ours is reused when one exists, batching comments
    /// submitted in quick succession into a single pull request. Otherwise a
    /// fresh branch is cut (after a best-effort fork sync) and a new pull
    /// request opened.
    pub async fn create_comment(
        &self,
        source_path: &str,
        block: String,
        commenter_name: &str,
        key: &str,
    ) -> Result<u64> {
        let commit_message = format!(
            "prattle: New comment from {commenter_name}\nkey: {key}"
        );
        let end_marker = self.site.end_marker.clone();
        let transform = move |content: &str| domain::insert_block(content, &end_marker, &block);

        if let Some(existing) = self.find_reusable_proposal().await? {
            info!(
                number = existing.number,
                branch = %existing.head_branch,
                "reusing open proposal"
            );
            self.edit_source(&existing.head_branch, source_path, &commit_message, transform)
                .await?;
            return Ok(existing.number);
        }

        if self.site.owner != self.author {
            self.sync_fork_best_effort().await;
        }

        let branch = self.create_comment_branch().await?;
        self.edit_source(&branch, source_path, &commit_message, transform)
            .await?;
        self.open_proposal(&branch, NEW_COMMENTS_TITLE).await
    }

    /// Strip the marker-delimited block for `key` out of `source_path`.
    ///
    /// Retractions never batch onto an existing proposal and never touch the
    /// fork: each one gets its own branch and pull request.
    pub async fn retract_comment(&self, source_path: &str, key: &str) -> Result<u64> {
        let commit_message = format!("prattle: Delete comment {key}");
        let key = key.to_string();
        let transform = move |content: &str| domain::remove_block(content, &key);

        let branch = self.create_comment_branch().await?;
        self.edit_source(&branch, source_path, &commit_message, transform)
            .await?;
        self.open_proposal(&branch, RETRACT_TITLE).await
    }

    /// First open proposal (forge order, not recency) in our title namespace
    /// whose head branch belongs to the commenting account.
    async fn find_reusable_proposal(&self) -> Result<Option<ProposalSummary>> {
        let open = self
            .forge
            .list_open_proposals(&self.site.owner, &self.site.repo, &self.site.branch)
            .await?;
        Ok(open.into_iter().find(|pr| {
            pr.title.starts_with(PROPOSAL_TITLE_PREFIX) && pr.head_owner == self.author
        }))
    }

    /// Fork freshness is advisory: the new branch is cut from whatever ref
    /// is reachable either way, so every failure here is logged and
    /// swallowed.
    async fn sync_fork_best_effort(&self) {
        if let Err(err) = self
            .forge
            .sync_fork(&self.site.owner, &self.author, &self.site.repo, &self.site.branch)
            .await
        {
            warn!(%err, fork = %self.author, "fork sync failed, continuing");
        }
    }

    /// Cut a `comment-{millis}` branch from the base branch, retrying with a
    /// numeric suffix on name collisions. The timestamp keeps collisions
    /// rare; the retry only covers the race.
    async fn create_comment_branch(&self) -> Result<String> {
        let mut attempt = 1;
        loop {
            let mut name = format!("comment-{}", Utc::now().timestamp_millis());
            if attempt > 1 {
                name = format!("{name}-{attempt}");
            }

            let sha = self
                .forge
                .get_ref(&self.author, &self.site.repo, &self.site.branch)
                .await?;
            match self
                .forge
                .create_ref(&self.author, &self.site.repo, &name, &sha)
                .await
            {
                Ok(()) => return Ok(name),
                Err(Error::Conflict(_)) if attempt < BRANCH_CREATE_ATTEMPTS => {
                    info!(branch = %name, attempt, "branch name collision, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn edit_source<F>(
        &self,
        branch: &str,
        source_path: &str,
        message: &str,
        transform: F,
    ) -> Result<()>
    where
        F: FnOnce(&str) -> Result<String> + Send,
    {
        edit_file(
            self.forge.as_ref(),
            &self.author,
            &self.site.repo,
            branch,
            source_path,
            message,
            transform,
        )
        .await
    }

    async fn open_proposal(&self, branch: &str, title: &str) -> Result<u64> {
        let head = format!("{}:{}", self.author, branch);
        self.forge
            .create_proposal(
                &self.site.owner,
                &self.site.repo,
                &head,
                &self.site.branch,
                title,
                "",
            )
            .await
    }
}
