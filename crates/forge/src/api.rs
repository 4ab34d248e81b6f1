use async_trait::async_trait;
use domain::Result;

/// One open change proposal as listed by the forge, in forge order.
#[derive(Debug, Clone)]
pub struct ProposalSummary {
    pub number: u64,
    pub title: String,
    /// Account owning the head branch.
    pub head_owner: String,
    pub head_branch: String,
}

/// Open/merged state of a single proposal.
#[derive(Debug, Clone, Copy)]
pub struct ProposalView {
    pub open: bool,
    pub merged: bool,
}

/// One file as stored on a branch.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub data: Vec<u8>,
    /// Content hash guarding the read-modify-write cycle.
    pub sha: String,
}

/// Minimal git-forge REST surface the workflow needs.
///
/// Every non-2xx response surfaces as a typed [`domain::Error`] carrying the
/// upstream status code (404 -> NotFound, 422 -> Conflict).
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// Commit sha a branch currently points at.
    async fn get_ref(&self, owner: &str, repo: &str, branch: &str) -> Result<String>;

    /// Create a new branch at `sha`. Conflict when the name already exists.
    async fn create_ref(&self, owner: &str, repo: &str, branch: &str, sha: &str) -> Result<()>;

    async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<FileContent>;

    /// Write `data` to `path`, guarded by the content `sha` from the read.
    #[allow(clippy::too_many_arguments)]
    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        data: &[u8],
        sha: &str,
        message: &str,
    ) -> Result<()>;

    /// Open pull requests targeting `base`, in forge-returned order.
    async fn list_open_proposals(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
    ) -> Result<Vec<ProposalSummary>>;

    /// Open a pull request `head` -> `base` and return its number.
    async fn create_proposal(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<u64>;

    async fn get_proposal(&self, owner: &str, repo: &str, number: u64) -> Result<ProposalView>;

    /// Best-effort fork freshening: open a pull request origin -> fork and
    /// merge it immediately. The forge has no direct sync endpoint.
    async fn sync_fork(
        &self,
        origin_owner: &str,
        fork_owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<()>;
}
