use domain::{Error, Result};

use crate::api::ForgeApi;

/// Read-modify-write of one file on one branch.
///
/// The write is guarded by the content sha returned from the read; a
/// concurrent edit landing in between fails the call. No retry is attempted.
pub async fn edit_file<F>(
    forge: &dyn ForgeApi,
    owner: &str,
    repo: &str,
    branch: &str,
    path: &str,
    message: &str,
    transform: F,
) -> Result<()>
where
    F: FnOnce(&str) -> Result<String> + Send,
{
    let file = forge.get_file(owner, repo, branch, path).await?;
    let content = String::from_utf8(file.data)
        .map_err(|_| Error::Document(format!("{path} is not valid UTF-8")))?;
    let updated = transform(&content)?;
    forge
        .put_file(
            owner,
            repo,
            branch,
            path,
            updated.as_bytes(),
            &file.sha,
            message,
        )
        .await
}
