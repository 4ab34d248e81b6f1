use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(Error::Validation(
                "Site ID contains invalid characters.".to_string(),
            ));
        }
        if s.is_empty() || s.len() > 64 {
            return Err(Error::Validation(
                "Site ID must be between 1 and 64 characters.".to_string(),
            ));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable per-site configuration, loaded once per process.
#[derive(Debug, Clone)]
pub struct Site {
    /// Account owning the site's source repository.
    pub owner: String,
    pub repo: String,
    /// Branch pull requests target.
    pub branch: String,
    /// Regex applied to the post URL path; capture group 1 is the post slug.
    pub url_pattern: String,
    pub path_prefix: String,
    pub path_suffix: String,
    /// Trimmed line text that ends the comment section of a source document.
    pub end_marker: String,
    /// Site comment syntax hiding marker lines; `{}` is the marker text.
    pub marker_wrap: String,
    /// HTML template for one rendered comment, with `{{field}}` placeholders.
    pub comment_template: String,
}

impl Site {
    /// Map a post URL path onto the source file holding that post.
    ///
    /// The slug captured by `url_pattern` has its slashes flattened to
    /// hyphens and is wrapped in the configured prefix/suffix. A resolved
    /// path with a parent-directory segment is rejected outright.
    pub fn source_path(&self, url_path: &str) -> Result<String> {
        let pattern = Regex::new(&self.url_pattern)
            .map_err(|e| Error::Validation(format!("site url_pattern is invalid: {e}")))?;
        let slug = pattern
            .captures(url_path)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "post path does not match the site pattern: {url_path}"
                ))
            })?;

        let path = format!(
            "{}{}{}",
            self.path_prefix,
            slug.as_str().replace('/', "-"),
            self.path_suffix
        );
        if path.split('/').any(|segment| segment == "..") {
            return Err(Error::PathTraversal(path));
        }
        Ok(path)
    }

    /// Hide a marker line in the site's comment syntax.
    pub fn wrap_marker(&self, marker: &str) -> String {
        self.marker_wrap.replace("{}", marker)
    }
}

/// One incoming comment, validated. Never persisted outside the repository
/// change it turns into.
#[derive(Debug, Clone)]
pub struct CommentSubmission {
    pub post: String,
    pub comment: String,
    pub metadata: CommentMetadata,
}

#[derive(Debug, Clone)]
pub struct CommentMetadata {
    pub name: String,
    pub extra: HashMap<String, String>,
}

impl CommentSubmission {
    pub fn new(
        post: Option<String>,
        comment: Option<String>,
        name: Option<String>,
        extra: HashMap<String, String>,
    ) -> Result<Self> {
        let post = post
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::Validation("Must specify a post".to_string()))?;
        let comment = comment
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Validation("Comment is required".to_string()))?;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::Validation("A name is required".to_string()))?;

        Ok(Self {
            post,
            comment,
            metadata: CommentMetadata { name, extra },
        })
    }
}

/// Three-valued comment lifecycle, resolved from the state of the pull
/// request tracking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Accepted,
    Rejected,
}
