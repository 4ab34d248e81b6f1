use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use domain::{CommentSecret, CommentSubmission, Site, SiteId};
use forge::Commenter;

use crate::http::error::error_response;
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

#[derive(Deserialize)]
pub struct PostCommentRequest {
    pub post: Option<String>,
    pub comment: Option<String>,
    pub metadata: Option<MetadataBody>,
}

#[derive(Deserialize)]
pub struct MetadataBody {
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn lookup_site(state: &AppState, site_id: &str) -> Result<Site, ApiError> {
    SiteId::new(site_id).map_err(error_response)?;
    state
        .sites
        .get(site_id)
        .cloned()
        .ok_or_else(|| error_response(domain::Error::NotFound("Site not found".to_string())))
}

pub async fn post_comment(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(payload): Json<PostCommentRequest>,
) -> Result<Json<Value>, ApiError> {
    let site = lookup_site(&state, &site_id)?;

    let (name, extra) = match payload.metadata {
        Some(m) => {
            // Only string-valued metadata fields feed the template.
            let extra = m
                .extra
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect();
            (m.name, extra)
        }
        None => (None, HashMap::new()),
    };
    let submission = CommentSubmission::new(payload.post, payload.comment, name, extra)
        .map_err(error_response)?;

    let source_path = site.source_path(&submission.post).map_err(error_response)?;

    let secret = CommentSecret::generate();
    let key = secret.key();
    let html = domain::render_comment(&site, &submission);
    let block = domain::comment_block(&site, &html, &key);

    let commenter = Commenter::new(state.forge.clone(), site, state.commenting_user.clone());
    let number = commenter
        .create_comment(&source_path, block, &submission.metadata.name, &key)
        .await
        .map_err(|e| {
            error!(%e, site = %site_id, "failed to save comment");
            error_response(e)
        })?;

    // The status token: everything needed to look the comment up or retract
    // it later. The secret appears here and nowhere else.
    let update_url = format!(
        "/api/{}/comments/{}/{}/{}",
        site_id,
        number,
        secret.expose(),
        submission.post.trim_start_matches('/')
    );
    info!(site = %site_id, number, "comment proposed");

    Ok(Json(json!({ "html": html, "update_url": update_url })))
}

pub async fn comment_status(
    State(state): State<AppState>,
    Path((site_id, number, _secret, _post_path)): Path<(String, u64, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let site = lookup_site(&state, &site_id)?;

    let status = forge::resolve_status(state.forge.as_ref(), &site, number)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "state": status })))
}

pub async fn retract_comment(
    State(state): State<AppState>,
    Path((site_id, _number, secret, post_path)): Path<(String, u64, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let site = lookup_site(&state, &site_id)?;

    let post = format!("/{post_path}");
    let source_path = site.source_path(&post).map_err(error_response)?;
    let key = CommentSecret::from_raw(secret).key();

    let commenter = Commenter::new(state.forge.clone(), site, state.commenting_user.clone());
    commenter
        .retract_comment(&source_path, &key)
        .await
        .map_err(|e| {
            error!(%e, site = %site_id, "failed to retract comment");
            error_response(e)
        })?;

    info!(site = %site_id, "comment retraction proposed");
    Ok(Json(json!({ "status": "ok" })))
}
