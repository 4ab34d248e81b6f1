//! Comment HTML rendering and marker-pair block assembly.

use crate::models::{CommentSubmission, Site};
use crate::text;

/// Render a submission through the site's HTML template.
///
/// Plain `{{field}}` substitution: `{{comment}}`, `{{name}}`, plus any extra
/// metadata fields the form submitted.
pub fn render_comment(site: &Site, submission: &CommentSubmission) -> String {
    let mut html = site
        .comment_template
        .replace("{{comment}}", &submission.comment)
        .replace("{{name}}", &submission.metadata.name);
    for (field, value) in &submission.metadata.extra {
        html = html.replace(&format!("{{{{{field}}}}}"), value);
    }
    html
}

/// The full block committed into the source document: the rendered comment
/// bracketed by its marker pair, each marker line hidden in the site's
/// comment syntax.
pub fn comment_block(site: &Site, html: &str, key: &str) -> String {
    format!(
        "{}\n{}\n{}",
        site.wrap_marker(&text::start_marker(key)),
        html,
        site.wrap_marker(&text::end_marker(key)),
    )
}
