//! Viewer URLs. Pure formatting, no network access.

/// Web page that embeds a shared document in an iframe.
pub fn embeddable_viewer_url(short_id: &str) -> String {
    format!("http://crocodoc.com/{short_id}?embedded=true")
}

/// Session-based viewing, which also works for private documents.
/// Obtain `session_id` from `get_session`.
pub fn session_based_viewer_url(session_id: &str) -> String {
    format!("https://crocodoc.com/view/?sessionId={session_id}")
}
