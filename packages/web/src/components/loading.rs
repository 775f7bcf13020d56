//! Loading markup helpers for partial panels.

/// Placeholder for a panel that is fetching its data.
pub fn panel(label: &str) -> String {
    format!(
        r#"<div class="loading-panel"><span class="dots"><i></i><i></i><i></i></span><p>{label}</p></div>"#
    )
}
