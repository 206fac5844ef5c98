// Plain-text rendering of the gallery and the empty-state form.

use crate::core::resolutions::Resolution;
use std::fmt::Write;

/// Characters of the id shown on a card; enough to be unique in practice.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

pub fn card(resolution: &Resolution, liked: bool) -> String {
    let heart = if liked { "♥" } else { "♡" };
    let mut out = format!("[{}] {} {}\n", short_id(&resolution.id), heart, resolution.likes);
    for line in &resolution.resolutions {
        let _ = writeln!(out, "  • {line}");
    }
    let _ = write!(out, "  — {}", resolution.display_author());
    out
}

/// `liked` says, per card, whether this installation already liked it.
pub fn gallery(cards: &[(Resolution, bool)]) -> String {
    if cards.is_empty() {
        return "No resolutions yet\nBe the first to share your hopes for the new year!".to_string();
    }

    let mut out = String::from("✦ Resolutions\n");
    for (resolution, liked) in cards {
        out.push('\n');
        out.push_str(&card(resolution, *liked));
        out.push('\n');
    }
    out
}

pub fn form_intro() -> &'static str {
    "✦ New Year's Resolutions\nShare your hopes and dreams for the new year.\nStart with: post <resolution> | <resolution> ..."
}
