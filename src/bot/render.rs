//! Embed rendering shared by every list and detail command.

use crate::core::{
    load::{LoadError, LoadState},
    pagination::Page,
    schema::{TableRecord, render_row, render_rows},
};
use poise::serenity_prelude as serenity;

/// Accent for data embeds
pub const COLOR_INFO: u32 = 0x0058_65F2;
/// Accent for confirmations
pub const COLOR_SUCCESS: u32 = 0x0057_F287;
/// Accent for an unreachable backend
pub const COLOR_UNAVAILABLE: u32 = 0x00FE_E75C;
/// Accent for other failures
pub const COLOR_ERROR: u32 = 0x00ED_4245;

// Discord embed limits, in characters
const TITLE_LIMIT: usize = 256;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const EMBED_TEXT_LIMIT: usize = 6000;
/// Left free for the footer and any description a command adds.
const EMBED_RESERVE: usize = 600;

/// Cuts `text` to at most `max` characters, marking the cut with `…`.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Characters left for fields once `title` is placed.
#[must_use]
pub fn field_budget(title: &str) -> usize {
    EMBED_TEXT_LIMIT - EMBED_RESERVE - title.chars().count().min(TITLE_LIMIT)
}

/// Keeps fields in order while their combined length fits `budget`.
///
/// Returns the kept fields and the number dropped.
#[must_use]
pub fn fit_fields(fields: Vec<(String, String)>, budget: usize) -> (Vec<(String, String)>, usize) {
    let total = fields.len();
    let mut used = 0;
    let kept: Vec<_> = fields
        .into_iter()
        .take_while(|(name, value)| {
            used += name.chars().count() + value.chars().count();
            used <= budget
        })
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Title/value pairs for each record on a page; the first column is the title.
///
/// Names and values are cut to the per-field limits.
pub fn page_fields<T: TableRecord>(page: &Page<'_, T>) -> Vec<(String, String)> {
    render_rows(page.items)
        .into_iter()
        .map(|(title, columns)| {
            let body = columns
                .into_iter()
                .skip(1)
                .map(|(label, value)| format!("**{label}:** {value}"))
                .collect::<Vec<_>>()
                .join("\n");
            let body = if body.is_empty() { "-".to_string() } else { body };
            (
                truncate_chars(&title, FIELD_NAME_LIMIT),
                truncate_chars(&body, FIELD_VALUE_LIMIT),
            )
        })
        .collect()
}

/// `Page 2/5 • 43 items`
#[must_use]
pub fn page_footer<T>(page: &Page<'_, T>) -> String {
    format!(
        "Page {}/{} • {} item{}",
        page.page,
        page.total_pages,
        page.total_items,
        if page.total_items == 1 { "" } else { "s" }
    )
}

/// One page of records as an embed.
///
/// Rows that would push the embed past Discord's size limit are left out and
/// counted in the footer.
pub fn page_embed<T: TableRecord>(title: &str, page: &Page<'_, T>) -> serenity::CreateEmbed {
    let title = truncate_chars(title, TITLE_LIMIT);
    let embed = serenity::CreateEmbed::default().title(&title).color(COLOR_INFO);
    if page.total_items == 0 {
        return embed
            .footer(serenity::CreateEmbedFooter::new(page_footer(page)))
            .description("Nothing to show.");
    }

    let (fields, dropped) = fit_fields(page_fields(page), field_budget(&title));
    let footer = if dropped > 0 {
        format!("{} • {dropped} row(s) too long to show", page_footer(page))
    } else {
        page_footer(page)
    };
    embed
        .footer(serenity::CreateEmbedFooter::new(footer))
        .fields(fields.into_iter().map(|(name, value)| (name, value, false)))
}

/// A single record with one inline field per column.
pub fn record_embed<T: TableRecord>(title: &str, record: &T) -> serenity::CreateEmbed {
    let title = truncate_chars(title, TITLE_LIMIT);
    let fields = render_row(record)
        .into_iter()
        .map(|(label, value)| (label.to_string(), truncate_chars(&value, FIELD_VALUE_LIMIT)))
        .collect();
    let (fields, _) = fit_fields(fields, field_budget(&title));
    serenity::CreateEmbed::default()
        .title(title)
        .color(COLOR_SUCCESS)
        .fields(fields.into_iter().map(|(label, value)| (label, value, true)))
}

/// Heading and accent for a failed load; each error class reads differently.
#[must_use]
pub fn failure_heading(error: &LoadError) -> (&'static str, u32) {
    match error {
        LoadError::Unavailable(_) => ("🔌 Backend unavailable", COLOR_UNAVAILABLE),
        LoadError::Unauthorized(_) => ("🔒 Not authorized", COLOR_ERROR),
        LoadError::Failed(_) => ("❌ Request failed", COLOR_ERROR),
    }
}

/// Renders a load state: a placeholder, the failure, or the data via `render`.
pub fn state_embed<T>(
    title: &str,
    state: &LoadState<T>,
    render: impl FnOnce(&T) -> serenity::CreateEmbed,
) -> serenity::CreateEmbed {
    match state {
        LoadState::Loading => serenity::CreateEmbed::default()
            .title(title)
            .color(COLOR_INFO)
            .description("Loading…"),
        LoadState::Failed(error) => {
            let (heading, color) = failure_heading(error);
            serenity::CreateEmbed::default()
                .title(format!("{title}: {heading}"))
                .color(color)
                .description(error.message())
        }
        LoadState::Ready(value) => render(value),
    }
}

/// A plain reply carrying one embed.
#[must_use]
pub fn embed_reply(embed: serenity::CreateEmbed) -> poise::CreateReply {
    poise::CreateReply::default().embed(embed)
}
