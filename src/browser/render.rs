//! Plain-text rendering of listings and detail views for the CLI.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::EntityKind;
use crate::catalog::covers::{CoverSize, image_url};
use crate::catalog::{AuthorDetails, BookDetails, ResultRecord};
use crate::core::state::{SearchSession, Status};

pub const DEFAULT_WIDTH: usize = 96;

/// Cuts `text` to at most `width` display columns, ending in `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "idle",
        Status::Loading => "loading",
        Status::LoadingMore => "loading more",
        Status::Exhausted => "end of results",
        Status::Error => "error",
    }
}

pub fn status_line(session: &SearchSession) -> String {
    let mut line = format!(
        "[{} | sort: {} | page {} | {} results | {}]",
        session.kind,
        session.sort.label(session.kind),
        session.page,
        session.results.len(),
        status_label(session.status)
    );
    if let Some(ref error) = session.last_error {
        line.push_str(&format!(" {error} (:retry to try page {} again)", session.page));
    }
    line
}

fn record_line(index: usize, record: &ResultRecord, width: usize) -> String {
    let mut line = format!("{:>3}. {}", index + 1, record.display_title);
    if let Some(ref subtitle) = record.display_subtitle {
        line.push_str(&format!(" - {subtitle}"));
    }
    if let Some(ref secondary) = record.sortable_secondary {
        line.push_str(&format!(" ({secondary})"));
    }
    truncate(&line, width)
}

pub fn list_lines(session: &SearchSession, width: usize) -> Vec<String> {
    if session.results.is_empty() {
        let message = if session.query_is_fetchable() {
            match session.status {
                Status::Loading => "Searching...",
                Status::Error => "Nothing loaded.",
                _ => "No results found.",
            }
        } else {
            "Type a longer query to search."
        };
        return vec![message.to_string()];
    }
    session
        .results
        .iter()
        .enumerate()
        .map(|(i, record)| record_line(i, record, width))
        .collect()
}

fn push_section(out: &mut String, title: &str, body: &str, width: usize) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    let options = textwrap::Options::new(width).initial_indent("  ").subsequent_indent("  ");
    out.push_str(&textwrap::fill(body, options));
    out.push('\n');
}

pub fn book_details(details: &BookDetails, covers_url: &str, width: usize) -> String {
    let mut out = format!("{}\n{}\n", details.title, details.key);

    let cover = details.cover_ids.first().map(|id| id.to_string());
    match image_url(covers_url, EntityKind::Books, cover.as_deref(), CoverSize::Large) {
        Some(url) => out.push_str(&format!("Cover: {url}\n")),
        None => out.push_str("Cover: (none)\n"),
    }

    let authors: Vec<String> = details
        .authors
        .iter()
        .map(|author| match author.key {
            Some(ref key) => format!("{} [{key}]", author.name),
            None => author.name.clone(),
        })
        .collect();
    if !authors.is_empty() {
        push_section(&mut out, "Authors", &authors.join(", "), width);
    }
    if let Some(ref date) = details.first_publish_date {
        push_section(&mut out, "First published", date, width);
    }
    if let Some(ref description) = details.description {
        push_section(&mut out, "Description", description, width);
    }
    if !details.subjects.is_empty() {
        push_section(&mut out, "Subjects", &details.subjects.join(", "), width);
    }
    out
}

pub fn author_details(details: &AuthorDetails, covers_url: &str, width: usize) -> String {
    let mut out = format!("{}\n{}\n", details.name, details.key);
    if let Some(ref fuller) = details.fuller_name {
        out.push_str(&format!("Full name: {fuller}\n"));
    }

    let photo = details
        .photo_ids
        .first()
        .map(|_| details.key.clone());
    match image_url(covers_url, EntityKind::Authors, photo.as_deref(), CoverSize::Large) {
        Some(url) => out.push_str(&format!("Photo: {url}\n")),
        None => out.push_str("Photo: (none)\n"),
    }

    let lifespan = match (&details.birth_date, &details.death_date) {
        (Some(born), Some(died)) => Some(format!("{born} - {died}")),
        (Some(born), None) => Some(format!("Born {born}")),
        (None, Some(died)) => Some(format!("Died {died}")),
        (None, None) => None,
    };
    if let Some(lifespan) = lifespan {
        push_section(&mut out, "Life", &lifespan, width);
    }
    if let Some(ref bio) = details.bio {
        push_section(&mut out, "Biography", bio, width);
    }
    if !details.links.is_empty() {
        out.push_str("\nLinks\n");
        for link in &details.links {
            out.push_str(&format!("  {}: {}\n", link.title, link.url));
        }
    }
    out
}
