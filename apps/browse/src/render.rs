//! Plain-text rendering of controller states.

use std::fmt::Write as _;

use client_core::{CollectionState, DetailState};
use shared::domain::Item;

pub fn status_line(state: &CollectionState) -> String {
    match state {
        CollectionState::Loading => "loading...".to_string(),
        CollectionState::Success(loaded) => {
            let mut line = format!(
                "{} items, next page {}",
                loaded.items.len(),
                loaded.next_page_number
            );
            if loaded.is_fetching_more {
                line.push_str(", loading more...");
            } else if !loaded.has_more_pages {
                line.push_str(", end of listing");
            }
            line
        }
        CollectionState::Error { message } => format!("error: {message}"),
    }
}

pub fn item_list(items: &[Item]) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{index:>4}  #{:<5} {}", item.id, item.title);
    }
    out
}

pub fn detail(state: &DetailState) -> String {
    match state {
        DetailState::Loading => "loading...".to_string(),
        DetailState::Success(item) => format!(
            "#{} {}\n{}\nimage: {}",
            item.id,
            item.title,
            item.description,
            item.derived_image_url()
        ),
        DetailState::Error { message } => format!("error: {message}"),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
