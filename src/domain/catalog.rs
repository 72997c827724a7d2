//! Catalog cards: selection, filtering, viewport and per-card thumbnail state.

use std::ops::Range;

use crate::domain::marquee::Marquee;
use crate::domain::models::CatalogItem;
use crate::domain::search::fuzzy_filter;

/// 1×1 transparent GIF shown when a thumbnail cannot be loaded.
pub const PLACEHOLDER_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

pub fn thumbnail_file_name(name: &str) -> String {
    format!("{name}.jpg")
}

/// Cheap decode check: the bytes must start like a JPEG, PNG or GIF.
pub fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xff, 0xd8, 0xff])
        || bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailState {
    Pending,
    Loading,
    Loaded(Vec<u8>),
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Thumbnail {
    state: ThumbnailState,
}

impl Thumbnail {
    pub fn new() -> Self {
        Self {
            state: ThumbnailState::Pending,
        }
    }

    pub fn state(&self) -> &ThumbnailState {
        &self.state
    }

    pub fn image(&self) -> Option<&[u8]> {
        match &self.state {
            ThumbnailState::Loaded(bytes) => Some(bytes.as_slice()),
            ThumbnailState::Fallback => Some(PLACEHOLDER_GIF),
            ThumbnailState::Pending | ThumbnailState::Loading => None,
        }
    }

    fn begin_load(&mut self) -> bool {
        if self.state != ThumbnailState::Pending {
            return false;
        }
        self.state = ThumbnailState::Loading;
        true
    }

    /// Results only land on a thumbnail whose own request is outstanding.
    pub fn loaded(&mut self, bytes: Vec<u8>) {
        if self.state != ThumbnailState::Loading {
            return;
        }
        if looks_like_image(&bytes) {
            self.state = ThumbnailState::Loaded(bytes);
        } else {
            self.failed();
        }
    }

    /// Swaps in the placeholder. Returns false when no request was
    /// outstanding, which includes a placeholder already applied.
    pub fn failed(&mut self) -> bool {
        if self.state != ThumbnailState::Loading {
            return false;
        }
        self.state = ThumbnailState::Fallback;
        true
    }
}

impl Default for Thumbnail {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CatalogCard {
    pub item: CatalogItem,
    pub thumbnail: Thumbnail,
    pub title: Marquee,
}

impl CatalogCard {
    fn new(item: CatalogItem) -> Self {
        Self {
            title: Marquee::new(item.name.clone()),
            item,
            thumbnail: Thumbnail::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    cards: Vec<CatalogCard>,
    visible: Vec<usize>,
    filter: String,
    selected: usize,
    scroll: usize,
    viewport_rows: usize,
    title_width: usize,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every card; thumbnails start over.
    pub fn set_items(&mut self, items: Vec<CatalogItem>) {
        self.cards = items.into_iter().map(CatalogCard::new).collect();
        for card in &mut self.cards {
            card.title.resize(self.title_width);
        }
        self.selected = 0;
        self.scroll = 0;
        self.apply_filter();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[CatalogCard] {
        &self.cards
    }

    pub fn card(&self, name: &str) -> Option<&CatalogCard> {
        self.cards.iter().find(|c| c.item.name == name)
    }

    pub fn card_mut(&mut self, name: &str) -> Option<&mut CatalogCard> {
        self.cards.iter_mut().find(|c| c.item.name == name)
    }

    /// Cards passing the filter, in display order.
    pub fn visible_cards(&self) -> impl Iterator<Item = &CatalogCard> {
        self.visible.iter().filter_map(|idx| self.cards.get(*idx))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.selected = 0;
        self.scroll = 0;
        self.apply_filter();
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&CatalogCard> {
        self.visible
            .get(self.selected)
            .and_then(|idx| self.cards.get(*idx))
    }

    pub fn select_next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
        self.keep_selection_in_view();
    }

    pub fn select_previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
        self.keep_selection_in_view();
    }

    pub fn select(&mut self, position: usize) {
        if position < self.visible.len() {
            self.selected = position;
            self.keep_selection_in_view();
        }
    }

    pub fn set_viewport(&mut self, rows: usize, title_width: usize) {
        self.viewport_rows = rows;
        self.title_width = title_width;
        for card in &mut self.cards {
            card.title.resize(title_width);
        }
        self.keep_selection_in_view();
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Display positions currently on screen.
    pub fn viewport(&self) -> Range<usize> {
        let end = (self.scroll + self.viewport_rows).min(self.visible.len());
        self.scroll.min(end)..end
    }

    /// Names whose thumbnails should be requested now: on-screen cards that
    /// have not started loading. They are marked as loading.
    pub fn take_lazy_loads(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        for position in self.viewport() {
            let Some(idx) = self.visible.get(position).copied() else {
                continue;
            };
            if let Some(card) = self.cards.get_mut(idx) {
                if card.thumbnail.begin_load() {
                    names.push(card.item.name.clone());
                }
            }
        }
        names
    }

    /// Steps every on-screen overflowing title by one column.
    pub fn advance_titles(&mut self) {
        for position in self.viewport() {
            if let Some(idx) = self.visible.get(position).copied() {
                if let Some(card) = self.cards.get_mut(idx) {
                    card.title.advance();
                }
            }
        }
    }

    fn apply_filter(&mut self) {
        let names: Vec<&str> = self.cards.iter().map(|c| c.item.name.as_str()).collect();
        self.visible = fuzzy_filter(&names, &self.filter);
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
        self.keep_selection_in_view();
    }

    fn keep_selection_in_view(&mut self) {
        if self.viewport_rows == 0 {
            self.scroll = 0;
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + self.viewport_rows {
            self.scroll = self.selected + 1 - self.viewport_rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<CatalogItem> {
        names
            .iter()
            .map(|name| CatalogItem {
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn placeholder_is_a_gif() {
        assert!(looks_like_image(PLACEHOLDER_GIF));
        assert!(!looks_like_image(b"<html>404</html>"));
    }

    #[test]
    fn fallback_applies_once() {
        let mut thumb = Thumbnail::new();
        assert!(thumb.begin_load());
        assert!(thumb.failed());
        assert!(!thumb.failed());
        assert!(!thumb.failed());
        assert_eq!(thumb.state(), &ThumbnailState::Fallback);
        assert_eq!(thumb.image(), Some(PLACEHOLDER_GIF));
    }

    #[test]
    fn undecodable_bytes_fall_back() {
        let mut thumb = Thumbnail::new();
        thumb.begin_load();
        thumb.loaded(b"not an image".to_vec());
        assert_eq!(thumb.state(), &ThumbnailState::Fallback);
    }

    #[test]
    fn results_without_an_outstanding_request_are_ignored() {
        let mut thumb = Thumbnail::new();
        thumb.loaded(PLACEHOLDER_GIF.to_vec());
        assert!(!thumb.failed());
        assert_eq!(thumb.state(), &ThumbnailState::Pending);

        let mut view = CatalogView::new();
        view.set_items(items(&["a.mp4"]));
        view.set_viewport(2, 20);
        assert_eq!(view.take_lazy_loads(), vec!["a.mp4"]);

        // A rescan replaces the card while the old request is still out.
        view.set_items(items(&["a.mp4"]));
        let card = view.card_mut("a.mp4").expect("card");
        card.thumbnail.failed();
        assert_eq!(card.thumbnail.state(), &ThumbnailState::Pending);
        assert_eq!(view.take_lazy_loads(), vec!["a.mp4"]);
    }

    #[test]
    fn only_on_screen_cards_load_lazily() {
        let mut view = CatalogView::new();
        view.set_items(items(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]));
        view.set_viewport(2, 20);

        assert_eq!(view.take_lazy_loads(), vec!["a.mp4", "b.mp4"]);
        assert!(view.take_lazy_loads().is_empty());

        view.select_next();
        view.select_next();
        assert_eq!(view.viewport(), 1..3);
        assert_eq!(view.take_lazy_loads(), vec!["c.mp4"]);
    }

    #[test]
    fn filter_narrows_and_clears() {
        let mut view = CatalogView::new();
        view.set_items(items(&["holiday.mp4", "beach.mp4", "concert.mkv"]));

        view.set_filter("beach");
        let names: Vec<&str> = view.visible_cards().map(|c| c.item.name.as_str()).collect();
        assert_eq!(names, vec!["beach.mp4"]);

        view.set_filter("");
        assert_eq!(view.visible_len(), 3);
        assert_eq!(
            view.selected().map(|c| c.item.name.as_str()),
            Some("holiday.mp4")
        );
    }
}
