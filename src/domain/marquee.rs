//! Horizontally scrolling labels for titles wider than their container.

use std::time::{Duration, Instant};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MARQUEE_GAP: usize = 4;
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarqueeFrame {
    pub text: String,
    pub fade_left: bool,
    pub fade_right: bool,
}

#[derive(Debug, Clone)]
pub struct Marquee {
    text: String,
    text_width: usize,
    container_width: usize,
    offset: usize,
}

impl Marquee {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text_width: text.width(),
            text,
            container_width: 0,
            offset: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replacing the text with the same value keeps the scroll position.
    pub fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_string();
        self.text_width = self.text.width();
        self.offset = 0;
    }

    pub fn resize(&mut self, container_width: usize) {
        self.container_width = container_width;
        if !self.overflows() {
            self.offset = 0;
        }
    }

    pub fn container_width(&self) -> usize {
        self.container_width
    }

    pub fn overflows(&self) -> bool {
        self.container_width > 0 && self.text_width > self.container_width
    }

    pub fn advance(&mut self) {
        if self.overflows() {
            self.offset = (self.offset + 1) % (self.text_width + MARQUEE_GAP);
        } else {
            self.offset = 0;
        }
    }

    pub fn frame(&self) -> MarqueeFrame {
        if !self.overflows() {
            return MarqueeFrame {
                text: self.text.clone(),
                fade_left: false,
                fade_right: false,
            };
        }

        let cycle: String = format!("{}{}", self.text, " ".repeat(MARQUEE_GAP));
        let mut skipped = 0;
        let mut used = 0;
        let mut text = String::new();
        for ch in cycle.chars().chain(cycle.chars()) {
            let w = ch.width().unwrap_or(0);
            if skipped < self.offset {
                skipped += w;
                continue;
            }
            if used + w > self.container_width {
                break;
            }
            used += w;
            text.push(ch);
        }

        MarqueeFrame {
            text,
            fade_left: self.offset > 0,
            fade_right: true,
        }
    }
}

/// Holds the latest terminal size until it has been stable for `delay`.
#[derive(Debug, Clone)]
pub struct ResizeDebounce {
    delay: Duration,
    pending: Option<(u16, u16, Instant)>,
}

impl ResizeDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn observe(&mut self, cols: u16, rows: u16, now: Instant) {
        self.pending = Some((cols, rows, now + self.delay));
    }

    pub fn poll(&mut self, now: Instant) -> Option<(u16, u16)> {
        match self.pending {
            Some((cols, rows, deadline)) if now >= deadline => {
                self.pending = None;
                Some((cols, rows))
            }
            _ => None,
        }
    }
}

impl Default for ResizeDebounce {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_never_scroll() {
        let mut marquee = Marquee::new("clip.mp4");
        marquee.resize(20);
        marquee.advance();
        assert!(!marquee.overflows());
        assert_eq!(
            marquee.frame(),
            MarqueeFrame {
                text: "clip.mp4".to_string(),
                fade_left: false,
                fade_right: false,
            }
        );
    }

    #[test]
    fn long_titles_scroll_and_wrap_with_gap() {
        let mut marquee = Marquee::new("abcdefgh");
        marquee.resize(5);
        assert_eq!(marquee.frame().text, "abcde");
        assert!(marquee.frame().fade_right);
        assert!(!marquee.frame().fade_left);

        for _ in 0..6 {
            marquee.advance();
        }
        let frame = marquee.frame();
        assert_eq!(frame.text, "gh   ");
        assert!(frame.fade_left);

        for _ in 0..6 {
            marquee.advance();
        }
        assert_eq!(marquee.frame().text, "abcde");
    }

    #[test]
    fn widening_the_container_stops_scrolling() {
        let mut marquee = Marquee::new("abcdefgh");
        marquee.resize(4);
        marquee.advance();
        marquee.resize(40);
        assert!(!marquee.overflows());
        assert_eq!(marquee.frame().text, "abcdefgh");
    }

    #[test]
    fn resize_applies_only_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = ResizeDebounce::new(Duration::from_millis(150));
        debounce.observe(80, 24, start);
        debounce.observe(100, 30, start + Duration::from_millis(100));
        assert_eq!(debounce.poll(start + Duration::from_millis(200)), None);
        assert_eq!(
            debounce.poll(start + Duration::from_millis(260)),
            Some((100, 30))
        );
        assert_eq!(debounce.poll(start + Duration::from_millis(400)), None);
    }
}
