// Handles the generated page sequence and the page being viewed

use serde::Serialize;

/// Ordered pages of the last successful page-mode generation.
///
/// `current` is always a valid index while `pages` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pages: Vec<String>,
    current: usize,
}

/// Render snapshot handed to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub current_page: Option<String>,
    pub page_number: usize,
    pub total_pages: usize,
    pub label: String,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sequence and returns to the first page.
    pub fn reset(&mut self, pages: Vec<String>) {
        self.pages = pages;
        self.current = 0;
    }

    /// Moves to `target` when it is in range; anything else leaves the state alone.
    pub fn go_to(&mut self, target: i64) -> bool {
        match usize::try_from(target) {
            Ok(index) if index < self.pages.len() => {
                self.current = index;
                true
            }
            _ => false,
        }
    }

    /// Moves to a 1-based page number typed by the user.
    pub fn go_to_input(&mut self, input: &str) -> bool {
        match input.trim().parse::<i64>() {
            Ok(number) => self.go_to(number.saturating_sub(1)),
            Err(_) => false,
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current_index().saturating_add(1))
    }

    pub fn previous(&mut self) -> bool {
        self.go_to(self.current_index() - 1)
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.pages.len()
    }

    pub fn has_previous(&self) -> bool {
        !self.pages.is_empty() && self.current > 0
    }

    pub fn current(&self) -> Option<&str> {
        self.pages.get(self.current).map(String::as_str)
    }

    /// Index of the page being viewed; meaningless while there are no pages.
    pub fn current_index(&self) -> i64 {
        i64::try_from(self.current).unwrap_or(i64::MAX)
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// `(page_number, total)`, 1-based.
    pub fn position(&self) -> Option<(usize, usize)> {
        (!self.pages.is_empty()).then(|| (self.current + 1, self.pages.len()))
    }

    pub fn view(&self) -> PageView {
        let (page_number, total_pages) = self.position().unwrap_or((0, 0));
        let label = if total_pages == 0 {
            "No pages".to_string()
        } else {
            format!("Page {page_number} of {total_pages}")
        };

        PageView {
            current_page: self.current().map(str::to_string),
            page_number,
            total_pages,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("<svg>{i}</svg>")).collect()
    }

    #[test]
    fn go_to_lands_on_every_valid_index() {
        for n in 1..=6 {
            let mut state = Pagination::new();
            state.reset(pages(n));
            for i in 0..n {
                assert!(state.go_to(i as i64));
                assert_eq!(state.current_index(), i as i64);
                assert_eq!(state.current(), Some(format!("<svg>{i}</svg>").as_str()));
            }
        }
    }

    #[test]
    fn out_of_range_go_to_is_a_no_op() {
        let mut state = Pagination::new();
        state.reset(pages(3));
        state.go_to(1);

        for target in [-1, 3, 4, 100, i64::MIN, i64::MAX] {
            assert!(!state.go_to(target));
            assert_eq!(state.current_index(), 1);
        }
    }

    #[test]
    fn reset_always_returns_to_first_page() {
        let mut state = Pagination::new();
        state.reset(pages(5));
        state.go_to(4);

        state.reset(pages(2));
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.len(), 2);

        state.reset(Vec::new());
        assert!(state.is_empty());
        assert_eq!(state.current(), None);
    }

    #[test]
    fn next_and_previous_stop_at_the_ends() {
        let mut state = Pagination::new();
        state.reset(pages(2));

        assert!(!state.previous());
        assert_eq!(state.current_index(), 0);
        assert!(state.next());
        assert!(!state.next());
        assert_eq!(state.current_index(), 1);
        assert!(!state.has_next());
        assert!(state.has_previous());
    }

    #[test]
    fn navigation_on_empty_state_does_nothing() {
        let mut state = Pagination::new();
        assert!(!state.next());
        assert!(!state.previous());
        assert!(!state.go_to(0));
        assert_eq!(state.position(), None);
        assert_eq!(state.view().label, "No pages");
    }

    #[test]
    fn typed_page_numbers_are_one_based() {
        let mut state = Pagination::new();
        state.reset(pages(3));

        assert!(state.go_to_input(" 3 "));
        assert_eq!(state.current_index(), 2);

        for junk in ["", "abc", "0", "4", "-2", "1.5"] {
            assert!(!state.go_to_input(junk));
            assert_eq!(state.current_index(), 2);
        }
    }

    #[test]
    fn view_describes_position() {
        let mut state = Pagination::new();
        state.reset(pages(1));
        let view = state.view();
        assert_eq!(view.label, "Page 1 of 1");
        assert_eq!(view.page_number, 1);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.current_page.as_deref(), Some("<svg>0</svg>"));
    }
}
