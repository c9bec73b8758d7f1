//! HTML backend abstraction used by the extractors

/// Trait representing an HTML element that can be queried with CSS selectors
///
/// The extractors only talk to markup through this trait, so they do not
/// depend on how a particular parser exposes its tree.
pub trait ElementRef {
    /// Select the first descendant matching the CSS selector
    ///
    /// Returns `None` if no element matches or if the selector is invalid.
    fn select_one(&self, selector: &str) -> Option<Self>
    where
        Self: Sized;

    /// Select all descendants matching the CSS selector
    ///
    /// Returns an empty vector if no elements match or if the selector is invalid.
    fn select_all(&self, selector: &str) -> Vec<Self>
    where
        Self: Sized;

    /// Get the raw text content of this element, including descendants
    fn text(&self) -> String;

    /// Get the text content with every whitespace run collapsed to one space
    /// and the ends trimmed
    fn stripped_text(&self) -> String {
        collapse_whitespace(&self.text())
    }

    /// Get the value of an HTML attribute
    ///
    /// Returns `None` if the attribute doesn't exist.
    fn attr(&self, name: &str) -> Option<&str>;
}

impl<'a> ElementRef for scraper::ElementRef<'a> {
    fn select_one(&self, selector: &str) -> Option<Self> {
        let selector = scraper::Selector::parse(selector).ok()?;
        self.select(&selector).next()
    }

    fn select_all(&self, selector: &str) -> Vec<Self> {
        let selector = match scraper::Selector::parse(selector) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        self.select(&selector).collect()
    }

    fn text(&self) -> String {
        // Join text nodes with a space so adjacent block elements don't glue
        // their words together.
        let mut out = String::new();
        for chunk in scraper::ElementRef::text(self) {
            out.push_str(chunk);
            out.push(' ');
        }
        out
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
