use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use itertools::Itertools;
use log::warn;
use regex::Regex;

use crate::error::ChooserError;

/// Anything with a display name and a set of supported content types.
pub trait AppRecord {
    fn display_name(&self) -> &str;
    fn supported_types(&self) -> &[String];
}

/// Criteria for narrowing the installed-application list.
///
/// The term matches the display name as a case-insensitive substring; with
/// regex mode on, an unanchored regex search over the display name also
/// qualifies. A wanted MIME type matches a supported "type/subtype" string
/// exactly or at its top-level part, so wanting "image" accepts an
/// application declaring "image/png". Both criteria must pass.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    mime_types: BTreeSet<String>,
    term: String,
    use_regex: bool,
    pattern: Option<Regex>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mime_types(&self) -> Vec<String> {
        self.mime_types.iter().cloned().collect()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn use_regex(&self) -> bool {
        self.use_regex
    }

    /// Replace the MIME-type set. Duplicates collapse; each entry must be
    /// `type` or `type/subtype` with non-empty, whitespace-free parts.
    pub fn set_mime_types<I>(&mut self, types: I) -> Result<(), ChooserError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut accepted = BTreeSet::new();
        for mime_type in types {
            let mime_type = mime_type.as_ref();
            if !is_valid_mime(mime_type) {
                return Err(ChooserError::InvalidMimeType(mime_type.to_owned()));
            }
            accepted.insert(mime_type.to_owned());
        }
        self.mime_types = accepted;
        Ok(())
    }

    /// Replace the filter term. With regex mode on, the term must compile.
    pub fn set_term(&mut self, term: &str) -> Result<(), ChooserError> {
        let pattern = if self.use_regex && !term.is_empty() {
            Some(Regex::new(term)?)
        } else {
            None
        };
        self.term = term.to_owned();
        self.pattern = pattern;
        Ok(())
    }

    /// Switch between substring and regex interpretation of the term.
    /// Enabling regex mode compiles the current term immediately.
    pub fn set_use_regex(&mut self, use_regex: bool) -> Result<(), ChooserError> {
        self.pattern = if use_regex && !self.term.is_empty() {
            Some(Regex::new(&self.term)?)
        } else {
            None
        };
        self.use_regex = use_regex;
        Ok(())
    }

    /// Whether a single candidate passes both the term and MIME criteria.
    pub fn matches(&self, record: &impl AppRecord) -> bool {
        self.matches_term(record.display_name()) && self.matches_mime(record.supported_types())
    }

    /// The ordered subsequence of `candidates` to display: sorted by display
    /// name ascending, then narrowed by the criteria. The input is left
    /// untouched; every call recomputes from the full candidate list.
    pub fn select<'a, R: AppRecord>(&self, candidates: &'a [R]) -> Vec<&'a R> {
        candidates
            .iter()
            .sorted_by(|a, b| a.display_name().cmp(b.display_name()))
            .filter(|record| self.matches(*record))
            .collect()
    }

    fn matches_term(&self, name: &str) -> bool {
        if self.term.is_empty() {
            return true;
        }
        if name.to_lowercase().contains(&self.term.to_lowercase()) {
            return true;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(name),
            None => false,
        }
    }

    fn matches_mime(&self, supported: &[String]) -> bool {
        if self.mime_types.is_empty() {
            return true;
        }
        self.mime_types.iter().any(|wanted| {
            supported
                .iter()
                .any(|full| full == wanted || top_level(full) == wanted)
        })
    }
}

fn top_level(mime_type: &str) -> &str {
    mime_type.split('/').next().unwrap_or(mime_type)
}

fn is_valid_mime(mime_type: &str) -> bool {
    let ok_part = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
    let mut parts = mime_type.splitn(2, '/');
    let toplevel = parts.next().unwrap_or("");
    match parts.next() {
        Some(subtype) => ok_part(toplevel) && ok_part(subtype),
        None => ok_part(toplevel),
    }
}

/// Interior-mutable criteria holder shared by the three widgets: every
/// update validates, and the criteria freeze once the widget has been shown.
/// A frozen setter still rejects bad values but changes nothing.
#[derive(Default)]
pub(crate) struct CriteriaCell {
    filter: RefCell<Filter>,
    frozen: Cell<bool>,
}

impl CriteriaCell {
    pub fn snapshot(&self) -> Filter {
        self.filter.borrow().clone()
    }

    pub fn replace(&self, filter: Filter) {
        *self.filter.borrow_mut() = filter;
    }

    pub fn mime_types(&self) -> Vec<String> {
        self.filter.borrow().mime_types()
    }

    pub fn term(&self) -> String {
        self.filter.borrow().term().to_owned()
    }

    pub fn use_regex(&self) -> bool {
        self.filter.borrow().use_regex()
    }

    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    pub fn set_mime_types<I>(&self, types: I) -> Result<(), ChooserError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.commit("MIME types", |filter| filter.set_mime_types(types))
    }

    pub fn set_term(&self, term: &str) -> Result<(), ChooserError> {
        self.commit("filter term", |filter| filter.set_term(term))
    }

    pub fn set_use_regex(&self, use_regex: bool) -> Result<(), ChooserError> {
        self.commit("regex mode", |filter| filter.set_use_regex(use_regex))
    }

    /// Term updates from the dialog's own entry, which stays live after the
    /// dialog is shown.
    pub fn set_term_unfrozen(&self, term: &str) -> Result<(), ChooserError> {
        self.filter.borrow_mut().set_term(term)
    }

    fn commit<F>(&self, what: &str, apply: F) -> Result<(), ChooserError>
    where
        F: FnOnce(&mut Filter) -> Result<(), ChooserError>,
    {
        let mut updated = self.filter.borrow().clone();
        apply(&mut updated)?;
        if self.frozen.get() {
            warn!("ignoring {what} update: widget has already been shown");
            return Ok(());
        }
        *self.filter.borrow_mut() = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestApp {
        name: &'static str,
        types: Vec<String>,
    }

    fn app(name: &'static str, types: &[&str]) -> TestApp {
        TestApp {
            name,
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    impl AppRecord for TestApp {
        fn display_name(&self) -> &str {
            self.name
        }

        fn supported_types(&self) -> &[String] {
            &self.types
        }
    }

    fn names(selected: &[&TestApp]) -> Vec<&'static str> {
        selected.iter().map(|app| app.name).collect()
    }

    #[test]
    fn empty_criteria_keep_everything_sorted() {
        let apps = [
            app("Shotwell", &[]),
            app("Chromium", &["text/html"]),
            app("Firefox", &["text/html"]),
        ];
        let filter = Filter::new();
        assert_eq!(
            names(&filter.select(&apps)),
            ["Chromium", "Firefox", "Shotwell"]
        );
    }

    #[test]
    fn toplevel_mime_matches_specific_subtypes() {
        let apps = [
            app("Image Viewer", &["image/png"]),
            app("Editor", &["text/plain"]),
            app("Browser", &["text/html"]),
        ];
        let mut filter = Filter::new();
        filter.set_mime_types(["text"]).unwrap();
        assert_eq!(names(&filter.select(&apps)), ["Browser", "Editor"]);
    }

    #[test]
    fn exact_mime_does_not_generalize_the_wanted_type() {
        let apps = [
            app("Image Viewer", &["image/png"]),
            app("Scanner", &["image/tiff"]),
        ];
        let mut filter = Filter::new();
        filter.set_mime_types(["image/png"]).unwrap();
        assert_eq!(names(&filter.select(&apps)), ["Image Viewer"]);
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let apps = [app("Firefox", &[]), app("Chromium", &[])];
        let mut filter = Filter::new();
        filter.set_term("fire").unwrap();
        assert_eq!(names(&filter.select(&apps)), ["Firefox"]);
    }

    #[test]
    fn regex_search_is_unanchored_but_honors_anchors() {
        let apps = [app("GitHub Desktop", &[]), app("Legit App", &[])];
        let mut filter = Filter::new();
        filter.set_use_regex(true).unwrap();
        filter.set_term("^Git").unwrap();
        assert_eq!(names(&filter.select(&apps)), ["GitHub Desktop"]);
    }

    #[test]
    fn regex_mode_still_accepts_case_insensitive_substrings() {
        let apps = [app("GitHub Desktop", &[])];
        let mut filter = Filter::new();
        filter.set_use_regex(true).unwrap();
        filter.set_term("github").unwrap();
        assert_eq!(names(&filter.select(&apps)), ["GitHub Desktop"]);
    }

    #[test]
    fn term_and_mime_criteria_are_conjunctive() {
        let apps = [
            app("Firefox", &["text/html"]),
            app("File Roller", &["application/zip"]),
            app("Chromium", &["text/html"]),
        ];
        let mut filter = Filter::new();
        filter.set_term("fi").unwrap();
        filter.set_mime_types(["text"]).unwrap();
        assert_eq!(names(&filter.select(&apps)), ["Firefox"]);
    }

    #[test]
    fn select_is_idempotent_and_leaves_input_alone() {
        let apps = [
            app("Zed", &["text/plain"]),
            app("Atom", &["text/plain"]),
        ];
        let mut filter = Filter::new();
        filter.set_mime_types(["text"]).unwrap();
        let first = names(&filter.select(&apps));
        let second = names(&filter.select(&apps));
        assert_eq!(first, second);
        assert_eq!(apps[0].name, "Zed");
    }

    #[test]
    fn mime_set_deduplicates() {
        let mut filter = Filter::new();
        filter
            .set_mime_types(["text", "image", "text"])
            .unwrap();
        assert_eq!(filter.mime_types(), ["image", "text"]);
    }

    #[test]
    fn malformed_mime_values_are_rejected() {
        let mut filter = Filter::new();
        for bad in ["", "text/", "/plain", "not a type", "a/b c"] {
            let err = filter.set_mime_types([bad]).unwrap_err();
            assert!(matches!(err, ChooserError::InvalidMimeType(_)), "{bad:?}");
        }
        assert!(filter.set_mime_types(["text", "image/png"]).is_ok());
    }

    #[test]
    fn bad_pattern_fails_when_regex_mode_is_on() {
        let mut filter = Filter::new();
        filter.set_term("(").unwrap();
        assert!(matches!(
            filter.set_use_regex(true),
            Err(ChooserError::InvalidPattern(_))
        ));

        let mut filter = Filter::new();
        filter.set_use_regex(true).unwrap();
        assert!(matches!(
            filter.set_term("("),
            Err(ChooserError::InvalidPattern(_))
        ));
    }

    #[test]
    fn empty_term_in_regex_mode_keeps_everything() {
        let apps = [app("Firefox", &[]), app("Chromium", &[])];
        let mut filter = Filter::new();
        filter.set_use_regex(true).unwrap();
        assert_eq!(filter.select(&apps).len(), 2);
    }

    #[test]
    fn frozen_criteria_ignore_updates_but_still_validate() {
        let criteria = CriteriaCell::default();
        criteria.set_term("fire").unwrap();
        criteria.freeze();

        criteria.set_term("chrom").unwrap();
        assert_eq!(criteria.term(), "fire");

        assert!(criteria.set_mime_types(["not a type"]).is_err());
        assert!(criteria.mime_types().is_empty());
    }

    #[test]
    fn dialog_entry_updates_bypass_the_freeze() {
        let criteria = CriteriaCell::default();
        criteria.freeze();
        criteria.set_term_unfrozen("fire").unwrap();
        assert_eq!(criteria.term(), "fire");
    }
}
