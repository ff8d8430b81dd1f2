use std::cell::RefCell;
use std::rc::Rc;

use gtk::gio::AppInfo;
use gtk::glib;
use gtk::prelude::*;

use crate::entry::AppEntry;
use crate::error::ChooserError;
use crate::filter::CriteriaCell;
use crate::registry;

/// Combo box over the filtered application list.
///
/// The first row is always a placeholder; choosing it means "no selection".
/// The widget fills itself when first mapped, or explicitly through
/// [`populate`](Self::populate).
pub struct AppChooserComboBox {
    combo: gtk::ComboBox,
    state: Rc<State>,
}

struct State {
    criteria: CriteriaCell,
    visible: RefCell<Vec<AppEntry>>,
    store: gtk::ListStore,
}

impl AppChooserComboBox {
    pub fn new() -> Self {
        let store = gtk::ListStore::new(&[glib::Type::STRING, glib::Type::STRING]);

        let combo = gtk::ComboBox::with_model(&store);
        let icon_renderer = gtk::CellRendererPixbuf::new();
        combo.pack_start(&icon_renderer, false);
        combo.add_attribute(&icon_renderer, "icon-name", 0);
        let text_renderer = gtk::CellRendererText::new();
        combo.pack_start(&text_renderer, true);
        combo.add_attribute(&text_renderer, "text", 1);

        let state = Rc::new(State {
            criteria: CriteriaCell::default(),
            visible: RefCell::new(Vec::new()),
            store,
        });

        combo.connect_map(glib::clone!(@strong state => move |combo| {
            if !state.criteria.is_frozen() {
                populate(combo, &state);
            }
        }));

        Self { combo, state }
    }

    pub fn widget(&self) -> &gtk::ComboBox {
        &self.combo
    }

    pub fn into_widget(self) -> gtk::ComboBox {
        self.combo
    }

    pub fn mime_types(&self) -> Vec<String> {
        self.state.criteria.mime_types()
    }

    pub fn filter_term(&self) -> String {
        self.state.criteria.term()
    }

    pub fn use_regex(&self) -> bool {
        self.state.criteria.use_regex()
    }

    /// The application on the active row; the placeholder row yields `None`.
    pub fn selected_app(&self) -> Option<AppInfo> {
        let visible = self.state.visible.borrow();
        resolve(&visible, self.combo.active()).map(|entry| entry.info.clone())
    }

    /// Restrict the list to applications supporting one of `types`.
    /// Ignored (with a warning) once the combo box has been populated.
    pub fn set_mime_types<I>(&self, types: I) -> Result<(), ChooserError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.state.criteria.set_mime_types(types)
    }

    /// Seed the display-name filter. Ignored (with a warning) once the
    /// combo box has been populated.
    pub fn set_filter_term(&self, term: &str) -> Result<(), ChooserError> {
        self.state.criteria.set_term(term)
    }

    /// Interpret the filter term as a regex in addition to the substring
    /// match. Ignored (with a warning) once the combo box has been
    /// populated.
    pub fn set_use_regex(&self, use_regex: bool) -> Result<(), ChooserError> {
        self.state.criteria.set_use_regex(use_regex)
    }

    /// Query the registry and rebuild the list, activating the placeholder
    /// row. Runs automatically when the widget is first mapped; calling it
    /// again refreshes the list.
    pub fn populate(&self) {
        populate(&self.combo, &self.state);
    }

    /// Register `handler` to run with the newly active application (or
    /// `None` for the placeholder) whenever the active row changes.
    pub fn connect_app_selected<F>(&self, handler: F)
    where
        F: Fn(Option<&AppInfo>) + 'static,
    {
        let state = self.state.clone();
        self.combo.connect_changed(move |combo| {
            let visible = state.visible.borrow();
            handler(resolve(&visible, combo.active()).map(|entry| &entry.info));
        });
    }
}

impl Default for AppChooserComboBox {
    fn default() -> Self {
        Self::new()
    }
}

fn populate(combo: &gtk::ComboBox, state: &Rc<State>) {
    state.criteria.freeze();

    let apps = registry::installed_apps();
    let filter = state.criteria.snapshot();
    let visible: Vec<AppEntry> = filter.select(&apps).into_iter().cloned().collect();

    state.store.clear();
    let placeholder = state.store.append();
    state.store.set(
        &placeholder,
        &[(0, &crate::SEARCH_ICON), (1, &crate::PLACEHOLDER_LABEL)],
    );
    for entry in &visible {
        let row = state.store.append();
        state
            .store
            .set(&row, &[(0, &entry.icon_name), (1, &entry.display_name)]);
    }
    *state.visible.borrow_mut() = visible;

    combo.set_active(Some(0));
}

/// Map the active row index past the placeholder onto the visible list.
fn resolve<T>(visible: &[T], active: Option<u32>) -> Option<&T> {
    match active {
        Some(0) | None => None,
        Some(i) => visible.get(i as usize - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve;

    #[test]
    fn placeholder_and_empty_rows_yield_no_selection() {
        let visible = ["Firefox", "Shotwell"];
        assert_eq!(resolve(&visible, None), None);
        assert_eq!(resolve(&visible, Some(0)), None);
    }

    #[test]
    fn rows_after_the_placeholder_map_onto_the_visible_list() {
        let visible = ["Firefox", "Shotwell"];
        assert_eq!(resolve(&visible, Some(1)), Some(&"Firefox"));
        assert_eq!(resolve(&visible, Some(2)), Some(&"Shotwell"));
        assert_eq!(resolve(&visible, Some(3)), None);
    }
}
