use std::cell::RefCell;
use std::rc::Rc;

use gtk::gio::AppInfo;
use gtk::glib;
use gtk::prelude::*;

use log::debug;

use crate::entry::AppEntry;
use crate::error::ChooserError;
use crate::filter::{CriteriaCell, Filter};
use crate::registry;

/// Dialog for selecting an installed application.
///
/// Configure the criteria, then hand the dialog to [`run_async`] or
/// [`run_future`]; the chosen [`AppInfo`] (or `None` on cancellation) is
/// delivered when the dialog closes. Double-activating a row confirms it,
/// and the filter entry at the top live-refilters the list.
///
/// [`run_async`]: Self::run_async
/// [`run_future`]: Self::run_future
pub struct AppChooserDialog {
    dialog: gtk::Dialog,
    state: Rc<State>,
}

struct State {
    criteria: CriteriaCell,
    apps: RefCell<Vec<AppEntry>>,
    visible: RefCell<Vec<AppEntry>>,
    selected: RefCell<Option<AppEntry>>,
    list: gtk::ListBox,
    filter_entry: gtk::Entry,
}

impl AppChooserDialog {
    pub fn new() -> Self {
        let dialog = gtk::Dialog::new();
        dialog.set_title(Some("Choose An Application"));
        dialog.set_default_size(350, 400);
        dialog.set_icon_name(Some(crate::SEARCH_ICON));
        dialog.set_modal(true);

        let filter_label = gtk::Label::new(Some("Filter Term:"));
        let filter_entry = gtk::Entry::new();
        filter_entry.set_hexpand(true);
        let clear_button = gtk::Button::builder()
            .icon_name("edit-clear-symbolic")
            .build();

        let filter_box = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        filter_box.append(&filter_label);
        filter_box.append(&filter_entry);
        filter_box.append(&clear_button);

        let list = gtk::ListBox::new();
        list.set_vexpand(true);

        let scroller = gtk::ScrolledWindow::new();
        scroller.set_child(Some(&list));

        let frame = gtk::Frame::new(None);
        frame.set_child(Some(&scroller));

        let content = dialog.content_area();
        content.set_margin_start(8);
        content.set_margin_end(8);
        content.set_margin_top(8);
        content.set_margin_bottom(8);
        content.set_spacing(8);
        content.append(&filter_box);
        content.append(&frame);

        dialog.add_button("_Cancel", gtk::ResponseType::Cancel);
        dialog.add_button("_Select", gtk::ResponseType::Ok);

        let state = Rc::new(State {
            criteria: CriteriaCell::default(),
            apps: RefCell::new(Vec::new()),
            visible: RefCell::new(Vec::new()),
            selected: RefCell::new(None),
            list,
            filter_entry: filter_entry.clone(),
        });

        filter_entry.connect_changed(glib::clone!(@strong state => move |entry| {
            let text = entry.text();
            if let Err(err) = state.criteria.set_term_unfrozen(&text) {
                debug!("ignoring filter term {:?}: {}", text.as_str(), err);
                return;
            }
            refilter(&state);
        }));

        clear_button.connect_clicked(glib::clone!(@strong state => move |_| {
            state.filter_entry.set_text("");
        }));

        state
            .list
            .connect_row_selected(glib::clone!(@strong state => move |_, row| {
                let selected = row.and_then(|row| {
                    state.visible.borrow().get(row.index() as usize).cloned()
                });
                *state.selected.borrow_mut() = selected;
            }));

        state
            .list
            .connect_row_activated(glib::clone!(@strong dialog => move |_, _| {
                dialog.response(gtk::ResponseType::Ok);
            }));

        Self { dialog, state }
    }

    pub fn widget(&self) -> &gtk::Dialog {
        &self.dialog
    }

    pub fn set_transient_for(&self, parent: Option<&gtk::Window>) {
        self.dialog.set_transient_for(parent);
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

    /// The application currently highlighted in the list, if any.
    pub fn selected_app(&self) -> Option<AppInfo> {
        self.state
            .selected
            .borrow()
            .as_ref()
            .map(|entry| entry.info.clone())
    }

    /// Restrict the list to applications supporting one of `types`.
    /// Ignored (with a warning) once the dialog has been shown.
    pub fn set_mime_types<I>(&self, types: I) -> Result<(), ChooserError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.state.criteria.set_mime_types(types)
    }

    /// Seed the display-name filter. Ignored (with a warning) once the
    /// dialog has been shown; afterwards the in-dialog entry takes over.
    pub fn set_filter_term(&self, term: &str) -> Result<(), ChooserError> {
        self.state.criteria.set_term(term)
    }

    /// Interpret the filter term as a regex in addition to the substring
    /// match. Ignored (with a warning) once the dialog has been shown.
    pub fn set_use_regex(&self, use_regex: bool) -> Result<(), ChooserError> {
        self.state.criteria.set_use_regex(use_regex)
    }

    pub(crate) fn seed_criteria(&self, filter: Filter) {
        self.state.criteria.replace(filter);
    }

    /// Show the dialog and hand the chosen application (or `None` on
    /// cancellation) to `callback` once it closes.
    pub fn run_async<F>(self, callback: F)
    where
        F: FnOnce(Option<AppInfo>) + 'static,
    {
        self.populate();
        let Self { dialog, state } = self;
        dialog.run_async(move |dialog, response| {
            dialog.destroy();
            callback(chosen(&state, response));
        });
    }

    /// Like [`run_async`](Self::run_async), for async callers.
    pub async fn run_future(self) -> Option<AppInfo> {
        self.populate();
        let Self { dialog, state } = self;
        let response = dialog.run_future().await;
        dialog.destroy();
        chosen(&state, response)
    }

    fn populate(&self) {
        self.state.criteria.freeze();
        *self.state.apps.borrow_mut() = registry::installed_apps();

        let term = self.state.criteria.term();
        if term.is_empty() {
            refilter(&self.state);
        } else {
            // fires the changed handler, which refilters
            self.state.filter_entry.set_text(&term);
        }
    }
}

impl Default for AppChooserDialog {
    fn default() -> Self {
        Self::new()
    }
}

fn chosen(state: &State, response: gtk::ResponseType) -> Option<AppInfo> {
    match response {
        gtk::ResponseType::Ok => state
            .selected
            .borrow()
            .as_ref()
            .map(|entry| entry.info.clone()),
        _ => None,
    }
}

fn refilter(state: &Rc<State>) {
    let filter = state.criteria.snapshot();
    let apps = state.apps.borrow();
    let visible: Vec<AppEntry> = filter.select(&apps).into_iter().cloned().collect();
    drop(apps);
    *state.visible.borrow_mut() = visible;

    while let Some(child) = state.list.first_child() {
        state.list.remove(&child);
    }
    for entry in state.visible.borrow().iter() {
        state.list.append(&entry.build_row());
    }
}
