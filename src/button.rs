use std::cell::RefCell;
use std::rc::Rc;

use gtk::gio::AppInfo;
use gtk::glib;
use gtk::pango;
use gtk::prelude::*;

use relm4::view;

use crate::dialog::AppChooserDialog;
use crate::error::ChooserError;
use crate::filter::CriteriaCell;

type SelectedHandler = Box<dyn Fn(Option<&AppInfo>)>;

/// Button that opens an [`AppChooserDialog`] and mirrors its result.
///
/// While nothing is selected the button shows a search icon and a
/// placeholder label; after the dialog closes it shows the chosen
/// application's icon and name, and observers registered through
/// [`connect_app_selected`](Self::connect_app_selected) are notified.
pub struct AppChooserButton {
    button: gtk::Button,
    state: Rc<State>,
}

struct State {
    criteria: CriteriaCell,
    selected: RefCell<Option<AppInfo>>,
    handlers: RefCell<Vec<SelectedHandler>>,
    icon: gtk::Image,
    label: gtk::Label,
}

impl AppChooserButton {
    pub fn new() -> Self {
        let icon = gtk::Image::builder()
            .icon_name(crate::SEARCH_ICON)
            .pixel_size(crate::ROW_ICON_SIZE)
            .build();
        icon.set_margin_start(2);

        view! {
            label = gtk::Label {
                set_label: crate::PLACEHOLDER_LABEL,
                set_hexpand: true,
                set_halign: gtk::Align::Start,
                set_ellipsize: pango::EllipsizeMode::End,
            }
        }

        let open_icon = gtk::Image::builder()
            .icon_name("document-open-symbolic")
            .pixel_size(crate::ROW_ICON_SIZE)
            .build();

        view! {
            content = gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 4,
                append: &icon,
                append: &label,
                append: &open_icon,
            }
        }

        let button = gtk::Button::new();
        button.set_child(Some(&content));

        let state = Rc::new(State {
            criteria: CriteriaCell::default(),
            selected: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
            icon,
            label,
        });

        button.connect_clicked(glib::clone!(@strong state => move |button| {
            show_dialog(button, &state);
        }));

        Self { button, state }
    }

    pub fn widget(&self) -> &gtk::Button {
        &self.button
    }

    pub fn into_widget(self) -> gtk::Button {
        self.button
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

    /// The application chosen when the dialog last closed, if any.
    pub fn selected_app(&self) -> Option<AppInfo> {
        self.state.selected.borrow().clone()
    }

    /// Restrict the dialog's list to applications supporting one of
    /// `types`. Ignored (with a warning) once the button has been used.
    pub fn set_mime_types<I>(&self, types: I) -> Result<(), ChooserError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.state.criteria.set_mime_types(types)
    }

    /// Seed the dialog's display-name filter. Ignored (with a warning) once
    /// the button has been used.
    pub fn set_filter_term(&self, term: &str) -> Result<(), ChooserError> {
        self.state.criteria.set_term(term)
    }

    /// Interpret the filter term as a regex in addition to the substring
    /// match. Ignored (with a warning) once the button has been used.
    pub fn set_use_regex(&self, use_regex: bool) -> Result<(), ChooserError> {
        self.state.criteria.set_use_regex(use_regex)
    }

    /// Register `handler` to run with the new selection (or `None`) each
    /// time the dialog closes.
    pub fn connect_app_selected<F>(&self, handler: F)
    where
        F: Fn(Option<&AppInfo>) + 'static,
    {
        self.state.handlers.borrow_mut().push(Box::new(handler));
    }
}

impl Default for AppChooserButton {
    fn default() -> Self {
        Self::new()
    }
}

fn show_dialog(button: &gtk::Button, state: &Rc<State>) {
    state.criteria.freeze();

    let dialog = AppChooserDialog::new();
    dialog.seed_criteria(state.criteria.snapshot());
    let parent = button
        .root()
        .and_then(|root| root.downcast::<gtk::Window>().ok());
    dialog.set_transient_for(parent.as_ref());

    let state = state.clone();
    dialog.run_async(move |app| apply_selection(&state, app));
}

fn apply_selection(state: &State, app: Option<AppInfo>) {
    match &app {
        Some(app) => {
            match app.icon() {
                Some(icon) => state.icon.set_from_gicon(&icon),
                None => state.icon.set_from_icon_name(Some(crate::MISSING_ICON)),
            }
            state.label.set_label(&app.display_name());
        }
        None => {
            state.icon.set_from_icon_name(Some(crate::SEARCH_ICON));
            state.label.set_label(crate::PLACEHOLDER_LABEL);
        }
    }
    *state.selected.borrow_mut() = app;

    let selected = state.selected.borrow();
    for handler in state.handlers.borrow().iter() {
        handler(selected.as_ref());
    }
}
