//! GTK 4 widgets for picking an installed application: a selection dialog,
//! a button that opens it, and a combo box. All three narrow the list of
//! applications reported by the desktop registry with the same criteria:
//! supported MIME types plus a substring or regex term matched against the
//! display name.

extern crate gtk4 as gtk;

mod button;
mod combo;
mod dialog;
mod entry;
mod error;
mod filter;
mod registry;

pub use button::AppChooserButton;
pub use combo::AppChooserComboBox;
pub use dialog::AppChooserDialog;
pub use entry::AppEntry;
pub use error::ChooserError;
pub use filter::{AppRecord, Filter};
pub use registry::{icon_name, installed_apps};

pub(crate) const PLACEHOLDER_LABEL: &str = "(Choose An App)";
pub(crate) const SEARCH_ICON: &str = "system-search-symbolic";
pub(crate) const MISSING_ICON: &str = "image-missing";
pub(crate) const ROW_ICON_SIZE: i32 = 16;
