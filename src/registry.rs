//! The only surface touching the host desktop's application registry.

use gtk::gio::AppInfo;
use gtk::prelude::*;

use crate::entry::AppEntry;

/// Every application the registry reports as installed, in registry order.
///
/// One-shot synchronous query; call again to refresh.
pub fn installed_apps() -> Vec<AppEntry> {
    AppInfo::all().into_iter().map(AppEntry::new).collect()
}

/// A displayable icon identifier for `app`, or the standard missing-icon
/// name when the registry reports none.
pub fn icon_name(app: &AppInfo) -> String {
    app.icon()
        .and_then(|icon| IconExt::to_string(&icon))
        .map(Into::into)
        .unwrap_or_else(|| crate::MISSING_ICON.to_owned())
}
