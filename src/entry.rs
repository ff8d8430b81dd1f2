use gtk::gio;
use gtk::gio::AppInfo;
use gtk::pango;
use gtk::prelude::*;

use relm4::view;

use crate::filter::AppRecord;
use crate::registry;

/// One installed application, as reported by the host desktop registry.
///
/// Clones share the underlying [`AppInfo`] reference, so keeping filtered
/// snapshots around is cheap.
#[derive(Clone)]
pub struct AppEntry {
    pub display_name: String,
    pub icon_name: String,
    pub supported_types: Vec<String>,
    pub icon: Option<gio::Icon>,
    pub info: AppInfo,
}

impl AppEntry {
    pub fn new(info: AppInfo) -> Self {
        let supported_types = info
            .supported_types()
            .into_iter()
            .map(Into::into)
            .collect();
        Self {
            display_name: info.display_name().into(),
            icon_name: registry::icon_name(&info),
            supported_types,
            icon: info.icon(),
            info,
        }
    }

    /// A fresh icon-and-name row for list display. Rows are rebuilt on every
    /// refilter rather than cached, so an entry can appear in several lists.
    pub(crate) fn build_row(&self) -> gtk::Box {
        let image = gtk::Image::builder()
            .pixel_size(crate::ROW_ICON_SIZE)
            .build();
        match &self.icon {
            Some(icon) => image.set_from_gicon(icon),
            None => image.set_from_icon_name(Some(crate::MISSING_ICON)),
        }

        view! {
            label = gtk::Label {
                set_xalign: 0.0,
                set_label: &self.display_name,
                set_ellipsize: pango::EllipsizeMode::End,
            }
        }

        view! {
            row = gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 4,
                append: &image,
                append: &label,
            }
        }

        row
    }
}

impl AppRecord for AppEntry {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn supported_types(&self) -> &[String] {
        &self.supported_types
    }
}
