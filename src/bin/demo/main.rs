extern crate gtk4 as gtk;

use gtk::prelude::*;

use log::warn;
use relm4::{send, AppUpdate, Model, RelmApp, Sender, WidgetPlus, Widgets};

use app_chooser::{AppChooserButton, AppChooserComboBox, AppChooserDialog, ChooserError};

mod config;

use config::Config;

struct AppModel {
    status: String,
}

enum AppMsg {
    Chosen(&'static str, Option<String>),
}

impl Model for AppModel {
    type Msg = AppMsg;
    type Widgets = AppWidgets;
    type Components = ();
}

impl AppUpdate for AppModel {
    fn update(&mut self, msg: AppMsg, _components: &(), _sender: Sender<AppMsg>) -> bool {
        match msg {
            AppMsg::Chosen(source, Some(name)) => {
                self.status = format!("{source}: {name}");
            }
            AppMsg::Chosen(source, None) => {
                self.status = format!("{source}: no selection");
            }
        }
        true
    }
}

#[relm4::widget]
impl Widgets<AppModel, ()> for AppWidgets {
    view! {
        gtk::ApplicationWindow {
            set_title: Some("Application Chooser Demo"),
            set_default_width: 350,
            set_icon_name: Some("system-search-symbolic"),
            set_child = Some(&gtk::Box) {
                set_orientation: gtk::Orientation::Vertical,
                set_margin_all: 8,
                set_spacing: 8,
                append = &gtk::Button {
                    set_label: "Show Dialog",
                    connect_clicked(sender) => move |button| {
                        show_dialog(button, sender.clone());
                    },
                },
                append: &chooser_button(&sender),
                append: &chooser_combo(&sender),
                append = &gtk::Label {
                    set_xalign: 0.0,
                    set_label: watch! { &model.status },
                },
            }
        }
    }
}

fn show_dialog(button: &gtk::Button, sender: Sender<AppMsg>) {
    let config = Config::get();
    let dialog = AppChooserDialog::new();
    log_rejected(dialog.set_mime_types(&config.mime_types));
    log_rejected(dialog.set_use_regex(config.use_regex));
    log_rejected(dialog.set_filter_term(&config.filter_term));

    let parent = button
        .root()
        .and_then(|root| root.downcast::<gtk::Window>().ok());
    dialog.set_transient_for(parent.as_ref());

    dialog.run_async(move |app| {
        send!(
            sender,
            AppMsg::Chosen("dialog", app.map(|app| app.display_name().to_string()))
        );
    });
}

fn chooser_button(sender: &Sender<AppMsg>) -> gtk::Button {
    let config = Config::get();
    let button = AppChooserButton::new();
    log_rejected(button.set_mime_types(&config.mime_types));
    log_rejected(button.set_use_regex(config.use_regex));
    log_rejected(button.set_filter_term(&config.filter_term));

    let sender = sender.clone();
    button.connect_app_selected(move |app| {
        send!(
            sender,
            AppMsg::Chosen("button", app.map(|app| app.display_name().to_string()))
        );
    });
    button.into_widget()
}

fn chooser_combo(sender: &Sender<AppMsg>) -> gtk::ComboBox {
    let config = Config::get();
    let combo = AppChooserComboBox::new();
    log_rejected(combo.set_mime_types(&config.mime_types));
    log_rejected(combo.set_use_regex(config.use_regex));
    log_rejected(combo.set_filter_term(&config.filter_term));

    let sender = sender.clone();
    combo.connect_app_selected(move |app| {
        send!(
            sender,
            AppMsg::Chosen("combo box", app.map(|app| app.display_name().to_string()))
        );
    });
    combo.into_widget()
}

fn log_rejected(result: Result<(), ChooserError>) {
    if let Err(err) = result {
        warn!("config value rejected: {err}");
    }
}

fn main() {
    env_logger::init();

    let model = AppModel {
        status: "no selection".into(),
    };
    let app = RelmApp::new(model);
    app.run();
}
