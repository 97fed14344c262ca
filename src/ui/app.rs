use dioxus::desktop::{Config as DioxusConfig, WindowBuilder};
use dioxus::prelude::*;

use crate::ui::components::*;

pub const MAIN_CSS: Asset = asset!("/assets/main.css");
pub const TAILWIND_CSS: Asset = asset!("/assets/tailwind.css");

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Navbar)]
    #[route("/")]
    Trails {},
    #[route("/login")]
    Login {},
    #[route("/trails/:trail_id")]
    TrailDetails { trail_id: i64 },
    #[route("/trails/:trail_id/items/:item_id")]
    Lesson { trail_id: i64, item_id: i64 },
    #[route("/certificate/:cert_hash")]
    CertificateView { cert_hash: String },
}

pub fn make_config() -> DioxusConfig {
    DioxusConfig::default().with_window(make_window())
}

fn make_window() -> WindowBuilder {
    WindowBuilder::new()
        .with_title("trilha")
        .with_always_on_top(false)
        .with_inner_size(dioxus::desktop::LogicalSize::new(1280, 800))
}
