use dioxus::prelude::*;

use trilha::config::Config;
use trilha::ui::{make_config, Route, MAIN_CSS, TAILWIND_CSS};
use trilha::AppContext;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,trilha=debug".into()),
        )
        .init();

    dioxus::LaunchBuilder::new()
        .with_cfg(make_config())
        .launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(|| AppContext::new(Config::load()));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        document::Link { rel: "stylesheet", href: TAILWIND_CSS }
        Router::<Route> {}
    }
}
