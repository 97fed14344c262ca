use crate::session_token;
use crate::ui::{AppContext, Route};
use dioxus::prelude::*;
use tracing::warn;

/// Layout component: top navigation plus the routed page
#[component]
pub fn Navbar() -> Element {
    let context = use_context::<AppContext>();
    let navigator = navigator();

    let on_logout = move |_| {
        let api = context.api.clone();
        spawn(async move {
            if let Err(e) = api.logout().await {
                warn!("Logout failed: {}", e);
            }
            if let Err(e) = session_token::clear_session_token() {
                warn!("Could not clear session token: {}", e);
            }
            navigator.push(Route::Login {});
        });
    };

    rsx! {
        div { class: "min-h-screen flex flex-col bg-gray-950 text-gray-100",
            header { class: "flex items-center gap-6 px-6 py-3 border-b border-gray-800",
                Link { to: Route::Trails {}, class: "font-bold text-lg", "trilha" }
                Link {
                    to: Route::Trails {},
                    class: "text-sm text-gray-400 hover:text-gray-200",
                    "Trails"
                }
                div { class: "flex-1" }
                button {
                    class: "text-sm text-gray-400 hover:text-gray-200",
                    onclick: on_logout,
                    "Sign out"
                }
            }
            div { class: "flex-1",
                Outlet::<Route> {}
            }
        }
    }
}
