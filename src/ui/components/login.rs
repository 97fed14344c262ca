use crate::session_token;
use crate::ui::{AppContext, Route};
use dioxus::prelude::*;
use tracing::warn;

/// Login page: exchanges credentials for a session token and persists it
#[component]
pub fn Login() -> Element {
    let context = use_context::<AppContext>();
    let navigator = navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut submitting = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let on_submit = move |event: Event<FormData>| {
        event.prevent_default();
        let api = context.api.clone();

        spawn(async move {
            submitting.set(true);
            error.set(None);

            match api.login(&email(), &password()).await {
                Ok(response) => {
                    if let Some(token) = response.token.as_deref() {
                        if let Err(e) = session_token::store_session_token(token) {
                            warn!("Could not persist session token: {}", e);
                        }
                    }
                    navigator.push(Route::Trails {});
                }
                Err(e) => {
                    error.set(Some(format!("Login failed: {}", e)));
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        div { class: "max-w-md mx-auto mt-16 bg-gray-800 rounded-lg p-8",
            h1 { class: "text-2xl font-bold text-white mb-6", "Sign in" }

            if let Some(err) = error() {
                div { class: "bg-red-900 border border-red-700 text-red-100 px-4 py-3 rounded mb-4",
                    p { "{err}" }
                }
            }

            form { onsubmit: on_submit,
                label { class: "block text-sm text-gray-400 mb-1", "Email" }
                input {
                    class: "w-full bg-gray-900 rounded px-3 py-2 mb-4 text-gray-100",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |event| email.set(event.value()),
                }

                label { class: "block text-sm text-gray-400 mb-1", "Password" }
                input {
                    class: "w-full bg-gray-900 rounded px-3 py-2 mb-6 text-gray-100",
                    r#type: "password",
                    autocomplete: "current-password",
                    value: "{password}",
                    oninput: move |event| password.set(event.value()),
                }

                button {
                    class: if submitting() {
                        "w-full px-4 py-2 bg-blue-600 rounded opacity-50"
                    } else {
                        "w-full px-4 py-2 bg-blue-600 rounded hover:bg-blue-500"
                    },
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
            }
        }
    }
}
