use crate::api::models::Trail;
use crate::ui::{AppContext, Route};
use dioxus::prelude::*;
use tracing::debug;

/// Trail catalog page
#[component]
pub fn Trails() -> Element {
    debug!("Component rendering");
    let context = use_context::<AppContext>();
    let mut trails = use_signal(Vec::<Trail>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);

    use_effect(move || {
        let api = context.api.clone();
        spawn(async move {
            loading.set(true);
            error.set(None);

            match api.list_trails().await {
                Ok(trail_list) => {
                    trails.set(trail_list);
                    loading.set(false);
                }
                Err(e) => {
                    error.set(Some(format!("Failed to load trails: {}", e)));
                    loading.set(false);
                }
            }
        });
    });

    rsx! {
        div { class: "container mx-auto p-6",
            h1 { class: "text-3xl font-bold text-white mb-6", "Learning Trails" }

            if loading() {
                div { class: "flex justify-center items-center py-12",
                    div { class: "animate-spin rounded-full h-12 w-12 border-b-2 border-blue-500" }
                    p { class: "ml-4 text-gray-300", "Loading trails..." }
                }
            } else if let Some(err) = error() {
                div { class: "bg-red-900 border border-red-700 text-red-100 px-4 py-3 rounded mb-4",
                    p { "{err}" }
                }
            } else if trails().is_empty() {
                div { class: "text-center py-12",
                    h2 { class: "text-2xl font-bold text-gray-300 mb-2", "No trails yet" }
                    p { class: "text-gray-500", "Check back once your platform has published content." }
                }
            } else {
                div { class: "grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-6",
                    for trail in trails() {
                        TrailCard { trail: trail.clone() }
                    }
                }
            }
        }
    }
}

#[component]
fn TrailCard(trail: Trail) -> Element {
    let progress_percent = trail.progress_percent.unwrap_or(0.0);

    rsx! {
        Link {
            to: Route::TrailDetails { trail_id: trail.id },
            class: "block bg-gray-800 rounded-lg overflow-hidden hover:bg-gray-700 transition-colors",
            if let Some(thumbnail) = trail.thumbnail_url.as_ref() {
                img { class: "w-full aspect-video object-cover", src: "{thumbnail}" }
            } else {
                div { class: "w-full aspect-video bg-gray-700" }
            }
            div { class: "p-4",
                div { class: "font-semibold text-gray-100 truncate", "{trail.name}" }
                if let Some(author) = trail.author.as_ref() {
                    div { class: "text-sm text-gray-400", "{author}" }
                }
                if trail.progress_percent.is_some() {
                    div { class: "mt-2 h-1.5 bg-gray-600 rounded",
                        div {
                            class: "h-1.5 bg-blue-500 rounded",
                            style: "width: {progress_percent.clamp(0.0, 100.0)}%",
                        }
                    }
                }
            }
        }
    }
}
