use crate::api::models::{ProgressStatus, Section, Trail, TrailProgress};
use crate::ui::{AppContext, Route};
use dioxus::prelude::*;
use tracing::debug;

/// Trail landing page: description, sections and the enroll/continue action
#[component]
pub fn TrailDetails(trail_id: i64) -> Element {
    let context = use_context::<AppContext>();
    let navigator = navigator();

    let mut trail = use_signal(|| None::<Trail>);
    let mut sections = use_signal(Vec::<Section>::new);
    let mut progress = use_signal(|| None::<TrailProgress>);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);
    let mut enrolling = use_signal(|| false);

    use_effect(move || {
        let api = context.api.clone();
        spawn(async move {
            loading.set(true);
            error.set(None);

            let (trail_result, sections_result, progress_result) = tokio::join!(
                api.trail(trail_id),
                api.sections_with_items(trail_id),
                api.trail_progress(trail_id),
            );

            match trail_result {
                Ok(loaded) => trail.set(Some(loaded)),
                Err(e) => {
                    error.set(Some(format!("Failed to load trail: {}", e)));
                    loading.set(false);
                    return;
                }
            }
            sections.set(sections_result.unwrap_or_default());
            // A learner who never enrolled has no progress record yet.
            progress.set(progress_result.ok());
            loading.set(false);
        });
    });

    let first_item_id = move || {
        sections
            .read()
            .first()
            .and_then(|section| section.items.first())
            .map(|item| item.id)
    };

    let action_label = move || match progress.read().as_ref().and_then(|p| p.status) {
        None => "Enroll",
        Some(ProgressStatus::Completed) => "Review",
        Some(_) => "Continue",
    };

    let on_primary_action = {
        let context = use_context::<AppContext>();
        move |_| {
            let api = context.api.clone();
            let enrolled = progress.read().as_ref().and_then(|p| p.status).is_some();

            if enrolled {
                if let Some(item_id) = first_item_id() {
                    navigator.push(Route::Lesson { trail_id, item_id });
                }
                return;
            }

            spawn(async move {
                enrolling.set(true);
                match api.enroll(trail_id).await {
                    Ok(response) => {
                        if let Some(new_progress) = response.progress {
                            progress.set(Some(new_progress));
                        }
                        let target = response.first_item_id.or_else(first_item_id);
                        if let Some(item_id) = target {
                            navigator.push(Route::Lesson { trail_id, item_id });
                        }
                    }
                    Err(e) => debug!("Enrollment failed: {}", e),
                }
                enrolling.set(false);
            });
        }
    };

    rsx! {
        div { class: "container mx-auto p-6",
            if loading() {
                div { class: "flex justify-center items-center py-12",
                    div { class: "animate-spin rounded-full h-12 w-12 border-b-2 border-blue-500" }
                }
            } else if let Some(err) = error() {
                div { class: "bg-red-900 border border-red-700 text-red-100 px-4 py-3 rounded",
                    p { "{err}" }
                }
            } else if let Some(trail) = trail() {
                div { class: "flex gap-8",
                    div { class: "flex-1",
                        h1 { class: "text-3xl font-bold text-white mb-2", "{trail.name}" }
                        if let Some(author) = trail.author.as_ref() {
                            p { class: "text-gray-400 mb-4", "by {author}" }
                        }
                        if let Some(description) = trail.description.as_ref() {
                            p { class: "text-gray-300 mb-6", "{description}" }
                        }

                        h2 { class: "text-xl font-bold text-white mb-3", "Content" }
                        for section in sections.read().iter() {
                            div { class: "mb-2 bg-gray-800 rounded px-4 py-3",
                                div { class: "font-medium text-gray-200", "{section.title}" }
                                div { class: "text-sm text-gray-500", "{section.items.len()} items" }
                            }
                        }
                    }

                    aside { class: "w-72 shrink-0",
                        if let Some(thumbnail) = trail.thumbnail_url.as_ref() {
                            img { class: "w-full rounded mb-4", src: "{thumbnail}" }
                        }
                        if let Some(p) = progress() {
                            div { class: "text-sm text-gray-400 mb-3",
                                "{p.done} of {p.total} lessons done"
                            }
                        }
                        button {
                            class: if enrolling() {
                                "w-full px-4 py-3 bg-blue-600 rounded opacity-50"
                            } else {
                                "w-full px-4 py-3 bg-blue-600 rounded hover:bg-blue-500"
                            },
                            disabled: enrolling(),
                            onclick: on_primary_action,
                            if enrolling() { "Enrolling..." } else { {action_label()} }
                        }
                    }
                }
            }
        }
    }
}
