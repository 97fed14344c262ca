use crate::api::models::{ItemKind, Section};
use crate::session::WatchState;
use crate::ui::components::session_hooks::{use_lesson_session, LESSON_PLAYER_CONTAINER_ID};
use crate::ui::Route;
use dioxus::prelude::*;
use std::collections::HashSet;

/// Lesson route. Keyed per item so navigating between lessons remounts the
/// view and replaces the underlying session.
#[component]
pub fn Lesson(trail_id: i64, item_id: i64) -> Element {
    rsx! {
        LessonView { key: "{trail_id}:{item_id}", trail_id, item_id }
    }
}

#[component]
fn LessonView(trail_id: i64, item_id: i64) -> Element {
    let lesson = use_lesson_session(trail_id, item_id);
    let mut open_sections = use_signal(HashSet::<i64>::new);

    // Expand the section that holds the current item once the sidebar loads
    {
        let sections = lesson.sections;
        use_effect(move || {
            let section_with_current = sections
                .read()
                .iter()
                .find(|section| section.items.iter().any(|item| item.id == item_id))
                .map(|section| section.id);
            if let Some(section_id) = section_with_current {
                open_sections.write().insert(section_id);
            }
        });
    }

    let loading = lesson.loading;
    let load_error = lesson.load_error;
    let detail = lesson.detail;

    if let Some(message) = load_error() {
        return rsx! {
            div { class: "bg-red-900 border border-red-700 text-red-100 px-4 py-3 rounded m-6",
                p { "Failed to load lesson: {message}" }
            }
        };
    }

    if loading() || detail().is_none() {
        return rsx! {
            div { class: "flex justify-center items-center py-12",
                div { class: "animate-spin rounded-full h-12 w-12 border-b-2 border-blue-500" }
                p { class: "ml-4 text-gray-300", "Loading lesson..." }
            }
        };
    }

    let detail_value = detail().unwrap();
    let progress = lesson.progress;
    let saving = lesson.saving;
    let can_mark_complete = lesson.can_mark_complete;
    let required = detail_value.required_percentage_or_default();

    rsx! {
        div { class: "flex h-full",
            // Sidebar: course content
            aside { class: "w-80 shrink-0 overflow-y-auto border-r border-gray-800 bg-gray-900",
                div { class: "px-4 py-3 border-b border-gray-800",
                    span { class: "font-semibold text-gray-200", "Course content" }
                }
                for section in lesson.sections.read().iter().cloned() {
                    SidebarSection {
                        section: section.clone(),
                        trail_id,
                        current_item_id: item_id,
                        open: open_sections.read().contains(&section.id),
                        on_toggle: move |section_id: i64| {
                            let mut open = open_sections.write();
                            if !open.remove(&section_id) {
                                open.insert(section_id);
                            }
                        },
                    }
                }
            }

            // Main: topbar, player, description, prev/next
            main { class: "flex-1 overflow-y-auto",
                div { class: "flex items-center gap-4 px-6 py-3 border-b border-gray-800",
                    div { class: "font-semibold flex-1", "{detail_value.title}" }

                    if let Some(progress) = progress() {
                        div { class: "text-sm text-gray-400",
                            span { "Your progress: " }
                            span { class: "text-gray-200 font-semibold", "{progress.done}" }
                            span { " of " }
                            span { class: "text-gray-200 font-semibold", "{progress.total}" }
                            span {
                                " ({progress.computed_progress_percent.unwrap_or(0.0).round()}%)"
                            }
                        }
                    }

                    button {
                        class: if can_mark_complete() && !saving() {
                            "px-4 py-2 bg-green-600 rounded hover:bg-green-500"
                        } else {
                            "px-4 py-2 bg-gray-700 rounded opacity-50"
                        },
                        disabled: !can_mark_complete() || saving(),
                        title: if can_mark_complete() {
                            "Mark as complete".to_string()
                        } else {
                            format!("Watch at least {required}% to complete")
                        },
                        onclick: {
                            let handle = lesson.handle.clone();
                            move |_| handle.mark_complete()
                        },
                        if saving() { "Saving..." } else { "Mark as complete" }
                    }

                    Link {
                        to: Route::TrailDetails { trail_id },
                        class: "px-3 py-2 bg-gray-700 rounded hover:bg-gray-600",
                        "✕"
                    }
                }

                div { class: "px-6 py-4",
                    PlayerSurface {
                        watch: lesson.watch,
                        rates: lesson.rates,
                        watched_percent: lesson.watched_percent,
                        on_toggle_play: {
                            let handle = lesson.handle.clone();
                            move |_| handle.toggle_play()
                        },
                        on_seek: {
                            let handle = lesson.handle.clone();
                            move |seconds| handle.seek(seconds)
                        },
                        on_toggle_mute: {
                            let handle = lesson.handle.clone();
                            move |_| handle.toggle_mute()
                        },
                        on_set_volume: {
                            let handle = lesson.handle.clone();
                            move |volume| handle.set_volume(volume)
                        },
                        on_set_rate: {
                            let handle = lesson.handle.clone();
                            move |rate| handle.set_playback_rate(rate)
                        },
                        on_toggle_fullscreen: {
                            let handle = lesson.handle.clone();
                            move |_| handle.toggle_fullscreen()
                        },
                    }
                }

                section { class: "px-6 py-4",
                    h3 { class: "text-xl font-bold mb-3", "About this lesson" }
                    div {
                        class: "text-gray-300",
                        dangerous_inner_html: "{detail_value.description_html}",
                    }
                }

                footer { class: "flex justify-between px-6 py-4",
                    div {
                        if let Some(prev_id) = detail_value.prev_item_id {
                            Link {
                                to: Route::Lesson { trail_id, item_id: prev_id },
                                class: "px-3 py-2 bg-gray-700 rounded hover:bg-gray-600",
                                "← Previous"
                            }
                        }
                    }
                    div {
                        if let Some(next_id) = detail_value.next_item_id {
                            Link {
                                to: Route::Lesson { trail_id, item_id: next_id },
                                class: "px-3 py-2 bg-gray-700 rounded hover:bg-gray-600",
                                "Next →"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SidebarSection(
    section: Section,
    trail_id: i64,
    current_item_id: i64,
    open: bool,
    on_toggle: EventHandler<i64>,
) -> Element {
    let video_count = section
        .items
        .iter()
        .filter(|item| item.kind == Some(ItemKind::Video))
        .count();
    let section_id = section.id;

    rsx! {
        div {
            button {
                class: "w-full flex items-center justify-between px-4 py-3 hover:bg-gray-800",
                onclick: move |_| on_toggle.call(section_id),
                div { class: "text-left",
                    div { class: "font-medium text-gray-200", "{section.title}" }
                    div { class: "text-xs text-gray-500",
                        if video_count > 0 {
                            "{video_count} videos"
                        } else {
                            "{section.items.len()} items"
                        }
                    }
                }
                span { class: "text-gray-500", if open { "▾" } else { "▸" } }
            }
            if open {
                div {
                    for item in section.items.iter().cloned() {
                        Link {
                            to: Route::Lesson { trail_id, item_id: item.id },
                            class: if item.id == current_item_id {
                                "flex items-center justify-between px-6 py-2 bg-gray-800 text-blue-300"
                            } else {
                                "flex items-center justify-between px-6 py-2 hover:bg-gray-800 text-gray-300"
                            },
                            span { class: "truncate", "{item.title}" }
                            if let Some(seconds) = item.duration_seconds.filter(|_| item.kind != Some(ItemKind::Quiz)) {
                                span { class: "text-xs text-gray-500 ml-2", "{format_timestamp(seconds as f64)}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn PlayerSurface(
    watch: ReadOnlySignal<WatchState>,
    rates: ReadOnlySignal<Vec<f64>>,
    watched_percent: ReadOnlySignal<f64>,
    on_toggle_play: EventHandler<()>,
    on_seek: EventHandler<f64>,
    on_toggle_mute: EventHandler<()>,
    on_set_volume: EventHandler<i32>,
    on_set_rate: EventHandler<f64>,
    on_toggle_fullscreen: EventHandler<()>,
) -> Element {
    let state = watch();
    let remaining = (state.duration - state.current).max(0.0);

    rsx! {
        div { class: "bg-black rounded overflow-hidden",
            div { class: "aspect-video relative",
                // The embed is created inside this div by the player backend
                div { id: LESSON_PLAYER_CONTAINER_ID, class: "absolute inset-0 w-full h-full" }
            }

            div { class: "flex items-center gap-3 px-3 py-2 bg-gray-900",
                button {
                    class: "px-3 py-1 bg-gray-700 rounded hover:bg-gray-600",
                    onclick: move |_| on_toggle_play.call(()),
                    if state.is_playing { "⏸" } else { "▶" }
                }

                input {
                    class: "flex-1",
                    r#type: "range",
                    min: "0",
                    max: "{state.duration.floor().max(0.0)}",
                    value: "{state.current.floor()}",
                    oninput: move |event: Event<FormData>| {
                        if let Ok(seconds) = event.value().parse::<f64>() {
                            on_seek.call(seconds);
                        }
                    },
                }

                span { class: "text-sm text-gray-400 w-16 text-right",
                    "-{format_timestamp(remaining)}"
                }

                button {
                    class: "px-2 py-1 bg-gray-700 rounded hover:bg-gray-600",
                    onclick: move |_| on_toggle_mute.call(()),
                    if state.muted { "🔇" } else { "🔊" }
                }

                input {
                    class: "w-24",
                    r#type: "range",
                    min: "0",
                    max: "100",
                    value: "{state.volume}",
                    oninput: move |event: Event<FormData>| {
                        if let Ok(volume) = event.value().parse::<i32>() {
                            on_set_volume.call(volume);
                        }
                    },
                }

                select {
                    class: "bg-gray-700 rounded px-2 py-1",
                    onchange: move |event: Event<FormData>| {
                        if let Ok(rate) = event.value().parse::<f64>() {
                            on_set_rate.call(rate);
                        }
                    },
                    for rate in rates.read().iter() {
                        option {
                            value: "{rate}",
                            selected: *rate == state.playback_rate,
                            "{rate}×"
                        }
                    }
                }

                button {
                    class: "px-2 py-1 bg-gray-700 rounded hover:bg-gray-600",
                    onclick: move |_| on_toggle_fullscreen.call(()),
                    if state.is_fullscreen { "🡽" } else { "⛶" }
                }
            }

            div { class: "px-3 py-1 text-xs text-gray-500 bg-gray-900",
                "Watched {watched_percent():.0}%"
            }
        }
    }
}

fn pad(value: u64) -> String {
    format!("{:02}", value)
}

/// `h:mm:ss` above an hour, `mm:ss` below
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let s = total % 60;
    let m = (total / 60) % 60;
    let h = total / 3600;
    if h > 0 {
        format!("{}:{}:{}", h, pad(m), pad(s))
    } else {
        format!("{}:{}", pad(m), pad(s))
    }
}
