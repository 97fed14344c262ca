use trilha::api::models::{
    ItemDetail, ItemKind, Section, SectionItem, TrailProgress,
};

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub const TRAIL_ID: i64 = 7;
pub const ITEM_ID: i64 = 42;

/// Item detail matching the canonical lesson used across the tests:
/// a 572-second video with a 70% completion threshold.
pub fn make_detail(duration_seconds: u32, required_percentage: Option<u8>) -> ItemDetail {
    ItemDetail {
        id: ITEM_ID,
        trail_id: TRAIL_ID,
        section_id: 3,
        title: "Test Lesson".to_string(),
        video_id: "T7BCv5BKrls".to_string(),
        duration_seconds,
        required_percentage,
        description_html: "<p>About this lesson</p>".to_string(),
        prev_item_id: None,
        next_item_id: Some(ITEM_ID + 1),
    }
}

pub fn make_sections() -> Vec<Section> {
    vec![Section {
        id: 3,
        title: "Getting Started".to_string(),
        order_index: Some(1),
        items: vec![
            SectionItem {
                id: ITEM_ID,
                title: "Test Lesson".to_string(),
                duration_seconds: Some(572),
                order_index: Some(1),
                kind: Some(ItemKind::Video),
            },
            SectionItem {
                id: ITEM_ID + 1,
                title: "Next Lesson".to_string(),
                duration_seconds: Some(300),
                order_index: Some(2),
                kind: Some(ItemKind::Video),
            },
        ],
    }]
}

pub fn make_progress(done: u32, total: u32) -> TrailProgress {
    TrailProgress {
        done,
        total,
        computed_progress_percent: Some(done as f64 / total as f64 * 100.0),
        next_action: None,
        enrolled_at: Some("2026-01-10T12:00:00Z".to_string()),
        status: None,
        completed_at: None,
    }
}
