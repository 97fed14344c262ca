use serde::{Deserialize, Serialize};

/// Threshold applied when the backend omits `required_percentage` on an item.
pub const DEFAULT_REQUIRED_PERCENTAGE: u8 = 70;

/// Enrollment/progress status as persisted by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Enrolled,
    InProgress,
    Completed,
}

/// Item type discriminator used by the sidebar and duration display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    Video,
    Quiz,
    Pdf,
    #[serde(other)]
    Other,
}

/// One entry of a trail section (sidebar view of an item)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionItem {
    pub id: i64,
    pub title: String,
    pub duration_seconds: Option<u32>,
    pub order_index: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<ItemKind>,
}

/// A trail section with its ordered items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: i64,
    pub title: String,
    pub order_index: Option<i32>,
    pub items: Vec<SectionItem>,
}

/// Full detail of a single lesson item, including the video reference and
/// the navigation links to the neighboring items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemDetail {
    pub id: i64,
    pub trail_id: i64,
    pub section_id: i64,
    pub title: String,
    /// External video reference (provider video id, not a URL)
    #[serde(rename = "youtubeId")]
    pub video_id: String,
    pub duration_seconds: u32,
    pub required_percentage: Option<u8>,
    pub description_html: String,
    pub prev_item_id: Option<i64>,
    pub next_item_id: Option<i64>,
}

impl ItemDetail {
    /// Watched-percentage gate for this item, falling back to the platform
    /// default when the backend did not set one.
    pub fn required_percentage_or_default(&self) -> u8 {
        self.required_percentage
            .unwrap_or(DEFAULT_REQUIRED_PERCENTAGE)
    }
}

/// Server-computed progress aggregate for one learner on one trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrailProgress {
    pub done: u32,
    pub total: u32,
    pub computed_progress_percent: Option<f64>,
    #[serde(rename = "nextAction")]
    pub next_action: Option<String>,
    #[serde(rename = "enrolledAt")]
    pub enrolled_at: Option<String>,
    pub status: Option<ProgressStatus>,
    pub completed_at: Option<String>,
}

/// Body of the item progress PUT
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressUpdate {
    pub status: ProgressStatus,
    /// Watched position in whole seconds
    pub progress_value: u32,
}

/// Trail as listed in the catalog and returned by the trail detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trail {
    pub id: i64,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub review: Option<f32>,
    pub progress_percent: Option<f64>,
    pub status: Option<ProgressStatus>,
    pub is_completed: Option<bool>,
    pub completed_at: Option<String>,
    #[serde(rename = "nextAction")]
    pub next_action: Option<String>,
}

/// Envelope of `GET /trails/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrailList {
    pub trails: Vec<Trail>,
}

/// Response of the enrollment POST
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollResponse {
    pub ok: bool,
    pub trail_id: i64,
    pub first_item_id: Option<i64>,
    pub progress: Option<TrailProgress>,
}

/// Authenticated user as returned by `/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub profile_pic_url: Option<String>,
    pub banner_pic_url: Option<String>,
}

/// Envelope of `GET /me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeResponse {
    pub user: Option<User>,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus an optional bearer token for clients that
/// cannot rely on browser cookies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub user: Option<User>,
    pub token: Option<String>,
}

/// Certificate payload for the public verification view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certificate {
    pub trail_id: i64,
    pub trail_title: String,
    pub student_name: String,
    pub credential_id: String,
    pub certificate_hash: String,
    pub issued_at: Option<String>,
    pub verification_url: String,
    pub qr_code_data_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_detail_deserializes_wire_names() {
        let json = r#"{
            "id": 42,
            "trail_id": 7,
            "section_id": 3,
            "title": "Intro",
            "youtubeId": "T7BCv5BKrls",
            "duration_seconds": 572,
            "required_percentage": 70,
            "description_html": "<p>About this lesson</p>",
            "prev_item_id": null,
            "next_item_id": 43
        }"#;

        let detail: ItemDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.video_id, "T7BCv5BKrls");
        assert_eq!(detail.duration_seconds, 572);
        assert_eq!(detail.required_percentage_or_default(), 70);
        assert_eq!(detail.next_item_id, Some(43));
    }

    #[test]
    fn test_missing_required_percentage_defaults_to_70() {
        let json = r#"{
            "id": 1,
            "trail_id": 1,
            "section_id": 1,
            "title": "No threshold",
            "youtubeId": "abc123",
            "duration_seconds": 100,
            "description_html": ""
        }"#;

        let detail: ItemDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.required_percentage, None);
        assert_eq!(detail.required_percentage_or_default(), 70);
    }

    #[test]
    fn test_progress_status_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProgressStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let status: ProgressStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, ProgressStatus::Completed);
    }

    #[test]
    fn test_unknown_item_kind_falls_back_to_other() {
        let item: SectionItem = serde_json::from_str(
            r#"{"id": 1, "title": "Survey", "type": "SURVEY"}"#,
        )
        .unwrap();
        assert_eq!(item.kind, Some(ItemKind::Other));
    }

    #[test]
    fn test_progress_update_serializes_wire_format() {
        let update = ProgressUpdate {
            status: ProgressStatus::Completed,
            progress_value: 401,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["progress_value"], 401);
    }
}
