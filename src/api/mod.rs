pub mod client;
pub mod models;

pub use client::{ApiError, SharedTrailsApi, TrailsApi, TrailsClient};
pub use models::{
    Certificate, EnrollResponse, ItemDetail, ItemKind, ProgressStatus, ProgressUpdate, Section,
    SectionItem, Trail, TrailProgress, User, DEFAULT_REQUIRED_PERCENTAGE,
};
