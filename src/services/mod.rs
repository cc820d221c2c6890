pub mod curation_service;
pub mod publish_service;

pub use curation_service::{CurationReport, CurationService, Inspection};
pub use publish_service::PublishService;
