pub mod job;
pub mod profile;
pub mod user;

pub use job::{JobPosting, Page, ProviderResult, ProviderStatus, RankedJob, SalaryRange, SearchQuery};
pub use profile::{ExperienceLevel, UserProfile};
