//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Id-list lookups use
//! `= ANY($1)` so one round trip covers a whole batch.

pub mod category_repo;
pub mod comment_repo;
pub mod event_repo;
pub mod location_repo;
pub mod membership_repo;
pub mod rso_repo;
pub mod university_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use event_repo::EventRepo;
pub use location_repo::LocationRepo;
pub use membership_repo::MembershipRepo;
pub use rso_repo::RsoRepo;
pub use university_repo::UniversityRepo;
pub use user_repo::UserRepo;
