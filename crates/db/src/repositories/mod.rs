pub mod character_repo;
pub mod transformation_repo;
pub mod user_stats_repo;

pub use character_repo::CharacterRepo;
pub use transformation_repo::TransformationRepo;
pub use user_stats_repo::UserStatsRepo;
