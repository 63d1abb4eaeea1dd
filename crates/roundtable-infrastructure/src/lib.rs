pub mod config_service;
pub mod paths;
pub mod storage;
pub mod toml_character_repository;
pub mod toml_discussion_repository;

pub use config_service::ConfigService;
pub use paths::RoundtablePaths;
pub use toml_character_repository::TomlCharacterRepository;
pub use toml_discussion_repository::TomlDiscussionRepository;
