pub mod entity;
pub mod memory_repo;
pub mod migrations;
pub mod sea_orm_repo;

pub use memory_repo::InMemoryGrantRepository;
pub use sea_orm_repo::SeaOrmGrantRepository;
