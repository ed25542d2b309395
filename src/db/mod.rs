pub mod migrations;
pub mod payload;
pub mod repository;
