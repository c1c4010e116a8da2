pub mod cache;
pub mod db;
pub mod language_model;
pub mod password;
