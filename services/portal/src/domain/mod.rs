pub mod academic;
pub mod lecture_file;
pub mod repository;
pub mod study_aid;
pub mod types;
