pub mod academic;
pub mod activation;
pub mod audit;
pub mod course;
pub mod lecture_file;
pub mod notification;
pub mod password_reset;
pub mod profile;
pub mod promotion;
pub mod study_aid;
pub mod token;
pub mod user_admin;
pub mod user_import;
