pub mod db;
pub mod media;
pub mod s3;
pub mod session;
