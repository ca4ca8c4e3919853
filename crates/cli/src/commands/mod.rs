pub mod chapters;
pub mod doctor;
pub mod generate;
pub mod ingest;
pub mod init;
pub mod serve;
