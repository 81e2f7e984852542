pub mod health;
pub mod ingestion;
pub mod worker;
