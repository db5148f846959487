pub mod growth;
pub mod ingest;
pub mod ranking;
