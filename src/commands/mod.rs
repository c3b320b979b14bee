pub mod chunk;
pub mod ground;
pub mod ingest;
pub mod inventory;
pub mod lookup;
pub mod status;
