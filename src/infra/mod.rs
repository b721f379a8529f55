pub mod handoff;
pub mod http_client;
pub mod object_store;
pub mod secrets;
