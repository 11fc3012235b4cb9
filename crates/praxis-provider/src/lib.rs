pub mod tavus_client;

pub use tavus_client::TavusClient;
