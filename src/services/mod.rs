// Service exports
pub mod dataset;
pub mod gateway;
pub mod postgres;

pub use dataset::DatasetGateway;
pub use gateway::{GatewayError, RepositoryGateway};
pub use postgres::PostgresGateway;
