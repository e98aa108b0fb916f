pub mod config;
pub mod record;
pub mod schema;

mod error;

pub use config::{
    load_pipeline_config, ApiEndpointConfig, DataSourceConfig, Destination, EnrichmentConfig,
    PipelineConfig, SourceRole, UploadConfig,
};
pub use error::ConfigError;
pub use record::Record;
pub use schema::{Dataset, DatasetSchema, FieldType, SchemaSet};
