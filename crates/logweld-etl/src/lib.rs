pub mod aggregate;
pub mod enrich;
pub mod extract;
pub mod join;
pub mod load;
pub mod pipeline;
pub mod report;
pub mod transform;
pub mod validate;

mod error;
mod timestamp;

pub use error::EtlError;
pub use pipeline::{run_pipeline, PipelineOptions, RunSummary};
pub use report::{generate_report, ReportError, ValidationReport};
pub use validate::{validate_business_rules, BusinessRulesResult, SchemaValidator, ValidationResult};
