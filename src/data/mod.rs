//! Data loading, feature engineering, encoding and scaling

pub mod encoder;
pub mod features;
pub mod loader;
pub mod scaler;
pub mod scores;
pub mod table;

pub use encoder::{CategoryMapping, CategoryMappings, ColumnKind, EncodedDataset, Encoder};
pub use features::{EngineeredFeatures, FeatureEngineer};
pub use loader::{load_employees, load_scores, save_scores};
pub use scaler::StandardScaler;
pub use scores::{ScoredDataset, ScoredRecord, ScoredTable};
pub use table::{EmployeeRecord, EmployeeTable, RecordId};
