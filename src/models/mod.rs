//! Classification models

pub mod logistic;

pub use logistic::{ClassWeight, LogisticRegression, LogisticRegressionError, Solver};
