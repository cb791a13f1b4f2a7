pub mod kmeans;
pub mod linreg;
pub mod optimize;
pub mod stats;
