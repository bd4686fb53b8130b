pub mod errors;
pub mod helpers;
pub mod query_params;
pub mod sequence;
