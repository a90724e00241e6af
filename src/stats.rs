//! # Stats
//!
//! $$
//! \hat c = \arg\min_{c}\sum_i \min_j (x_i-c_j)^2
//! $$
//!
pub mod kmeans;
