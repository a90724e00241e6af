//! # Quant
//!
//! $$
//! \text{prices} \mapsto (\mathcal{F}, \text{screen})
//! $$
//!
pub mod portfolio;
pub mod screener;
