//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - [`carriers`]: carrier rate API adapters
//! - [`persistence`]: quote repositories
//! - [`labels`]: label document rendering

pub mod carriers;
pub mod labels;
pub mod persistence;
