#![doc = include_str!("../README.md")]

mod config;
mod error;
mod job;
mod pool;
mod queue;
mod results;
mod shutdown;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::job::*;
pub use crate::pool::*;
pub use crate::queue::*;
pub use crate::results::*;
pub use crate::shutdown::*;
