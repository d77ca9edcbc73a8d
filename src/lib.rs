pub mod cli;
pub mod compute;
pub mod epw;
pub mod error;
pub mod grib;
pub mod hrrr;
pub mod models;
pub mod processors;
pub mod utils;

pub use error::{GnomyError, Result};
