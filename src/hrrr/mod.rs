pub mod cache;
pub mod client;
pub mod inventory;
pub mod variables;

pub use cache::{SiteCache, SiteMeta};
pub use client::HrrrClient;
pub use inventory::{Inventory, InventoryEntry};
pub use variables::{GribVariable, ANALYSIS_VARIABLES, FORECAST_VARIABLES, VEGETATION_TYPE};
