pub mod hourly;
pub mod settings;
pub mod site;

pub use hourly::HourlyRecord;
pub use settings::Settings;
pub use site::Site;
