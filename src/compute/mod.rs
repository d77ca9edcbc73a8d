pub mod albedo;
pub mod sky;
pub mod solar;
pub mod weather_codes;
pub mod wind;
