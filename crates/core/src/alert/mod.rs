pub mod alert_controller;
pub mod gps;
