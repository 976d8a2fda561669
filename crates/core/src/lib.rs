pub mod alert;
pub mod recognition;
pub mod shared;
pub mod video;
