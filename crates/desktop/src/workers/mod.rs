pub mod messaging_worker;
pub mod recognition_worker;
