pub mod logger;
pub mod shutdown;
pub mod time;
