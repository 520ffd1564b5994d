pub mod log_stream;
pub mod spawn;
