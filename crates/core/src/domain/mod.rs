pub mod lenient;
pub mod snapshot;
