pub mod shutdown;
pub mod startup;

pub use shutdown::perform_shutdown_tasks;
pub use startup::{AppContext, prepare_startup};
