pub mod feed_manager;
pub mod run_guard;
