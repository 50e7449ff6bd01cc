//! Command implementations

pub mod info;
pub mod install;
pub mod list;
pub mod remove;

pub use info::run_info;
pub use install::run_install;
pub use list::run_list;
pub use remove::run_remove;
