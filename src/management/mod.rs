mod janitor;
mod session;

pub use janitor::Janitor;
pub use janitor::sweep_temp_files;
pub use session::SessionStore;
