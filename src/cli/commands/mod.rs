mod create_superuser;
mod serve;
mod wait_for_db;

pub use create_superuser::cmd_create_superuser;
pub use serve::cmd_serve;
pub use wait_for_db::cmd_wait_for_db;
