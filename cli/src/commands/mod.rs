mod account;
mod consumption;
mod dashboard;
mod helpers;
mod log;
mod profile;
mod status;

pub(crate) use account::{cmd_login, cmd_logout, cmd_register};
pub(crate) use consumption::{cmd_delete, cmd_edit, cmd_history};
pub(crate) use dashboard::cmd_dashboard;
pub(crate) use log::cmd_log;
pub(crate) use profile::{cmd_profile_set, cmd_profile_show};
pub(crate) use status::cmd_status;
