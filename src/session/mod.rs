pub mod identity;
pub mod recorder;

pub use identity::get_or_create_session_id;
pub use recorder::{record_session_if_new, PageContext};
