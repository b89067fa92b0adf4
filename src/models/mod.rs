pub mod page_view;
pub mod session;

pub use page_view::PageViewRecord;
pub use session::SessionRecord;
