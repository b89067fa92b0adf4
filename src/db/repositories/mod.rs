mod page_views;
mod sessions;

pub(crate) use page_views::insert_page_view_row;
pub(crate) use sessions::insert_session_row;
