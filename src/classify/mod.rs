pub mod device;
pub mod page_type;
pub mod referrer;

pub use device::DeviceType;
pub use page_type::PageType;
pub use referrer::{classify_referrer, ReferrerInfo, ReferrerSource};
