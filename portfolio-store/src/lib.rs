pub mod client;
pub mod feed;
pub mod notify;
pub mod pager;
pub mod persist;
pub mod record;
pub mod session;
