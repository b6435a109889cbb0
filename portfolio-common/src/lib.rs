pub mod id;
pub mod mock;
pub mod model;
pub mod util;
