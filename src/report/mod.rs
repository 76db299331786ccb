pub mod html;
pub mod layout;
pub mod schema;
pub mod shaper;
pub mod storage;
