pub mod creator;
pub mod holding;
pub mod notification;
pub mod post;
pub mod trade;
