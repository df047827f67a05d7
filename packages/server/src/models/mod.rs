pub mod event;
pub mod poll;
pub mod question;
pub mod resource;
pub mod session;
pub mod shared;
pub mod user;
