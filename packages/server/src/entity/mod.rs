pub mod active_event;
pub mod event;
pub mod participant;
pub mod poll;
pub mod poll_response;
pub mod question;
pub mod question_upvote;
pub mod resource;
pub mod resource_download;
pub mod session;
pub mod session_checkin;
pub mod user;
