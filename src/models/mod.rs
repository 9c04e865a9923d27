pub mod alert;
pub mod attendance;
pub mod channel;
pub mod health;
pub mod recipient;
pub mod response;
pub mod session;
pub mod template;
pub mod validation;
