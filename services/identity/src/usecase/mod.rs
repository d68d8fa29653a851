pub mod code;
pub mod credential;
pub mod otp;
pub mod password;
pub mod retention;
pub mod token;
