pub mod html;
pub mod session;
pub mod state;
pub mod test_utils;
pub mod token;
