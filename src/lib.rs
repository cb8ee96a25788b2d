pub mod captcha;
pub mod capture;
pub mod error;
pub mod names;
pub mod ocr;
pub mod preprocess;
pub mod template_matching;
pub mod tracking;

#[cfg(test)]
mod test_utils;

pub use captcha::{CaptchaSession, SessionConfig, SessionEvent, SessionRunner, SessionState};
pub use error::{CaptchaError, CaptchaResult};
