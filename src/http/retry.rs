//! Status classification and per-request retry bookkeeping.

use super::error::HttpError;

pub const OK: u16 = 200;
pub const MULTIPLE_CHOICES: u16 = 300;
pub const FOUND: u16 = 302;
pub const BAD_REQUEST: u16 = 400;
/// API-specific rate limit ("claim limit").
pub const ENHANCE_YOUR_CLAIM: u16 = 420;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx, or 302 which is returned as is rather than followed.
    Success,
    /// Caller-correctable; retrying cannot help.
    NonRetryable,
    /// Transient server fault.
    Retryable,
}

pub fn classify_status(status: u16) -> StatusClass {
    if (OK..MULTIPLE_CHOICES).contains(&status) || status == FOUND {
        return StatusClass::Success;
    }
    if status == ENHANCE_YOUR_CLAIM || status == BAD_REQUEST || status < INTERNAL_SERVER_ERROR {
        return StatusClass::NonRetryable;
    }
    StatusClass::Retryable
}

/// Attempt counter for a single `execute` call.
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_error: Option<HttpError>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
            last_error: None,
        }
    }

    /// Zero-based index of the current attempt.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_last_attempt(&self) -> bool {
        self.attempt + 1 >= self.max_attempts
    }

    pub fn last_error(&self) -> Option<&HttpError> {
        self.last_error.as_ref()
    }

    /// Records a failed attempt.
    ///
    /// Hands the error back when it ends the request: either it is not
    /// retryable or the budget is spent.
    pub fn fail(&mut self, error: HttpError, retryable: bool) -> Result<(), HttpError> {
        if !retryable || self.is_last_attempt() {
            return Err(error);
        }
        self.last_error = Some(error);
        Ok(())
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}
