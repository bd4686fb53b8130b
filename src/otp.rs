use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{ApiResult, BlogApi};
use crate::config::OTP_LENGTH;
use crate::core::errors::ClientError;
use crate::core::helpers::is_otp_shaped;
use crate::navigation::Redirect;

pub const OTP_SHAPE_ERROR: &str = "Please enter the 6-digit OTP.";
const OTP_VERIFY_FAILED: &str = "OTP verification failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKey {
    Backspace,
    ArrowLeft,
    ArrowRight,
}

/// The six code cells and which one has focus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OtpCells {
    cells: [Option<u8>; OTP_LENGTH],
    focus: usize,
}

impl OtpCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn cell(&self, idx: usize) -> Option<u8> {
        self.cells.get(idx).copied().flatten()
    }

    /// Text typed or pasted into cell `idx`.
    ///
    /// Non-digits are dropped. Each remaining digit fills the next cell and
    /// focus moves past the last one written, stopping at the final cell.
    /// Input with no digits empties the cell.
    pub fn input(&mut self, idx: usize, text: &str) {
        if idx >= OTP_LENGTH {
            return;
        }
        self.focus = idx;

        let digits: Vec<u8> = text
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as u8)
            .collect();
        if digits.is_empty() {
            self.cells[idx] = None;
            return;
        }

        let mut pos = idx;
        for digit in digits.into_iter().take(OTP_LENGTH - idx) {
            self.cells[pos] = Some(digit);
            pos += 1;
        }
        self.focus = pos.min(OTP_LENGTH - 1);
    }

    pub fn key(&mut self, idx: usize, key: CellKey) {
        if idx >= OTP_LENGTH {
            return;
        }
        self.focus = idx;
        match key {
            CellKey::Backspace => {
                if self.cells[idx].is_some() {
                    self.cells[idx] = None;
                } else if idx > 0 {
                    self.focus = idx - 1;
                }
            }
            CellKey::ArrowLeft if idx > 0 => self.focus = idx - 1,
            CellKey::ArrowRight if idx + 1 < OTP_LENGTH => self.focus = idx + 1,
            _ => {}
        }
    }

    /// Filled cells, in order, as typed.
    pub fn entered(&self) -> String {
        self.cells
            .iter()
            .flatten()
            .map(|d| char::from(b'0' + d))
            .collect()
    }

    /// The full code, if every cell holds a digit.
    pub fn code(&self) -> Option<String> {
        let entered = self.entered();
        is_otp_shaped(&entered).then_some(entered)
    }
}

/// What a concrete flow does at each step.
#[async_trait]
pub trait OtpAction: Send + Sync {
    /// Values collected on the form screen and replayed on verification.
    type Fields: Clone + Send + Sync;

    fn validate(&self, fields: &Self::Fields) -> Result<(), String>;

    async fn request_otp(&self, api: &dyn BlogApi, fields: &Self::Fields) -> ApiResult<()>;

    /// Message shown when `request_otp` fails.
    fn request_failure_message(&self, err: &ClientError) -> String;

    async fn verify(
        &self,
        api: &dyn BlogApi,
        fields: &Self::Fields,
        code: &str,
    ) -> ApiResult<Redirect>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpScreen<F> {
    Form,
    Otp { fields: F },
    Done(Redirect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyRefused {
    NotOnOtpScreen,
    Busy,
    IncompleteCode,
}

/// A verification that passed local checks and is ready to send.
#[derive(Debug, Clone)]
pub struct PendingVerify<F> {
    pub fields: F,
    pub code: String,
}

pub struct OtpFlow<A: OtpAction> {
    action: A,
    api: Arc<dyn BlogApi>,
    screen: OtpScreen<A::Fields>,
    cells: OtpCells,
    form_error: Option<String>,
    otp_error: Option<String>,
    requesting: bool,
    verifying: bool,
}

impl<A: OtpAction> OtpFlow<A> {
    pub fn new(action: A, api: Arc<dyn BlogApi>) -> Self {
        Self {
            action,
            api,
            screen: OtpScreen::Form,
            cells: OtpCells::new(),
            form_error: None,
            otp_error: None,
            requesting: false,
            verifying: false,
        }
    }

    pub fn screen(&self) -> &OtpScreen<A::Fields> {
        &self.screen
    }

    pub fn is_form(&self) -> bool {
        matches!(self.screen, OtpScreen::Form)
    }

    pub fn is_otp(&self) -> bool {
        matches!(self.screen, OtpScreen::Otp { .. })
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match &self.screen {
            OtpScreen::Done(redirect) => Some(redirect),
            _ => None,
        }
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn otp_error(&self) -> Option<&str> {
        self.otp_error.as_deref()
    }

    pub fn is_requesting(&self) -> bool {
        self.requesting
    }

    pub fn cells(&self) -> &OtpCells {
        &self.cells
    }

    pub fn input(&mut self, idx: usize, text: &str) {
        if self.is_otp() {
            self.cells.input(idx, text);
        }
    }

    pub fn key(&mut self, idx: usize, key: CellKey) {
        if self.is_otp() {
            self.cells.key(idx, key);
        }
    }

    pub fn is_submit_enabled(&self) -> bool {
        !self.verifying
    }

    pub fn submit_label(&self) -> &'static str {
        if self.verifying {
            "Verifying…"
        } else {
            "Verify OTP"
        }
    }

    /// Validate the form and ask for a code. Returns true once on the otp screen.
    pub async fn submit_form(&mut self, fields: A::Fields) -> bool {
        if !self.is_form() || self.requesting {
            return false;
        }
        self.form_error = None;
        if let Err(msg) = self.action.validate(&fields) {
            self.form_error = Some(msg);
            return false;
        }

        self.requesting = true;
        let outcome = self.action.request_otp(self.api.as_ref(), &fields).await;
        self.requesting = false;

        match outcome {
            Ok(()) => {
                debug!("otp requested, switching to code entry");
                self.cells = OtpCells::new();
                self.otp_error = None;
                self.screen = OtpScreen::Otp { fields };
                true
            }
            Err(err) => {
                warn!(error = %err, "otp request failed");
                self.form_error = Some(self.action.request_failure_message(&err));
                false
            }
        }
    }

    /// Check the code locally and lock the submit control.
    pub fn begin_verify(&mut self) -> Result<PendingVerify<A::Fields>, VerifyRefused> {
        let OtpScreen::Otp { fields } = &self.screen else {
            return Err(VerifyRefused::NotOnOtpScreen);
        };
        if self.verifying {
            return Err(VerifyRefused::Busy);
        }
        self.otp_error = None;

        let Some(code) = self.cells.code() else {
            self.otp_error = Some(OTP_SHAPE_ERROR.to_string());
            return Err(VerifyRefused::IncompleteCode);
        };

        let pending = PendingVerify { fields: fields.clone(), code };
        self.verifying = true;
        Ok(pending)
    }

    /// Send a verification started by [`begin_verify`](Self::begin_verify).
    pub async fn send_verify(&self, pending: &PendingVerify<A::Fields>) -> ApiResult<Redirect> {
        self.action
            .verify(self.api.as_ref(), &pending.fields, &pending.code)
            .await
    }

    /// Apply the verification result and unlock the submit control.
    pub fn finish_verify(&mut self, outcome: ApiResult<Redirect>) -> Option<Redirect> {
        self.verifying = false;
        match outcome {
            Ok(redirect) => {
                self.screen = OtpScreen::Done(redirect.clone());
                Some(redirect)
            }
            Err(err) => {
                warn!(error = %err, "otp verification failed");
                self.otp_error = Some(err.user_message(OTP_VERIFY_FAILED));
                None
            }
        }
    }

    pub async fn submit_code(&mut self) -> Option<Redirect> {
        let pending = self.begin_verify().ok()?;
        let outcome = self.send_verify(&pending).await;
        self.finish_verify(outcome)
    }
}
