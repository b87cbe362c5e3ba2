use rust_decimal::Decimal;

use super::domain::ApplicationRequest;

/// Validation errors raised before an application is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("document number is required")]
    MissingDocument,
    #[error("requested amount must not be negative (found {0})")]
    NegativeAmount(Decimal),
}

/// Guard responsible for producing validated application requests.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Normalise and validate an inbound request.
    pub fn validate(
        &self,
        request: ApplicationRequest,
    ) -> Result<ApplicationRequest, IntakeViolation> {
        let document_number = request.document_number.trim().to_string();
        if document_number.is_empty() {
            return Err(IntakeViolation::MissingDocument);
        }

        if request.amount < Decimal::ZERO {
            return Err(IntakeViolation::NegativeAmount(request.amount));
        }

        Ok(ApplicationRequest {
            document_number,
            amount: request.amount,
        })
    }
}
