//! Error types for the form controller.

use campus_core::CampusError;
use campus_dom::DomError;
use thiserror::Error;

/// Result type for form controller operations.
pub type Result<T> = std::result::Result<T, FormsError>;

/// Errors raised by the form controller and its utilities.
///
/// Missing page targets and absent capabilities are never errors; those
/// features are skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormsError {
    /// A marker selector from the configuration does not parse
    #[error("invalid {marker} selector: {source}")]
    InvalidSelector {
        /// Config key of the marker
        marker: &'static str,
        #[source]
        source: DomError,
    },

    /// Currency code is not three ASCII letters
    #[error("invalid currency code `{0}`: expected three letters such as USD")]
    InvalidCurrencyCode(String),

    /// Amount is NaN or infinite
    #[error("cannot format non-finite amount {0}")]
    NonFiniteAmount(f64),

    /// Amount is finite but outside the decimal range
    #[error("amount {0} is too large to format")]
    AmountOutOfRange(f64),

    /// Document operation failed
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl FormsError {
    pub(crate) fn selector(marker: &'static str, source: DomError) -> Self {
        Self::InvalidSelector { marker, source }
    }
}

impl From<FormsError> for CampusError {
    fn from(err: FormsError) -> Self {
        if let FormsError::InvalidSelector { marker, .. } = &err {
            return CampusError::ConfigValidation {
                message: format!("markers.{marker}: {err}"),
            };
        }
        CampusError::controller_setup(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_error_maps_to_config_validation() {
        let dom = campus_dom::Selector::parse("[").unwrap_err();
        let err = FormsError::selector("add_field", dom);
        let campus: CampusError = err.into();
        assert!(campus.is_config_error());
        assert!(campus.to_string().contains("markers.add_field"));
    }

    #[test]
    fn test_currency_errors_display() {
        let err = FormsError::InvalidCurrencyCode("US".into());
        assert!(err.to_string().contains("`US`"));
        assert!(!CampusError::from(err).is_config_error());
        let campus: CampusError = FormsError::NonFiniteAmount(f64::NAN).into();
        assert!(matches!(campus, CampusError::ControllerSetup { .. }));
    }
}
