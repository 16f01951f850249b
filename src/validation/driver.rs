//! Driver liveness check

use super::ValidationResult;
use crate::driver::{Driver, DriverExt};

/// Probes the current URL to confirm the session is usable
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverValidator;

impl DriverValidator {
    pub const NAME: &'static str = "DriverValidator";

    pub async fn validate(&self, driver: &dyn Driver) -> ValidationResult {
        match driver.current_url().await {
            Ok(url) if url == "about:blank" => ValidationResult::warning(
                Self::NAME,
                "Driver is on about:blank and may need navigation",
            ),
            Ok(_) => ValidationResult::success(),
            Err(e) => ValidationResult::failure(
                Self::NAME,
                format!("Driver appears to be inactive or closed: {}", e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DriverError;
    use crate::driver::{BrowserOp, OpOutput};
    use async_trait::async_trait;

    struct Fixed(Result<&'static str, DriverError>);

    #[async_trait]
    impl Driver for Fixed {
        async fn perform(&self, _op: BrowserOp) -> Result<OpOutput, DriverError> {
            self.0.clone().map(|url| OpOutput::Text(url.to_string()))
        }
    }

    #[tokio::test]
    async fn test_driver_validation() {
        let live = DriverValidator.validate(&Fixed(Ok("https://example.com"))).await;
        assert!(live.valid && live.warnings.is_empty());

        let blank = DriverValidator.validate(&Fixed(Ok("about:blank"))).await;
        assert!(blank.valid);
        assert_eq!(blank.warnings.len(), 1);

        let closed = DriverValidator.validate(&Fixed(Err(DriverError::SessionClosed))).await;
        assert!(closed.is_invalid());
        assert!(closed.error_message().contains("Browser session is closed"));
    }
}
