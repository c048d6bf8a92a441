//! Authorization gate consulted by every mutating operation.

use axum_helpers::AppError;

use crate::context::RequestContext;
use crate::models::Customer;

/// The authenticated customer, or `UNAUTHORIZED`.
///
/// Pure: looks only at the already-resolved context, so it is safe to call
/// before the request body is parsed.
pub fn require_authenticated(context: &RequestContext) -> Result<&Customer, AppError> {
    context.customer().ok_or_else(AppError::unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::ErrorCode;

    #[test]
    fn test_anonymous_is_rejected() {
        let err = require_authenticated(&RequestContext::anonymous()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.to_string(), "Authentication required");
    }

    #[test]
    fn test_token_without_customer_is_rejected() {
        let ctx = RequestContext::new(Some("stale".to_string()), None);
        assert!(require_authenticated(&ctx).is_err());
    }

    #[test]
    fn test_customer_passes() {
        let customer = crate::models::Customer::new(crate::models::CreateCustomer {
            org_name: "Acme".to_string(),
            org_handle: "acme".to_string(),
            timezone: "UTC".to_string(),
            email: None,
            phone: None,
            marketing_consent: false,
        });
        let id = customer.id;
        let ctx = RequestContext::new(Some("t".to_string()), Some(customer));
        assert_eq!(require_authenticated(&ctx).unwrap().id, id);
    }
}
