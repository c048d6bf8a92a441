use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

static ORG_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").unwrap());

/// E.164-ish: optional `+`, no leading zero, 2 to 15 digits
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap());

pub const DEFAULT_TIMEZONE: &str = "UTC";

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_org_handle(handle: &str) -> Result<(), ValidationError> {
    if !ORG_HANDLE.is_match(handle) {
        return Err(invalid(
            "org_handle",
            "Organization handle can only contain lowercase letters, numbers, and hyphens",
        ));
    }
    if handle.contains("--") {
        return Err(invalid(
            "org_handle",
            "Organization handle cannot contain consecutive hyphens",
        ));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !PHONE.is_match(phone) {
        return Err(invalid("phone", "Invalid phone number format"));
    }
    Ok(())
}

/// Accepts IANA zone names only (`Europe/Berlin`, `UTC`).
fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.parse::<chrono_tz::Tz>().is_err() {
        return Err(invalid("timezone", "Invalid timezone"));
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Identity providers a customer can sign in with
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OAuthProviderKind {
    Github,
    Google,
}

/// `provider:provider_id`, the unique key of an external identity
pub fn identity_key(provider: OAuthProviderKind, provider_id: &str) -> String {
    format!("{provider}:{provider_id}")
}

/// An external identity attached to a customer.
///
/// `identity` is unique across all customers. Build links with
/// [`OAuthLink::new`] so it always agrees with `provider` and `provider_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OAuthLink {
    pub provider: OAuthProviderKind,
    /// Account id at the provider
    pub provider_id: String,
    /// See [`identity_key`]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuthLink {
    pub fn new(provider: OAuthProviderKind, provider_id: impl Into<String>) -> Self {
        let provider_id = provider_id.into();
        let now = Utc::now();
        Self {
            provider,
            identity: identity_key(provider, &provider_id),
            provider_id,
            display_name: None,
            email: None,
            profile_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches(&self, provider: OAuthProviderKind, provider_id: &str) -> bool {
        self.provider == provider && self.provider_id == provider_id
    }
}

/// Customer entity - stored in the `customers` collection
///
/// Optional contact fields are omitted from the document when absent so the
/// sparse unique indexes ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    #[serde(
        rename = "_id",
        alias = "id",
        with = "database::mongodb::uuid_as_string"
    )]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    /// Public handle, unique when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub timezone: String,
    pub marketing_consent: bool,
    #[serde(default)]
    pub oauth_providers: Vec<OAuthLink>,
    /// Derived by [`is_account_setup_complete`], never taken from input
    pub account_setup_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// True once the customer has at least one linked identity and every
/// profile field needed to operate the account.
pub fn is_account_setup_complete(customer: &Customer) -> bool {
    let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());

    !customer.oauth_providers.is_empty()
        && present(&customer.org_name)
        && present(&customer.org_handle)
        && present(&customer.email)
        && !customer.timezone.trim().is_empty()
}

impl Customer {
    /// Build a customer from a validated create request.
    pub fn new(input: CreateCustomer) -> Self {
        let now = Utc::now();
        let mut customer = Self {
            id: Uuid::now_v7(),
            org_name: Some(input.org_name),
            org_handle: Some(input.org_handle),
            email: input.email,
            phone: input.phone,
            timezone: input.timezone,
            marketing_consent: input.marketing_consent,
            oauth_providers: Vec::new(),
            account_setup_complete: false,
            created_at: now,
            updated_at: now,
        };
        customer.refresh_setup_status();
        customer
    }

    /// A customer known only through one external identity.
    pub fn with_identity(email: Option<String>, link: OAuthLink) -> Self {
        let now = Utc::now();
        let mut customer = Self {
            id: Uuid::now_v7(),
            org_name: None,
            org_handle: None,
            email,
            phone: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            marketing_consent: false,
            oauth_providers: vec![link],
            account_setup_complete: false,
            created_at: now,
            updated_at: now,
        };
        customer.refresh_setup_status();
        customer
    }

    /// True once org name and handle have been set through create or update.
    pub fn has_profile(&self) -> bool {
        self.org_handle.is_some()
    }

    /// Fill in the profile of an existing customer from a validated create
    /// request. A missing email keeps the one already on record.
    pub fn apply_profile(&mut self, input: CreateCustomer) {
        self.apply_update(input.into());
    }

    /// Apply a validated partial update; absent fields are left untouched.
    pub fn apply_update(&mut self, update: UpdateCustomer) {
        if let Some(org_name) = update.org_name {
            self.org_name = Some(org_name);
        }
        if let Some(org_handle) = update.org_handle {
            self.org_handle = Some(org_handle);
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone;
        }
        if let Some(marketing_consent) = update.marketing_consent {
            self.marketing_consent = marketing_consent;
        }
        self.updated_at = Utc::now();
        self.refresh_setup_status();
    }

    pub fn refresh_setup_status(&mut self) {
        self.account_setup_complete = is_account_setup_complete(self);
    }

    pub fn has_identity(&self, provider: OAuthProviderKind, provider_id: &str) -> bool {
        self.oauth_providers
            .iter()
            .any(|link| link.matches(provider, provider_id))
    }
}

/// DTO for creating a customer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 100))]
    pub org_name: String,
    #[validate(length(min = 3, max = 30), custom(function = "validate_org_handle"))]
    pub org_handle: String,
    #[serde(default = "default_timezone")]
    #[validate(custom(function = "validate_timezone"))]
    pub timezone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(default)]
    pub marketing_consent: bool,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl CreateCustomer {
    /// Trim surrounding whitespace before validation.
    pub fn normalized(self) -> Self {
        Self {
            org_name: self.org_name.trim().to_string(),
            org_handle: self.org_handle.trim().to_string(),
            timezone: self.timezone.trim().to_string(),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            marketing_consent: self.marketing_consent,
        }
    }
}

impl From<CreateCustomer> for UpdateCustomer {
    fn from(input: CreateCustomer) -> Self {
        Self {
            org_name: Some(input.org_name),
            org_handle: Some(input.org_handle),
            timezone: Some(input.timezone),
            email: input.email,
            phone: input.phone,
            marketing_consent: Some(input.marketing_consent),
        }
    }
}

/// DTO for updating a customer; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 100))]
    pub org_name: Option<String>,
    #[validate(length(min = 3, max = 30), custom(function = "validate_org_handle"))]
    pub org_handle: Option<String>,
    #[validate(custom(function = "validate_timezone"))]
    pub timezone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub marketing_consent: Option<bool>,
}

impl UpdateCustomer {
    pub fn normalized(self) -> Self {
        Self {
            org_name: trimmed(self.org_name),
            org_handle: trimmed(self.org_handle),
            timezone: trimmed(self.timezone),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            marketing_consent: self.marketing_consent,
        }
    }
}

/// Pagination for listing customers
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct CustomerFilter {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

/// Largest page a list request may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

impl CustomerFilter {
    /// `limit` clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for CustomerFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}
