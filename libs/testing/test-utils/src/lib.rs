//! Shared test utilities for domain testing
//!
//! - `TestMongo`: MongoDB container with automatic cleanup
//! - `TestDataBuilder`: deterministic test data generation
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestMongo, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!
//!     let db = mongo.database(&builder.database_name());
//!     let email = builder.email("owner");
//! }
//! ```

mod mongo;

pub use mongo::TestMongo;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_customer");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A database name unique to this test
    pub fn database_name(&self) -> String {
        format!("test_{}", self.seed)
    }

    /// A lowercase org handle matching `^[a-z0-9][a-z0-9-]*[a-z0-9]$`
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let handle = TestDataBuilder::new(7).handle("acme");
    /// assert_eq!(handle, "acme-7");
    /// ```
    pub fn handle(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.seed % 100_000)
    }

    pub fn email(&self, local: &str) -> String {
        format!("{}+{}@example.com", local, self.seed)
    }

    /// An OAuth provider account id
    pub fn provider_id(&self, suffix: &str) -> String {
        format!("{}{}", self.seed % 1_000_000, suffix)
    }
}
