// Test modules for Kaiwa
// Each module contains unit tests for the corresponding source file

mod config_tests;
mod task_tests;
mod vault_tests;

use crate::vault::SecureKeyStore;
use std::sync::atomic::{AtomicUsize, Ordering};

// Each test gets its own keyring alias so vaults never share a key
pub(crate) fn test_vault() -> SecureKeyStore {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    SecureKeyStore::with_alias("kaiwa-test", &format!("identity-key-{}", n))
        .expect("Failed to open test vault")
}
