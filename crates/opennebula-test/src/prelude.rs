//! Prelude module - commonly used test utilities.
//!
//! Use `use opennebula_test::prelude::*;` to import all essential helpers.

pub use crate::fixtures::{
    TEST_PASSWORD, TEST_USERNAME, test_declared_config, test_env, test_env_with, test_tag_block,
    xmlrpc_failure, xmlrpc_fault, xmlrpc_success,
};
pub use crate::harness::init_test_logging;
pub use crate::mocks::{MockOpenNebula, MockSystemApi};
