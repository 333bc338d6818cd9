//! Integration tests for the hoist decision core

mod test_rollback;
mod test_status;
