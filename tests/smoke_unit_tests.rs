//! Smoke screen unit tests for the custody ledger components
//!
//! These test are unit tests that span the codebase, testing behavior in
//! isolation from integration scenarios. These are intended as smoke-screen
//! and generally test the happy-path.

use pharma_ledger::batch::{Batch, BatchId, Stage, Status, progress_message};
use pharma_ledger::registry::{MemoryRoleDirectory, Role, RoleDirectory};
use pharma_ledger::utils::new_identity;

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Test that new_identity generates valid bech32-encoded strings with the
    /// correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let result = new_identity("supplier_");
        assert!(result.is_ok());

        let encoded = result.unwrap();
        assert!(encoded.starts_with("supplier_1"));
        assert!(encoded.len() > 10); // UUID should produce substantial output
    }

    /// Test that the function handles empty strings appropriately
    #[test]
    fn handles_empty_hrp() {
        // Empty string should fail
        let result = new_identity("");
        assert!(result.is_err());
    }

    /// Test that multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_identity("user_").unwrap();
        let id2 = new_identity("user_").unwrap();
        let id3 = new_identity("user_").unwrap();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }
}

// BATCH MODULE TESTS
#[cfg(test)]
mod batch_tests {
    use super::*;

    /// Test that the same batch number always derives the same identifier
    #[test]
    fn batch_id_is_deterministic() {
        let a = BatchId::from_number("BATCH-12");
        let b = BatchId::from_number("BATCH-12");

        assert_eq!(a, b);
    }

    /// Test that distinct batch numbers derive distinct identifiers
    #[test]
    fn distinct_numbers_do_not_collide() {
        let a = BatchId::from_number("BATCH-12");
        let b = BatchId::from_number("BATCH-13");

        assert_ne!(a, b);
    }

    /// Test that the display form is the 64-char lowercase hex digest
    #[test]
    fn batch_id_displays_as_hex() {
        let id = BatchId::from_number("12");
        let hex = id.to_string();

        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, hex.to_lowercase());
    }

    /// Test that stage ordinals follow the pipeline order
    #[test]
    fn stage_ordinals_are_pipeline_positions() {
        let pipeline = [
            Stage::Created,
            Stage::Manufactured,
            Stage::WithDistributor,
            Stage::InTransport,
            Stage::WithWholesaler,
            Stage::WithRetailer,
            Stage::Sold,
        ];

        for (position, stage) in pipeline.iter().enumerate() {
            assert_eq!(stage.ordinal() as usize, position);
        }
    }

    /// Test the derived progress lines for the observer-facing combinations
    #[test]
    fn progress_messages_derive_from_stage_and_status() {
        assert_eq!(
            progress_message(Stage::Created, Status::Pending),
            "awaiting pickup from Supplier"
        );
        assert_eq!(
            progress_message(Stage::Manufactured, Status::InProgress),
            "in transit"
        );
        assert_eq!(
            progress_message(Stage::WithWholesaler, Status::Completed),
            "delivered to Retailer"
        );
        assert_eq!(
            progress_message(Stage::Sold, Status::Completed),
            "sold at retail"
        );
    }

    /// Test that every stage/status combination produces a message
    #[test]
    fn progress_messages_are_total() {
        let stages = [
            Stage::Created,
            Stage::Manufactured,
            Stage::WithDistributor,
            Stage::InTransport,
            Stage::WithWholesaler,
            Stage::WithRetailer,
            Stage::Sold,
        ];
        let statuses = [Status::Pending, Status::InProgress, Status::Completed];

        for stage in stages {
            for status in statuses {
                assert!(!progress_message(stage, status).is_empty());
            }
        }
    }

    /// Test that a batch record CBOR round-trips unchanged
    #[test]
    fn batch_record_cbor_roundtrip() {
        let original = Batch {
            name: "Paracetamol".to_string(),
            holder: "supplier_1abc".to_string(),
            stage: Stage::WithDistributor,
            status: Status::Completed,
            location: "Distribution Hub".to_string(),
            updates_count: 5,
        };

        let encoded = minicbor::to_vec(&original).unwrap();
        let decoded: Batch = minicbor::decode(&encoded).unwrap();

        assert_eq!(original, decoded);
    }
}

// REGISTRY MODULE TESTS
#[cfg(test)]
mod registry_tests {
    use super::*;

    /// Test that the in-memory directory starts every identity at None
    #[test]
    fn default_role_is_none() {
        let directory = MemoryRoleDirectory::new();
        assert_eq!(directory.role_of("anyone").unwrap(), Role::None);
    }

    /// Test that each identity maps to exactly one role at a time
    #[test]
    fn one_role_per_identity() {
        let directory = MemoryRoleDirectory::new();
        directory.assign_role("acct", Role::Distributor).unwrap();
        directory.assign_role("acct", Role::Wholesaler).unwrap();

        assert_eq!(directory.role_of("acct").unwrap(), Role::Wholesaler);
    }

    /// Test the role display names used in error messages and logs
    #[test]
    fn role_display_names() {
        assert_eq!(Role::Supplier.to_string(), "Supplier");
        assert_eq!(Role::Wholesaler.to_string(), "Wholesaler");
        assert_eq!(Role::None.to_string(), "None");
    }
}
