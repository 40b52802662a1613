//! Comprehensive unit tests for the Identifiers module
//!
//! Tests cover all identifier types, their creation, parsing,
//! conversion, and display formatting.

use core_kernel::{
    ActorId, AuditEntryId, BorrowerId, BusinessId, DisbursementId, EntryId, LoanId, PaymentId,
};
use uuid::Uuid;

mod loan_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = LoanId::new();
        let id2 = LoanId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = LoanId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = LoanId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_new_v7_carries_version_seven() {
        let id = LoanId::new_v7();
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = LoanId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_display_format() {
        let id = LoanId::new();
        let display = id.to_string();
        assert!(display.starts_with("LN-"));
    }

    #[test]
    fn test_default_is_random() {
        assert_ne!(LoanId::default(), LoanId::default());
    }
}

mod prefixes {
    use super::*;

    #[test]
    fn test_each_type_has_its_own_prefix() {
        assert_eq!(LoanId::prefix(), "LN");
        assert_eq!(PaymentId::prefix(), "PAY");
        assert_eq!(DisbursementId::prefix(), "DSB");
        assert_eq!(EntryId::prefix(), "TXN");
        assert_eq!(BusinessId::prefix(), "BIZ");
        assert_eq!(BorrowerId::prefix(), "BRW");
        assert_eq!(ActorId::prefix(), "USR");
        assert_eq!(AuditEntryId::prefix(), "AUD");
    }

    #[test]
    fn test_display_uses_the_prefix() {
        let uuid = Uuid::new_v4();
        assert_eq!(PaymentId::from(uuid).to_string(), format!("PAY-{uuid}"));
        assert_eq!(BusinessId::from(uuid).to_string(), format!("BIZ-{uuid}"));
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_round_trips_through_display() {
        let original = BorrowerId::new();
        let parsed: BorrowerId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parses_bare_uuid_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: EntryId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let uuid = Uuid::new_v4();
        let result = format!("XX-{uuid}").parse::<LoanId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!("LN-not-a-uuid".parse::<LoanId>().is_err());
        assert!("".parse::<ActorId>().is_err());
    }
}

mod conversion {
    use super::*;

    #[test]
    fn test_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = DisbursementId::from(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_ids_of_different_types_do_not_compare_equal_via_uuid() {
        // Same underlying uuid, distinct newtypes; equality only works
        // within one type
        let uuid = Uuid::new_v4();
        let loan = LoanId::from(uuid);
        let payment = PaymentId::from(uuid);
        assert_eq!(Uuid::from(loan), Uuid::from(payment));
    }
}

mod wire_format {
    use super::*;

    #[test]
    fn test_serializes_as_a_bare_uuid_string() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();
        let id = LoanId::from(uuid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440001\"");
    }

    #[test]
    fn test_deserializes_from_a_bare_uuid_string() {
        let id: AuditEntryId =
            serde_json::from_str("\"550e8400-e29b-41d4-a716-446655440002\"").unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "550e8400-e29b-41d4-a716-446655440002"
        );
    }
}

mod collections {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_work_as_hash_keys() {
        let a = LoanId::new();
        let b = LoanId::new();

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(a);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }
}
