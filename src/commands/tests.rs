//! Command Integration Tests
//!
//! Runs the per-screen operations against the bundled sample household.

#[cfg(test)]
mod tests {
    use crate::commands::*;
    use crate::config::AppConfig;
    use crate::domain::{
        AttendanceStatus, BillStatus, Clock, DomainError, EventDraft, ExpiryStatus, ManualClock,
        Medication, PaymentStatus, ServiceDraft, Timeframe, TransactionType,
    };
    use crate::repository::SeedSource;
    use crate::AppState;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Sample household in memory, clock at midnight UTC on `day`
    fn household(day: &str) -> (AppState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_date(date(day)));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let config = AppConfig {
            persist: false,
            ..Default::default()
        };
        let state = AppState::in_memory(config, dyn_clock).expect("Failed to build state");
        (state, clock)
    }

    fn empty_household(day: &str) -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_date(date(day)));
        let config = AppConfig {
            persist: false,
            seed: SeedSource::None,
            ..Default::default()
        };
        AppState::in_memory(config, clock).expect("Failed to build state")
    }

    // ------------------------------------------------------------------
    // Bills
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_legacy_overdue_fixture_is_unpaid_before_due_date() {
        let (state, _) = household("2025-07-01");
        let dth = get_bill(&state, "4").await.expect("DTH bill");
        assert_eq!(dth.status, PaymentStatus::Unpaid);
        assert_eq!(dth.effective_status, BillStatus::Unpaid);
        assert!(list_bills(&state, Some(BillStatus::Overdue), None).await.is_empty());
    }

    #[tokio::test]
    async fn test_overdue_filter_follows_clock() {
        let (state, clock) = household("2025-07-01");
        clock.set(date("2025-07-16").and_time(NaiveTime::default()).and_utc());

        let overdue = list_bills(&state, Some(BillStatus::Overdue), None).await;
        let ids: Vec<&str> = overdue.iter().map(|b| b.meta.id.as_str()).collect();
        // sorted by due date
        assert_eq!(ids, vec!["4", "1"]);

        let utilities = list_bills(&state, Some(BillStatus::Overdue), Some("utilities".into())).await;
        assert_eq!(utilities.len(), 1);
        assert_eq!(utilities[0].title, "Electricity Bill");

        let totals = bill_totals(&state).await;
        assert_eq!(totals.paid, 1499.0);
        assert_eq!(totals.overdue, 1850.0);
        assert_eq!(totals.unpaid, 12800.0);
    }

    #[tokio::test]
    async fn test_upcoming_dues_window() {
        let (state, _) = household("2025-07-01");

        let week = upcoming_dues(&state, None).await;
        assert_eq!(week.within_days, 7);
        assert_eq!(week.bills.len(), 1);
        assert_eq!(week.total, 600.0);

        let fortnight = upcoming_dues(&state, Some(14)).await;
        let ids: Vec<&str> = fortnight.bills.iter().map(|b| b.meta.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "1"]);
        assert_eq!(fortnight.total, 1850.0);
    }

    #[tokio::test]
    async fn test_upcoming_dues_window_past_calendar_end() {
        let (state, _) = household("2025-07-01");

        for days in [1_000_000_000, i64::MAX] {
            let all = upcoming_dues(&state, Some(days)).await;
            let ids: Vec<&str> = all.bills.iter().map(|b| b.meta.id.as_str()).collect();
            assert_eq!(ids, vec!["4", "1", "2", "5"]);
            assert_eq!(all.total, 14650.0);
        }
        assert!(upcoming_dues(&state, Some(i64::MIN)).await.bills.is_empty());
    }

    #[tokio::test]
    async fn test_listed_bill_json_carries_overdue() {
        let (state, clock) = household("2025-07-01");
        clock.set(date("2025-07-16").and_time(NaiveTime::default()).and_utc());

        let overdue = list_bills(&state, Some(BillStatus::Overdue), None).await;
        let json = serde_json::to_value(&overdue[0]).expect("encode");
        assert_eq!(json["id"], "4");
        assert_eq!(json["status"], "unpaid");
        assert_eq!(json["effectiveStatus"], "overdue");

        let paid = serde_json::to_value(get_bill(&state, "3").await.expect("Paid bill")).expect("encode");
        assert_eq!(paid["effectiveStatus"], "paid");
    }

    #[tokio::test]
    async fn test_pay_bill_records_payment() {
        let (state, _) = household("2025-07-01");

        let paid = pay_bill(
            &state,
            "2",
            PaymentInput {
                method: "UPI".into(),
                reference: "UPI/123".into(),
                ..Default::default()
            },
        )
        .await
        .expect("Payment failed");

        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.effective_status, BillStatus::Paid);
        assert_eq!(paid.payments.len(), 1);
        assert_eq!(paid.payments[0].amount, 800.0);
        assert_eq!(paid.payments[0].date, date("2025-07-01"));
        assert!(upcoming_dues(&state, Some(30)).await.bills.iter().all(|b| b.meta.id != "2"));
    }

    #[tokio::test]
    async fn test_rejected_payment_changes_nothing() {
        let (state, _) = household("2025-07-01");
        let before = get_bill(&state, "2").await.expect("Water bill");

        let err = pay_bill(
            &state,
            "2",
            PaymentInput {
                amount: Some(-10.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(get_bill(&state, "2").await.expect("Water bill"), before);
    }

    #[tokio::test]
    async fn test_mark_paid_and_unpaid() {
        let (state, clock) = household("2025-07-20");
        clock.advance(Duration::hours(1));

        let bill = mark_bill_paid(&state, "1").await.expect("Mark paid failed");
        assert_eq!(bill.effective_status, BillStatus::Paid);
        assert_eq!(bill.payments.len(), 3);

        let bill = mark_bill_unpaid(&state, "1").await.expect("Mark unpaid failed");
        assert_eq!(bill.effective_status, BillStatus::Overdue);

        assert_eq!(
            mark_bill_paid(&state, "missing").await.unwrap_err(),
            DomainError::not_found("bill", "missing")
        );
    }

    // ------------------------------------------------------------------
    // Groceries
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_grocery_views() {
        let (state, _) = household("2025-07-01");

        assert_eq!(
            grocery_counts(&state).await,
            GroceryCounts {
                pending: 3,
                completed: 2
            }
        );
        assert_eq!(list_groceries(&state, true).await.len(), 3);

        let groups = groceries_by_category(&state).await;
        assert_eq!(groups["Dairy"].len(), 2);
        assert_eq!(groups.len(), 4);
    }

    #[tokio::test]
    async fn test_quick_add_toggle_and_clear() {
        let (state, _) = household("2025-07-01");

        let paneer = quick_add_grocery(&state, "Paneer").await.expect("Quick add failed");
        assert_eq!(paneer.category, "Other");
        assert_eq!(list_groceries(&state, false).await[0].name, "Paneer");

        let toggled = toggle_grocery(&state, "1").await.expect("Toggle failed");
        assert!(toggled.is_completed);

        let cleared = clear_completed_groceries(&state).await.expect("Clear failed");
        assert_eq!(cleared, 3);
        assert_eq!(
            grocery_counts(&state).await,
            GroceryCounts {
                pending: 3,
                completed: 0
            }
        );
        assert!(quick_add_grocery(&state, "   ").await.is_err());
    }

    #[tokio::test]
    async fn test_clear_completed_with_nothing_checked() {
        let state = empty_household("2025-07-01");
        quick_add_grocery(&state, "Atta").await.expect("Quick add failed");
        assert_eq!(clear_completed_groceries(&state).await.expect("Clear failed"), 0);
        assert_eq!(list_groceries(&state, false).await.len(), 1);
    }

    // ------------------------------------------------------------------
    // Staff
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_attendance_mark_replaces_same_day() {
        let (state, _) = household("2025-07-01");

        mark_attendance(&state, "2", None, AttendanceStatus::Present, None)
            .await
            .expect("Mark failed");
        let member = mark_attendance(&state, "2", None, AttendanceStatus::HalfDay, Some("Left at noon".into()))
            .await
            .expect("Mark failed");

        assert_eq!(member.attendance.len(), 1);
        assert_eq!(member.attendance[0].status, AttendanceStatus::HalfDay);
        assert_eq!(member.attendance[0].date, date("2025-07-01"));
    }

    #[tokio::test]
    async fn test_attendance_summary_counts_half_days() {
        let (state, _) = household("2025-07-03");

        let report = attendance_summary(&state, "1", date("2025-07-01"), date("2025-07-02"))
            .await
            .expect("Summary failed");
        assert_eq!(report.summary.present, 1);
        assert_eq!(report.summary.half_day, 1);
        assert_eq!(report.percentage, Some(75.0));

        let empty = attendance_summary(&state, "3", date("2025-07-01"), date("2025-07-31"))
            .await
            .expect("Summary failed");
        assert_eq!(empty.percentage, None);
    }

    // ------------------------------------------------------------------
    // Calendar
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_events_on_and_upcoming() {
        let (state, clock) = household("2025-07-01");

        let third: Vec<String> = events_on(&state, date("2025-07-03")).await.into_iter().map(|e| e.title).collect();
        assert_eq!(third, vec!["Plumber Visit".to_string(), "Family Dinner".to_string()]);

        let upcoming = upcoming_events(&state, Some(3)).await;
        let ids: Vec<&str> = upcoming.iter().map(|e| e.meta.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);

        assert_eq!(events_by_date(&state).await.len(), 4);

        clock.set(date("2025-07-15").and_time(NaiveTime::default()).and_utc());
        create_event(
            &state,
            EventDraft {
                title: "Tax consultant".into(),
                date: Some(date("2025-07-15")),
                start_time: NaiveTime::from_hms_opt(8, 0, 0),
                category: "Finance".into(),
                ..Default::default()
            },
        )
        .await
        .expect("Create failed");

        let upcoming = upcoming_events(&state, None).await;
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].title, "Tax consultant");
        assert!(upcoming[1].is_all_day());
    }

    // ------------------------------------------------------------------
    // Vehicles
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_service_records_and_costs() {
        let (state, _) = household("2025-07-01");
        assert_eq!(fleet_service_cost(&state).await, 13350.0);

        let car = add_service_record(
            &state,
            "1",
            ServiceDraft {
                date: Some(date("2025-06-28")),
                odometer: Some(7500),
                service: "Brake pads".into(),
                cost: Some(3200.0),
                notes: None,
            },
        )
        .await
        .expect("Add service failed");

        assert_eq!(car.service_history.len(), 3);
        assert_eq!(car.last_service().map(|r| r.odometer), Some(7500));
        assert_eq!(vehicle_service_cost(&state, "1").await.expect("Cost failed"), 10200.0);

        let err = add_service_record(&state, "1", ServiceDraft::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(get_vehicle(&state, "1").await.expect("Car").service_history.len(), 3);
    }

    #[tokio::test]
    async fn test_expiry_alerts() {
        let (state, clock) = household("2025-07-01");
        assert!(expiry_alerts(&state).await.is_empty());

        clock.set(date("2025-08-10").and_time(NaiveTime::default()).and_utc());
        let alerts = expiry_alerts(&state).await;
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.vehicle_id == "3"));
        assert_eq!(alerts[0].kind, ExpiryKind::Insurance);
        assert_eq!(alerts[0].status, ExpiryStatus::ExpiringSoon(20));
    }

    #[tokio::test]
    async fn test_attach_vehicle_document_and_cascade() {
        let (state, _) = household("2025-07-01");
        let bike = attach_vehicle_document(&state, "3", "Service invoice", "/docs/bike/invoice.pdf")
            .await
            .expect("Attach failed");
        assert_eq!(bike.documents.len(), 3);
        assert!(attach_vehicle_document(&state, "3", "", "/x").await.is_err());

        delete_vehicle(&state, "3").await.expect("Delete failed");
        assert_eq!(
            get_vehicle(&state, "3").await.unwrap_err(),
            DomainError::not_found("vehicle", "3")
        );
    }

    // ------------------------------------------------------------------
    // Family
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_health_details() {
        let (state, _) = household("2025-07-01");

        let arjun = add_allergy(&state, "3", "Pollen").await.expect("Add allergy failed");
        assert_eq!(arjun.health.allergies, vec!["Milk".to_string(), "Pollen".to_string()]);

        let err = add_allergy(&state, "3", "pollen").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let arjun = remove_allergy(&state, "3", "MILK").await.expect("Remove allergy failed");
        assert_eq!(arjun.health.allergies, vec!["Pollen".to_string()]);
        assert_eq!(
            remove_allergy(&state, "3", "Milk").await.unwrap_err(),
            DomainError::not_found("allergy", "Milk")
        );

        let arjun = add_condition(&state, "3", "Eczema").await.expect("Add condition failed");
        assert_eq!(arjun.health.conditions.len(), 2);

        let arjun = add_medication(
            &state,
            "3",
            Medication {
                name: "Cetirizine".into(),
                dosage: "5mg".into(),
                frequency: "Once daily".into(),
                time: Some("Night".into()),
            },
        )
        .await
        .expect("Add medication failed");
        assert_eq!(arjun.health.medications.len(), 2);

        let bad = Medication {
            name: "Syrup".into(),
            dosage: String::new(),
            frequency: "Daily".into(),
            time: None,
        };
        assert!(add_medication(&state, "3", bad).await.is_err());
    }

    #[tokio::test]
    async fn test_member_age() {
        let (state, _) = household("2025-07-01");
        assert_eq!(member_age(&state, "3").await.expect("Age failed"), Some(15));
        assert_eq!(member_age(&state, "1").await.expect("Age failed"), Some(45));

        let attached = attach_family_document(&state, "2", "Aadhaar", "/docs/priya/aadhaar.pdf")
            .await
            .expect("Attach failed");
        assert_eq!(attached.documents.len(), 3);
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_document_search_and_categories() {
        let (state, _) = household("2025-07-01");

        assert_eq!(search_documents(&state, "insurance", None).await.len(), 2);
        let medical = search_documents(&state, "INSURANCE", Some("insurance".into())).await;
        assert_eq!(medical.len(), 1);
        assert_eq!(medical[0].meta.id, "d3");
        assert_eq!(search_documents(&state, "", Some("Property".into())).await.len(), 2);

        let categories = document_categories(&state).await;
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0], "Education");
    }

    #[tokio::test]
    async fn test_expiring_documents() {
        let (state, _) = household("2025-07-01");

        let soon: Vec<String> = expiring_documents(&state, 30).await.into_iter().map(|d| d.meta.id).collect();
        assert_eq!(soon, vec!["d3".to_string()]);

        let year: Vec<String> = expiring_documents(&state, 365).await.into_iter().map(|d| d.meta.id).collect();
        assert_eq!(year, vec!["d3".to_string(), "d2".to_string()]);
    }

    #[tokio::test]
    async fn test_expiring_documents_window_past_calendar_end() {
        let (state, _) = household("2025-07-01");

        for days in [1_000_000_000, i64::MAX] {
            let all: Vec<String> = expiring_documents(&state, days).await.into_iter().map(|d| d.meta.id).collect();
            assert_eq!(all, vec!["d3".to_string(), "d2".to_string(), "d6".to_string()]);
        }
    }

    // ------------------------------------------------------------------
    // Finance
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_finance_summary_by_timeframe() {
        let (state, _) = household("2025-07-02");

        let month = finance_summary(&state, Timeframe::Month).await;
        assert_eq!(month.income, 40000.0);
        assert_eq!(month.expense, 31750.0);
        assert_eq!(month.balance, 8250.0);
        assert_eq!(month.expenses_by_category[0], ("Staff".to_string(), 17000.0));

        let week = finance_summary(&state, Timeframe::Week).await;
        assert_eq!(week.income, 25000.0);
        assert_eq!(week.balance, -6750.0);

        let income = list_transactions(&state, Some(TransactionType::Income)).await;
        assert_eq!(income.len(), 2);
        assert_eq!(income[0].date, date("2025-07-01"));
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_backup_roundtrip_into_empty_household() {
        let (source, _) = household("2025-07-01");
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("backup.json");

        let written = export_backup_to(&source, &path).await.expect("Export failed");
        assert_eq!(written, 40);

        let target = empty_household("2025-07-01");
        let report = import_backup_from(&target, &path).await.expect("Import failed");
        assert_eq!(report.total().inserted, 40);
        assert_eq!(report.get("bill").map(|r| r.inserted), Some(5));
        assert_eq!(list_bills(&target, None, None).await.len(), 5);

        let again = import_backup_from(&target, &path).await.expect("Import failed");
        assert_eq!(again.total().skipped, 40);
    }

    #[tokio::test]
    async fn test_restore_keeps_newer_local_edits() {
        let (state, clock) = household("2025-07-01");
        let backup = export_backup(&state).await;

        clock.advance(Duration::hours(2));
        mark_bill_paid(&state, "2").await.expect("Mark paid failed");

        let report = import_backup(&state, backup).await.expect("Import failed");
        assert_eq!(report.total().replaced, 0);
        assert_eq!(get_bill(&state, "2").await.expect("Water bill").status, PaymentStatus::Paid);
    }

    // ------------------------------------------------------------------
    // Persistent state
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_persistent_state_survives_restart() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_date(date("2025-07-01")));

        {
            let state = AppState::with_clock(config.clone(), clock.clone()).await.expect("Open failed");
            delete_bill(&state, "5").await.expect("Delete failed");
            quick_add_grocery(&state, "Atta").await.expect("Quick add failed");
        }

        let state = AppState::with_clock(config, clock).await.expect("Reopen failed");
        assert_eq!(list_bills(&state, None, None).await.len(), 4);
        assert!(get_bill(&state, "5").await.is_err());
        assert_eq!(list_groceries(&state, false).await[0].name, "Atta");
    }

    #[tokio::test]
    async fn test_deleted_grocery_id_not_reused_after_restart() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_date(date("2025-07-01")));

        {
            let state = AppState::with_clock(config.clone(), clock.clone()).await.expect("Open failed");
            let atta = quick_add_grocery(&state, "Atta").await.expect("Quick add failed");
            assert_eq!(atta.meta.id, "grocery-1");
            delete_grocery(&state, &atta.meta.id).await.expect("Delete failed");
        }

        let state = AppState::with_clock(config, clock).await.expect("Reopen failed");
        let eggs = quick_add_grocery(&state, "Eggs").await.expect("Quick add failed");
        assert_eq!(eggs.meta.id, "grocery-2");
    }
}
