//! Grid verification protocol against the in-memory grid
//!
//! Every verifier is exercised on a healthy grid and on a grid with the
//! matching defect switched on.

use std::path::PathBuf;

use gridcheck_common::{ColumnKind, ColumnMeta, GridSchema, Row, SortDirection, SortInstruction};
use gridcheck_e2e::pagination::{self, PaginationStep};
use gridcheck_e2e::spec::RowTemplate;
use gridcheck_e2e::{
    baseline, bulk, filter, mutation, sort, E2eError, FailureCategory, GridContext, GridDriver, GridRunner,
    MemoryDriverFactory, MemoryFaults, MemoryGrid, RunnerConfig, StatusMessages,
};
use proptest::prelude::*;

fn supplier_schema() -> GridSchema {
    GridSchema::new(
        "supplier",
        "id_supplier",
        vec![
            ColumnMeta::new("id_supplier", ColumnKind::Id),
            ColumnMeta::new("name", ColumnKind::Text),
            ColumnMeta::new("active", ColumnKind::Boolean),
        ],
    )
    .with_status_column("active")
}

fn supplier_context() -> GridContext {
    GridContext::new(supplier_schema(), StatusMessages::default()).unwrap()
}

fn todelete(count: usize) -> Vec<Row> {
    RowTemplate {
        count,
        values: Row::new().with("name", "todelete{i}").with("active", "1"),
    }
    .expand()
}

fn suppliers(names: &[&str]) -> MemoryGrid {
    MemoryGrid::new(supplier_schema()).with_rows(
        names
            .iter()
            .map(|n| Row::new().with("name", *n).with("active", "1")),
    )
}

/// Empty grid, 11 rows created, then the page walk of the supplier suite
#[tokio::test]
async fn eleven_rows_page_walk() {
    let mut grid = MemoryGrid::new(supplier_schema());
    let mut ctx = supplier_context();

    assert_eq!(baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap(), 0);
    assert_eq!(mutation::create_rows(&mut grid, &mut ctx, &todelete(11)).await.unwrap(), 11);

    let seen = pagination::walk(
        &mut grid,
        &mut ctx,
        &[
            PaginationStep::Limit(10),
            PaginationStep::Next,
            PaginationStep::Previous,
            PaginationStep::Limit(50),
        ],
    )
    .await
    .unwrap();
    let seen: Vec<String> = seen.iter().map(ToString::to_string).collect();
    assert_eq!(seen, vec!["(page 1 / 2)", "(page 2 / 2)", "(page 1 / 2)", "(page 1 / 1)"]);
}

#[tokio::test]
async fn navigation_never_leaves_bounds() {
    let mut grid = MemoryGrid::new(supplier_schema());
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
    mutation::create_rows(&mut grid, &mut ctx, &todelete(3)).await.unwrap();

    pagination::select_limit(&mut grid, &mut ctx, 2).await.unwrap();
    assert_eq!(pagination::previous(&mut grid, &mut ctx).await.unwrap().page, 1);
    assert_eq!(pagination::next(&mut grid, &mut ctx).await.unwrap().page, 2);
    assert_eq!(pagination::next(&mut grid, &mut ctx).await.unwrap().page, 2);
    assert_eq!(ctx.pagination.unwrap().page(), 2);
}

#[tokio::test]
async fn ids_sort_as_numbers() {
    let mut grid = MemoryGrid::new(supplier_schema()).with_rows(vec![
        Row::new().with("id_supplier", "13").with("name", "a").with("active", "1"),
        Row::new().with("id_supplier", "3").with("name", "b").with("active", "1"),
        Row::new().with("id_supplier", "7").with("name", "c").with("active", "1"),
    ]);
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let asc = sort::verify_sort(&mut grid, &ctx, &SortInstruction::new("id_supplier", SortDirection::Asc), true)
        .await
        .unwrap();
    assert_eq!(asc.before, vec!["13", "3", "7"]);
    assert_eq!(asc.after, vec!["3", "7", "13"]);

    let desc = sort::verify_sort(&mut grid, &ctx, &SortInstruction::new("id_supplier", SortDirection::Desc), false)
        .await
        .unwrap();
    assert_eq!(desc.after, vec!["13", "7", "3"]);

    let exact = filter::predicate(&ctx, "id_supplier", "3").unwrap();
    let outcome = filter::verify_filter(&mut grid, &ctx, &exact, true).await.unwrap();
    assert_eq!(outcome.visible, 1);
}

/// Bulk disable, bulk enable and bulk delete of the 11 created rows
#[tokio::test]
async fn bulk_round_trip_restores_baseline() {
    let mut grid = suppliers(&["Accessories supplier", "Fashion supplier"]);
    let mut ctx = supplier_context();
    let start = baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
    mutation::create_rows(&mut grid, &mut ctx, &todelete(11)).await.unwrap();

    let only_created = filter::predicate(&ctx, "name", "todelete").unwrap();
    grid.filter_table(only_created.filter_type, &only_created.column, &only_created.value)
        .await
        .unwrap();

    assert_eq!(bulk::bulk_set_status(&mut grid, &ctx, false, Some(11)).await.unwrap(), 11);
    for row in 1..=11 {
        assert!(!grid.get_status(row).await.unwrap());
    }
    assert_eq!(bulk::bulk_set_status(&mut grid, &ctx, true, Some(11)).await.unwrap(), 11);

    assert_eq!(bulk::bulk_delete(&mut grid, &mut ctx, None).await.unwrap(), start);
    assert!(ctx.expected().unwrap().is_restored());
    assert_eq!(grid.rows().len(), 2);
}

#[tokio::test]
async fn update_and_single_delete_keep_count_in_step() {
    let mut grid = suppliers(&["Accessories supplier"]);
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    mutation::create_row(&mut grid, &mut ctx, &Row::new().with("name", "todelete").with("active", "0"))
        .await
        .unwrap();
    let target = filter::predicate(&ctx, "name", "todelete").unwrap();
    grid.filter_table(target.filter_type, &target.column, &target.value)
        .await
        .unwrap();
    assert_eq!(
        mutation::update_row(&mut grid, &mut ctx, 1, &Row::new().with("name", "todelete edited"))
            .await
            .unwrap(),
        2
    );

    let edited = filter::predicate(&ctx, "name", "edited").unwrap();
    assert_eq!(mutation::delete_matching(&mut grid, &mut ctx, &edited).await.unwrap(), 1);
    assert!(ctx.expected().unwrap().is_restored());
}

#[tokio::test]
async fn delete_refuses_a_row_that_does_not_match() {
    let mut grid = suppliers(&["Accessories supplier", "Fashion supplier"]);
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let missing = filter::predicate(&ctx, "name", "nothing like this").unwrap();
    let err = mutation::delete_matching(&mut grid, &mut ctx, &missing).await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::Harness);
    assert_eq!(grid.rows().len(), 2);
    assert_eq!(ctx.count().unwrap(), 2);
    // The filter is cleared even though nothing matched
    assert_eq!(grid.get_number_of_element_in_grid().await.unwrap(), 2);
}

/// Select-all only reaches the current page, the rest of the grid survives
#[tokio::test]
async fn bulk_delete_removes_only_the_current_page() {
    let mut grid = MemoryGrid::new(supplier_schema());
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
    mutation::create_rows(&mut grid, &mut ctx, &todelete(12)).await.unwrap();
    pagination::select_limit(&mut grid, &mut ctx, 10).await.unwrap();

    assert_eq!(bulk::bulk_delete(&mut grid, &mut ctx, None).await.unwrap(), 2);
    assert_eq!(ctx.count().unwrap(), 2);
    assert_eq!(grid.rows().len(), 2);
    assert_eq!(grid.reset_and_get_number_of_lines().await.unwrap(), ctx.count().unwrap());
}

#[tokio::test]
async fn bulk_status_is_bounded_by_the_current_page() {
    let mut grid = MemoryGrid::new(supplier_schema());
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
    mutation::create_rows(&mut grid, &mut ctx, &todelete(12)).await.unwrap();
    pagination::select_limit(&mut grid, &mut ctx, 10).await.unwrap();

    assert_eq!(bulk::bulk_set_status(&mut grid, &ctx, false, None).await.unwrap(), 10);
    let disabled = grid.rows().iter().filter(|r| r.get("active") == Some("0")).count();
    assert_eq!(disabled, 10);

    let err = bulk::bulk_set_status(&mut grid, &ctx, true, Some(4)).await.unwrap_err();
    assert!(matches!(err, E2eError::BulkBound { visible: 10, bound: 4 }));
}

/// Rows spread over several pages: only the order of the shown page is checked
#[tokio::test]
async fn sort_checks_the_page_when_rows_span_pages() {
    let names = ["kilo", "alpha", "lima", "echo", "juliet", "bravo", "india", "delta", "golf", "charlie", "hotel", "foxtrot"];
    let mut grid = suppliers(&names);
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
    pagination::select_limit(&mut grid, &mut ctx, 5).await.unwrap();

    let asc = sort::verify_sort(&mut grid, &ctx, &SortInstruction::new("name", SortDirection::Asc), true)
        .await
        .unwrap();
    assert_eq!(asc.before, vec!["kilo", "alpha", "lima", "echo", "juliet"]);
    assert_eq!(asc.after, vec!["alpha", "bravo", "charlie", "delta", "echo"]);

    let desc = sort::verify_sort(&mut grid, &ctx, &SortInstruction::new("name", SortDirection::Desc), false)
        .await
        .unwrap();
    assert_eq!(desc.after, vec!["lima", "kilo", "juliet", "india", "hotel"]);

    let mut unsorted = suppliers(&names).with_faults(MemoryFaults {
        ignore_sort: true,
        ..Default::default()
    });
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut unsorted, &mut ctx).await.unwrap();
    pagination::select_limit(&mut unsorted, &mut ctx, 5).await.unwrap();
    let err = sort::verify_sort(&mut unsorted, &ctx, &SortInstruction::new("name", SortDirection::Asc), false)
        .await
        .unwrap_err();
    assert_eq!(err.category(), FailureCategory::Ordering);
}

#[tokio::test]
async fn leaking_filter_is_reported() {
    let mut grid = suppliers(&["alpha", "beta", "gamma"]).with_faults(MemoryFaults {
        leak_filters: true,
        ..Default::default()
    });
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let p = filter::predicate(&ctx, "name", "beta").unwrap();
    let err = filter::verify_filter(&mut grid, &ctx, &p, true).await.unwrap_err();
    assert!(matches!(err, E2eError::FilterLeak { expected: 3, actual: 1 }));
    assert_eq!(err.category(), FailureCategory::Filter);
}

#[tokio::test]
async fn ignored_filter_is_reported() {
    let mut grid = suppliers(&["alpha", "beta", "gamma"]).with_faults(MemoryFaults {
        ignore_filters: true,
        ..Default::default()
    });
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let p = filter::predicate(&ctx, "name", "beta").unwrap();
    let err = filter::verify_filter(&mut grid, &ctx, &p, true).await.unwrap_err();
    assert!(matches!(err, E2eError::FilterContent { row: 1, .. }));
    assert_eq!(err.category(), FailureCategory::Filter);
}

#[tokio::test]
async fn ignored_sort_is_reported() {
    let mut grid = suppliers(&["gamma", "alpha", "beta"]).with_faults(MemoryFaults {
        ignore_sort: true,
        ..Default::default()
    });
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let err = sort::verify_sort(&mut grid, &ctx, &SortInstruction::new("name", SortDirection::Asc), false)
        .await
        .unwrap_err();
    match err {
        E2eError::SortMismatch { row, expected, actual, .. } => {
            assert_eq!(row, 1);
            assert_eq!(expected, "alpha");
            assert_eq!(actual, "gamma");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn dropped_creation_is_reported() {
    let mut grid = MemoryGrid::new(supplier_schema()).with_faults(MemoryFaults {
        drop_creations: true,
        ..Default::default()
    });
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let err = mutation::create_rows(&mut grid, &mut ctx, &todelete(2)).await.unwrap_err();
    assert!(matches!(err, E2eError::CountMismatch { expected: 1, actual: 0, .. }));
    assert_eq!(err.category(), FailureCategory::Count);
    assert_eq!(ctx.count().unwrap(), 0);
}

#[tokio::test]
async fn sticky_pagination_is_reported() {
    let mut grid = MemoryGrid::new(supplier_schema()).with_faults(MemoryFaults {
        sticky_pagination: true,
        ..Default::default()
    });
    let mut ctx = supplier_context();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
    mutation::create_rows(&mut grid, &mut ctx, &todelete(11)).await.unwrap();

    pagination::select_limit(&mut grid, &mut ctx, 10).await.unwrap();
    let err = pagination::next(&mut grid, &mut ctx).await.unwrap_err();
    assert!(matches!(err, E2eError::PaginationMismatch { .. }));
    assert_eq!(err.category(), FailureCategory::Ordering);
    // The model does not move on a failed check
    assert_eq!(ctx.pagination.unwrap().page(), 1);
}

#[tokio::test]
async fn wrong_message_is_reported() {
    let messages = StatusMessages {
        created: Some("Successful creation".to_string()),
        ..Default::default()
    };
    let mut grid = MemoryGrid::new(supplier_schema()).with_messages(StatusMessages {
        created: Some("Creation failed".to_string()),
        ..Default::default()
    });
    let mut ctx = GridContext::new(supplier_schema(), messages).unwrap();
    baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

    let err = mutation::create_rows(&mut grid, &mut ctx, &todelete(1)).await.unwrap_err();
    assert!(matches!(err, E2eError::UnexpectedMessage { .. }));
}

#[tokio::test]
async fn bundled_suites_pass_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let runner = GridRunner::new(
        MemoryDriverFactory::default(),
        RunnerConfig {
            suites_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("suites"),
            output_dir: dir.path().to_path_buf(),
        },
    );

    let results = runner.run_all().await.unwrap();
    for suite in &results.suites {
        let failures: Vec<_> = suite.failed_steps().collect();
        assert!(suite.success, "{}: {:?} {:?}", suite.name, suite.error, failures);
        assert!(suite.restored, "{} left the grid changed", suite.name);
    }
    assert_eq!(results.total, 4);
    assert_eq!(results.failed, 0);

    let path = runner.write_results(&results).unwrap();
    assert!(path.exists());
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn create_then_delete_round_trips(existing in 0usize..6, created in 1usize..8) {
        let (after_create, after_delete, restored) = block_on(async {
            let names: Vec<String> = (0..existing).map(|i| format!("seed{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut grid = suppliers(&refs);
            let mut ctx = supplier_context();
            baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();

            let after_create = mutation::create_rows(&mut grid, &mut ctx, &todelete(created)).await.unwrap();
            let mut after_delete = after_create;
            for i in 0..created {
                let p = filter::predicate(&ctx, "name", &format!("todelete{}", i)).unwrap();
                // Substring filters may match more than one row
                grid.filter_table(p.filter_type, &p.column, &p.value).await.unwrap();
                let visible = grid.get_all_rows_column_content("name").await.unwrap();
                let row = visible.iter().position(|n| *n == format!("todelete{}", i)).unwrap() + 1;
                after_delete = mutation::delete_row(&mut grid, &mut ctx, row).await.unwrap();
            }
            (after_create, after_delete, ctx.expected().unwrap().is_restored())
        });
        prop_assert_eq!(after_create, existing + created);
        prop_assert_eq!(after_delete, existing);
        prop_assert!(restored);
    }

    #[test]
    fn walks_follow_the_model(rows in 0usize..40, size in 1usize..15, moves in prop::collection::vec(any::<bool>(), 0..12)) {
        let outcome = block_on(async {
            let mut grid = MemoryGrid::new(supplier_schema());
            let mut ctx = supplier_context();
            baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
            mutation::create_rows(&mut grid, &mut ctx, &todelete(rows)).await.unwrap();

            let mut steps = vec![PaginationStep::Limit(size)];
            steps.extend(moves.iter().map(|&forward| if forward { PaginationStep::Next } else { PaginationStep::Previous }));
            pagination::walk(&mut grid, &mut ctx, &steps).await
        });
        let seen = outcome.unwrap();
        let total = std::cmp::max(1, (rows + size - 1) / size);
        prop_assert_eq!(seen[0].page, 1);
        for indicator in &seen {
            prop_assert_eq!(indicator.total, total);
            prop_assert!(indicator.page >= 1 && indicator.page <= total);
        }
    }

    #[test]
    fn filters_never_grow_the_grid(names in prop::collection::vec("[a-d]{1,4}", 1..12), needle in "[a-d]{1,2}") {
        let outcome = block_on(async {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut grid = suppliers(&refs);
            let mut ctx = supplier_context();
            baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
            let p = filter::predicate(&ctx, "name", &needle).unwrap();
            let outcome = filter::verify_filter(&mut grid, &ctx, &p, false).await;
            let after = grid.get_number_of_element_in_grid().await.unwrap();
            (outcome, after)
        });
        let (outcome, after) = outcome;
        let outcome = outcome.unwrap();
        prop_assert!(outcome.visible <= names.len());
        prop_assert_eq!(outcome.visible, names.iter().filter(|n| n.contains(needle.as_str())).count());
        prop_assert_eq!(after, names.len());
    }

    #[test]
    fn numeric_sorts_match_and_repeat(values in prop::collection::vec(-500i32..500, 1..20), desc in any::<bool>()) {
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        let outcome = block_on(async {
            let mut grid = MemoryGrid::new(supplier_schema()).with_rows(
                values.iter().map(|v| Row::new().with("name", "x").with("active", "1").with("id_supplier", v.to_string())),
            );
            let mut ctx = supplier_context();
            baseline::establish_baseline(&mut grid, &mut ctx).await.unwrap();
            sort::verify_sort(&mut grid, &ctx, &SortInstruction::new("id_supplier", direction), true).await
        });
        let outcome = outcome.unwrap();
        let mut expected: Vec<i32> = values.clone();
        expected.sort();
        if desc {
            expected.reverse();
        }
        let actual: Vec<i32> = outcome.after.iter().map(|v| v.parse().unwrap()).collect();
        prop_assert_eq!(actual, expected);
    }
}
