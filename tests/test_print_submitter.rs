mod helpers;

use helpers::pdf_fixtures;
use helpers::test_db::scratch_dir;
use printkiosk::services::printer::{
    MockPrintSystem, PrintError, PrintSubmitter, PrintSubsystem,
};
use std::sync::Arc;

fn submitter(print_system: Arc<MockPrintSystem>, printer: &str) -> PrintSubmitter {
    PrintSubmitter::new(print_system as Arc<dyn PrintSubsystem>, printer.to_string())
}

#[tokio::test]
async fn test_full_selection_skips_slicing() {
    let dir = scratch_dir();
    let input = dir.join("doc.pdf");
    pdf_fixtures::write_pdf(&input, 4);

    let print_system = Arc::new(MockPrintSystem::with_printers(vec!["kiosk".to_string()]));
    let sub = submitter(print_system.clone(), "kiosk");

    let job_id = sub.submit(&input, "job-1", 1, false, "all").await.unwrap();
    assert!(job_id > 0);

    // The original file went straight to the printer, no derived copy.
    let submissions = print_system.submissions();
    assert_eq!(submissions[0].path, input);
    assert!(!input.with_extension("pages.pdf").exists());
}

#[tokio::test]
async fn test_subset_selection_produces_sliced_copy() {
    let dir = scratch_dir();
    let input = dir.join("doc.pdf");
    pdf_fixtures::write_pdf(&input, 5);

    let print_system = Arc::new(MockPrintSystem::with_printers(vec!["kiosk".to_string()]));
    let sub = submitter(print_system.clone(), "kiosk");

    sub.submit(&input, "job-2", 1, false, "2-4").await.unwrap();

    let submissions = print_system.submissions();
    let sliced = &submissions[0].path;
    assert_ne!(sliced, &input);
    assert_eq!(pdf_fixtures::page_count(sliced), 3);

    // The original is untouched.
    assert_eq!(pdf_fixtures::page_count(&input), 5);
}

#[tokio::test]
async fn test_empty_selection_is_refused() {
    let dir = scratch_dir();
    let input = dir.join("doc.pdf");
    pdf_fixtures::write_pdf(&input, 3);

    let print_system = Arc::new(MockPrintSystem::with_printers(vec!["kiosk".to_string()]));
    let sub = submitter(print_system.clone(), "kiosk");

    let err = sub.submit(&input, "job-3", 1, false, "9-12").await.unwrap_err();
    assert!(matches!(err, PrintError::EmptyPageSelection));
    assert!(print_system.submissions().is_empty());
}

#[tokio::test]
async fn test_falls_back_to_first_registered_printer() {
    let dir = scratch_dir();
    let input = dir.join("doc.pdf");
    pdf_fixtures::write_pdf(&input, 1);

    let print_system = Arc::new(MockPrintSystem::with_printers(vec![
        "other-printer".to_string(),
    ]));
    let sub = submitter(print_system.clone(), "configured-but-missing");

    sub.submit(&input, "job-4", 1, false, "").await.unwrap();
    assert_eq!(print_system.submissions()[0].printer, "other-printer");
}

#[tokio::test]
async fn test_no_registered_printers_fails_outright() {
    let dir = scratch_dir();
    let input = dir.join("doc.pdf");
    pdf_fixtures::write_pdf(&input, 1);

    let print_system = Arc::new(MockPrintSystem::with_printers(vec![]));
    let sub = submitter(print_system, "kiosk");

    let err = sub.submit(&input, "job-5", 1, false, "").await.unwrap_err();
    assert!(matches!(err, PrintError::NoPrinterAvailable));
}

#[tokio::test]
async fn test_duplex_maps_to_two_sided_long_edge() {
    let dir = scratch_dir();
    let input = dir.join("doc.pdf");
    pdf_fixtures::write_pdf(&input, 2);

    let print_system = Arc::new(MockPrintSystem::with_printers(vec!["kiosk".to_string()]));
    let sub = submitter(print_system.clone(), "kiosk");

    sub.submit(&input, "job-6", 3, true, "").await.unwrap();

    let submissions = print_system.submissions();
    assert_eq!(submissions[0].copies, 3);
    assert_eq!(submissions[0].sides, "two-sided-long-edge");
    assert_eq!(submissions[0].title, "kiosk-job-job-6");
}
