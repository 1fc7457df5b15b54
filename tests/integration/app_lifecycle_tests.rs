/*!
 * Controller workflows: chapter splitting, metadata, dry runs and the checks
 * that must fail before any chapter is touched.
 */

use std::sync::Arc;

use bookwai::app_config::{FailurePolicy, TranslationProvider};
use bookwai::app_controller::Controller;
use bookwai::errors::AppError;
use bookwai::extraction::{split_into_chapter_files, BookMetadata};
use bookwai::providers::mock::MockClient;
use bookwai::translation::{build_system_instruction, ChapterStatus, PromptConfig};

use crate::common::{self, TestProject};

fn chapter_body(words: usize) -> String {
    (0..words).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
}

fn assert_configuration_error(err: &anyhow::Error) {
    assert!(
        matches!(err.downcast_ref::<AppError>(), Some(AppError::Configuration(_))),
        "expected a configuration error, got: {:#}",
        err
    );
}

#[tokio::test]
async fn test_translate_withMissingPrompts_shouldFailBeforeTouchingChapters() {
    let project = TestProject::new().unwrap();
    project.add_chapter("01_Start.txt", "Some text.").unwrap();
    std::fs::remove_file(&project.config.prompts_path).unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);

    let err = controller.run_translate(true).await.unwrap_err();

    assert_configuration_error(&err);
    assert!(!project.config.output_dir().exists());
    assert!(!project.config.temp_dir().exists());
}

#[tokio::test]
async fn test_translate_withUnknownGenre_shouldFailWithConfigurationError() {
    let project = TestProject::new().unwrap();
    project.add_chapter("01_Start.txt", "Some text.").unwrap();
    let mut prompts = PromptConfig::sample();
    prompts.project_settings.selected_genre = Some("thriller".to_string());
    std::fs::write(&project.config.prompts_path, serde_json::to_string(&prompts).unwrap()).unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);

    let err = controller.run_translate(false).await.unwrap_err();

    assert_configuration_error(&err);
    assert!(format!("{:#}", err).contains("thriller"));
}

#[tokio::test]
async fn test_translate_withMalformedPrompts_shouldFailWithConfigurationError() {
    let project = TestProject::new().unwrap();
    std::fs::write(&project.config.prompts_path, "{ \"project_settings\": ").unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);

    let err = controller.run_translate(true).await.unwrap_err();

    assert_configuration_error(&err);
}

#[tokio::test]
async fn test_translate_withHostedProviderAndNoKey_shouldFailBeforeTranslating() {
    if std::env::var("OPENAI_API_KEY").map(|v| !v.trim().is_empty()).unwrap_or(false) {
        return;
    }
    let mut project = TestProject::new().unwrap();
    project.add_chapter("01_Start.txt", "Some text.").unwrap();
    project.config.translation.provider = TranslationProvider::OpenAI;
    project.config.translation.active_provider_config_mut().api_key.clear();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);

    let err = controller.run_translate(false).await.unwrap_err();

    assert_configuration_error(&err);
    assert!(project.read_partial("01_Start").is_none());
    assert!(project.read_final("01_Start").is_none());
}

#[tokio::test]
async fn test_dryRun_shouldEchoChaptersIntoScratchFolder() {
    let project = TestProject::new().unwrap();
    project.add_chapter("01_Start.txt", "First chapter text.\r\n").unwrap();
    project.add_chapter("02_End.txt", "Second chapter text.").unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);

    let summary = controller.run_translate(true).await.unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.completed(), 2);
    let dry_output = project.config.temp_dir().join("dry_run").join("output");
    assert_eq!(std::fs::read_to_string(dry_output.join("01_Start.md")).unwrap(), "First chapter text.");
    assert_eq!(std::fs::read_to_string(dry_output.join("02_End.md")).unwrap(), "Second chapter text.");
    // Real artifacts are untouched, so a later real run still has everything to do
    assert!(!project.config.output_dir().exists());
    assert_eq!(project.layout().status_of("01_Start"), ChapterStatus::Pending);
}

#[tokio::test]
async fn test_dryRun_twice_shouldStartFromScratchEachTime() {
    let project = TestProject::new().unwrap();
    project.add_chapter("01_Start.txt", "Text.").unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);

    controller.run_translate(true).await.unwrap();
    let summary = controller.run_translate(true).await.unwrap();

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.already_done(), 0);
}

#[tokio::test]
async fn test_translateWith_shouldWriteArtifactsAndKeepMetadataInSync() {
    let project = TestProject::new().unwrap();
    project.add_chapter("01_Start.txt", "Line one here.\nLine two here.").unwrap();
    project.add_chapter("02_End.txt", "Short chapter.").unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);
    let client = MockClient::working();
    let system_instruction = build_system_instruction(&PromptConfig::sample()).unwrap();

    let summary = controller
        .translate_with(
            Arc::new(client.clone()),
            system_instruction.clone(),
            common::fast_settings(20, 3, FailurePolicy::AbortChapter),
            project.layout(),
        )
        .await
        .unwrap();
    let metadata = controller.run_metadata().unwrap();

    assert_eq!(summary.completed(), 2);
    assert_eq!(client.request_count(), 3);
    assert!(client.system_instructions().iter().all(|s| *s == system_instruction));
    assert!(metadata.chapters.iter().all(|c| c.status == ChapterStatus::Complete));
    let saved: BookMetadata =
        serde_json::from_str(&std::fs::read_to_string(&project.config.paths.metadata_path).unwrap()).unwrap();
    assert_eq!(saved, metadata);
}

#[tokio::test]
async fn test_translateWith_withNoChapters_shouldReturnEmptySummary() {
    let project = TestProject::new().unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap().with_progress(false);
    let client = MockClient::working();

    let summary = controller
        .translate_with(
            Arc::new(client.clone()),
            "system".to_string(),
            common::fast_settings(20, 3, FailurePolicy::AbortChapter),
            project.layout(),
        )
        .await
        .unwrap();

    assert!(summary.reports.is_empty());
    assert_eq!(client.request_count(), 0);
}

#[test]
fn test_metadata_afterSplit_shouldReportChaptersAndStatus() {
    let project = TestProject::new().unwrap();
    let text = format!(
        "Contents\nChapter 1\nChapter 2\nChapter 1: Arrival\n{}\nChapter 2: Departure\n{}",
        chapter_body(150),
        chapter_body(250)
    );
    let report = split_into_chapter_files(&text, &project.config.raw_text_dir()).unwrap();
    assert_eq!(report.written.len(), 2);
    let layout = project.layout();
    layout.ensure_dirs().unwrap();
    std::fs::write(layout.final_path("01_Chapter_1_Arrival"), "अनुवाद").unwrap();
    std::fs::write(layout.partial_path("02_Chapter_2_Departure"), "आधा").unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap();

    let metadata = controller.run_metadata().unwrap();

    assert_eq!(metadata.project_name, "Test Book");
    assert_eq!(metadata.total_chapters, 2);
    // Heading words count too
    assert_eq!(metadata.total_words, 153 + 253);
    assert_eq!(metadata.average_words_per_chapter, (153 + 253) / 2);
    assert_eq!(metadata.chapters[0].filename, "01_Chapter_1_Arrival.txt");
    assert_eq!(metadata.chapters[0].status, ChapterStatus::Complete);
    assert_eq!(metadata.chapters[1].status, ChapterStatus::InProgress);
}

#[test]
fn test_metadata_withoutChapterFolder_shouldFail() {
    let project = TestProject::new().unwrap();
    std::fs::remove_dir_all(project.config.raw_text_dir()).unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap();

    tokio_test::assert_err!(controller.run_metadata());
}

#[test]
fn test_metadata_withNoChapters_shouldNotWriteReport() {
    let project = TestProject::new().unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap();

    let metadata = controller.run_metadata().unwrap();

    assert_eq!(metadata.total_chapters, 0);
    assert!(!std::path::Path::new(&project.config.paths.metadata_path).exists());
}

#[tokio::test]
async fn test_extract_withoutAnyPdf_shouldFail() {
    let project = TestProject::new().unwrap();
    std::fs::create_dir_all(&project.config.paths.pdf_input_dir).unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap();

    let err = controller.run_extract(None).await.unwrap_err();

    assert!(err.to_string().contains("No PDF"));
}

#[tokio::test]
async fn test_extract_withUnreadablePdf_shouldFail() {
    let project = TestProject::new().unwrap();
    let bogus = common::create_test_file(project.dir.path(), "book.pdf", "not really a pdf").unwrap();
    let controller = Controller::with_config(project.config.clone()).unwrap();

    tokio_test::assert_err!(controller.run_extract(Some(bogus)).await);
    // Nothing was split, so existing chapter files stay put
    assert!(project.config.raw_text_dir().exists());
}
