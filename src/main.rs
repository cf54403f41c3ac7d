mod app;

use app::StudyApp;
use exam_prep::config::AppConfig;
use exam_prep::content::builtin_catalog;
use exam_prep::database::db::{init_database, load_flashcard_store, load_topic_store};
use log::info;

fn main() -> eframe::Result<()> {
    let config = AppConfig::from_env();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    let conn = init_database(&config.database_path).expect("Failed to initialize database");
    let catalog = builtin_catalog().expect("Failed to load the topic catalog");
    let flashcards = load_flashcard_store(&conn).expect("Failed to load flashcard progress");
    let topics = load_topic_store(&conn).expect("Failed to load topic progress");

    info!(
        "Loaded {} topics and {} flashcards ({} with progress)",
        catalog.topics.len(),
        catalog.flashcards.len(),
        flashcards.all_progress().len()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([640.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Finance Exam Prep",
        options,
        Box::new(move |_cc| Ok(Box::new(StudyApp::new(conn, catalog, flashcards, topics)))),
    )
}
