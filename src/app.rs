//! Main application UI and state management.
//! Shows the readiness dashboard, topic progress and flashcard review sessions.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use eframe::egui;
use exam_prep::compute_metrics;
use exam_prep::database::db;
use exam_prep::export::json::{ProgressSnapshot, export_progress_to_path, import_progress};
use exam_prep::models::{Catalog, FlashcardProgressStore, ReviewQueue, TopicProgressStore};
use exam_prep::readiness::Priority;
use log::{error, warn};
use rusqlite::Connection;

/// Grade buttons offered after the answer is revealed.
const GRADE_BUTTONS: [(u8, &str); 4] = [(0, "Again"), (3, "Hard"), (4, "Good"), (5, "Easy")];

/// Application screen states
#[derive(Clone, Copy, Default, PartialEq)]
enum AppScreen {
    #[default]
    Dashboard,
    Topics,
    Flashcards,
    Review,
}

/// Main application state
pub struct StudyApp {
    conn: Connection,
    catalog: Catalog,
    flashcards: FlashcardProgressStore,
    topics: TopicProgressStore,
    current_date: DateTime<Utc>,

    current_screen: AppScreen,
    review: Option<ReviewQueue>,

    selected_topic: Option<usize>,
    practice_draft: u8,
    master_draft: u8,

    show_reset_dialog: bool,
    show_result_dialog: bool,
    result_message: String,
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.current_screen != AppScreen::Review {
            egui::TopBottomPanel::top("screens").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.current_screen, AppScreen::Dashboard, "Dashboard");
                    ui.selectable_value(&mut self.current_screen, AppScreen::Topics, "Topics");
                    ui.selectable_value(&mut self.current_screen, AppScreen::Flashcards, "Flashcards");
                });
            });
        }

        match self.current_screen {
            AppScreen::Dashboard => self.render_dashboard(ctx),
            AppScreen::Topics => self.render_topics_screen(ctx),
            AppScreen::Flashcards => self.render_flashcards_screen(ctx),
            AppScreen::Review => self.render_review_screen(ctx),
        }

        // Close any open review session before the window goes away
        if ctx.input(|i| i.viewport().close_requested()) && self.review.is_some() {
            self.finish_review();
        }

        if self.show_reset_dialog {
            egui::Window::new("Reset all flashcard progress?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Every card becomes new again. This cannot be undone.");
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_reset_dialog = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_reset_dialog = false;
                            self.review = None;
                            self.flashcards.reset_all();
                            self.persist();
                        }
                    });
                });
        }

        if self.show_result_dialog {
            egui::Window::new("Import/Export Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl StudyApp {
    /// Creates a new application instance with progress loaded from the database
    pub fn new(
        conn: Connection,
        catalog: Catalog,
        flashcards: FlashcardProgressStore,
        topics: TopicProgressStore,
    ) -> Self {
        let current_date = db::get_current_date(&conn).unwrap_or_else(|e| {
            warn!("Falling back to the system clock: {}", e);
            Utc::now()
        });
        Self {
            conn,
            catalog,
            flashcards,
            topics,
            current_date,
            current_screen: AppScreen::Dashboard,
            review: None,
            selected_topic: None,
            practice_draft: 0,
            master_draft: 0,
            show_reset_dialog: false,
            show_result_dialog: false,
            result_message: String::new(),
        }
    }

    fn show_message(&mut self, message: String) {
        self.result_message = message;
        self.show_result_dialog = true;
    }

    /// Writes both progress stores back after every change.
    fn persist(&mut self) {
        let saved = db::save_flashcard_store(&self.conn, &self.flashcards)
            .and_then(|_| db::save_topic_store(&self.conn, &self.topics));
        if let Err(e) = saved {
            error!("Failed to save progress: {}", e);
            self.show_message(format!("Failed to save progress: {}", e));
        }
    }

    /// Renders readiness, weak areas, the study plan and flashcard statistics
    fn render_dashboard(&mut self, ctx: &egui::Context) {
        let metrics = compute_metrics(
            &self.topics.completed_topics,
            self.flashcards.all_progress(),
            &self.catalog,
            self.current_date,
        );
        let stats = self.flashcards.statistics(self.current_date);

        let mut action_next_day = false;
        let mut action_export = false;
        let mut action_import = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.current_date.format("%Y-%m-%d").to_string());
                if ui.button("Next Day").clicked() {
                    action_next_day = true;
                }
                ui.separator();
                if ui.button("Export Progress").clicked() {
                    action_export = true;
                }
                if ui.button("Import Progress").clicked() {
                    action_import = true;
                }
            });
            ui.separator();

            ui.heading(format!("Exam Readiness: {}%", metrics.overall_score));
            ui.label(metrics.status().message());
            ui.add(egui::ProgressBar::new(metrics.overall_score as f32 / 100.0));

            egui::Grid::new("readiness_components")
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Topics started");
                    ui.label(format!("{}%", metrics.completion_rate));
                    ui.end_row();
                    ui.label("Practice average");
                    ui.label(format!("{}%", metrics.practice_average));
                    ui.end_row();
                    ui.label("Master average");
                    ui.label(format!("{}%", metrics.master_average));
                    ui.end_row();
                    ui.label("Flashcard mastery");
                    ui.label(format!("{}%", metrics.flashcard_mastery));
                    ui.end_row();
                });

            ui.separator();
            ui.heading("Weak Areas");
            if metrics.weak_areas.is_empty() {
                ui.label("No weak areas yet. Keep practicing!");
            }
            for area in &metrics.weak_areas {
                ui.label(format!("{} ({}%)", area.topic_name, area.score));
            }

            ui.separator();
            ui.heading("3-Day Study Plan");
            egui::ScrollArea::vertical()
                .id_source("study_plan")
                .max_height(220.0)
                .show(ui, |ui| {
                    for day in &metrics.study_plan {
                        ui.group(|ui| {
                            ui.label(format!(
                                "Day {} ({}) - {} min",
                                day.day,
                                day.date.format("%a %d %b"),
                                day.total_minutes
                            ));
                            if day.topics.is_empty() {
                                ui.label("   Free day");
                            }
                            for topic in &day.topics {
                                ui.label(format!(
                                    "   {} - {} min [{}]",
                                    topic.topic_name,
                                    topic.time_allocation,
                                    priority_label(topic.priority)
                                ));
                            }
                        });
                    }
                });

            ui.separator();
            ui.label(format!(
                "Flashcards: {} reviewed, {} learning, {} review, {} mastered, {} due",
                stats.total, stats.learning, stats.review, stats.mastered, stats.due_today
            ));
        });

        if action_next_day {
            match db::advance_day(&self.conn) {
                Ok(date) => self.current_date = date,
                Err(e) => self.show_message(format!("Failed to advance the date: {}", e)),
            }
        }
        if action_export {
            self.handle_export();
        }
        if action_import {
            self.handle_import();
        }
    }

    /// Renders the topic list with learn/practice/master controls for the selected topic
    fn render_topics_screen(&mut self, ctx: &egui::Context) {
        let now = self.current_date;
        let mut action_select: Option<usize> = None;
        let mut action_learned = false;
        let mut action_practice = false;
        let mut action_master = false;
        let mut action_toggle_unlock = false;
        let mut action_reset_topics = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("Topics ({})", self.catalog.topics.len()));
                if ui.button("Reset Topic Progress").clicked() {
                    action_reset_topics = true;
                }
            });

            egui::ScrollArea::vertical()
                .id_source("topics_list")
                .max_height(260.0)
                .show(ui, |ui| {
                    for (i, topic) in self.catalog.topics.iter().enumerate() {
                        let unlocked = self.topics.is_topic_unlocked(&topic.id, &topic.prerequisites);
                        let status = match self.topics.get(&topic.id) {
                            Some(p) if p.learn_completed => format!("learned, practice {}%", p.practice_score),
                            Some(p) => format!("practice {}%", p.practice_score),
                            None if unlocked => "not started".to_string(),
                            None => "locked".to_string(),
                        };
                        let label = format!("Ch {} · {} ({})", topic.chapter, topic.name, status);
                        if ui
                            .selectable_label(self.selected_topic == Some(i), label)
                            .clicked()
                        {
                            action_select = Some(i);
                        }
                    }
                });

            ui.separator();

            let Some(topic) = self.selected_topic.and_then(|i| self.catalog.topics.get(i)) else {
                ui.label("Select a topic to record progress");
                return;
            };

            ui.heading(&topic.name);
            ui.label(format!(
                "{:?} · about {} min",
                topic.difficulty,
                topic.estimated_minutes()
            ));
            let unlocked = self.topics.is_topic_unlocked(&topic.id, &topic.prerequisites);
            if !topic.prerequisites.is_empty() {
                ui.label(format!("Prerequisites: {}", topic.prerequisites.join(", ")));
            }
            if let Some(p) = self.topics.get(&topic.id) {
                ui.label(format!(
                    "Practice {}% · Master {}% · {} attempts",
                    p.practice_score, p.master_score, p.attempts
                ));
            }

            if !unlocked {
                ui.label("Locked until the prerequisites are learned.");
            }
            let overridden = self.topics.unlock_override.iter().any(|id| *id == topic.id);
            if !topic.prerequisites.is_empty() {
                let text = if overridden { "Remove skip-ahead" } else { "Skip ahead (unlock)" };
                if ui.button(text).clicked() {
                    action_toggle_unlock = true;
                }
            }

            ui.add_enabled_ui(unlocked, |ui| {
                if ui.button("Mark Learn Content Complete").clicked() {
                    action_learned = true;
                }
                ui.horizontal(|ui| {
                    ui.add(egui::Slider::new(&mut self.practice_draft, 0..=100).text("Practice"));
                    if ui.button("Record").clicked() {
                        action_practice = true;
                    }
                });
                ui.horizontal(|ui| {
                    ui.add(egui::Slider::new(&mut self.master_draft, 0..=100).text("Master"));
                    if ui.button("Record").clicked() {
                        action_master = true;
                    }
                });
            });
        });

        if let Some(i) = action_select {
            self.selected_topic = Some(i);
        }
        if action_reset_topics {
            self.topics.reset();
            self.persist();
            return;
        }
        let Some(topic_id) = self
            .selected_topic
            .and_then(|i| self.catalog.topics.get(i))
            .map(|t| t.id.clone())
        else {
            return;
        };

        let mut changed = true;
        if action_learned {
            self.topics.mark_learn_complete(&topic_id, now);
        } else if action_practice {
            if let Err(e) = self.topics.update_practice_score(&topic_id, self.practice_draft, now) {
                self.show_message(e.to_string());
            }
        } else if action_master {
            if let Err(e) = self.topics.update_master_score(&topic_id, self.master_draft, now) {
                self.show_message(e.to_string());
            }
        } else if action_toggle_unlock {
            if self.topics.unlock_override.contains(&topic_id) {
                self.topics.remove_unlock_override(&topic_id);
            } else {
                self.topics.add_unlock_override(&topic_id);
            }
        } else {
            changed = false;
        }
        if changed {
            self.persist();
        }
    }

    /// Renders flashcard statistics, the card list and review controls
    fn render_flashcards_screen(&mut self, ctx: &egui::Context) {
        let now = self.current_date;
        let due_count = self.flashcards.due_cards(&self.catalog.flashcards, now).len();
        let stats = self.flashcards.statistics(now);
        let mut action_start = false;
        let mut action_reset: Option<String> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("Flashcards ({})", self.catalog.flashcards.len()));
            let untracked = self.catalog.flashcards.len().saturating_sub(stats.total);
            ui.label(format!(
                "New {} · Learning {} · Review {} · Mastered {}",
                untracked + stats.new,
                stats.learning,
                stats.review,
                stats.mastered
            ));

            ui.horizontal(|ui| {
                let start = ui.add_enabled(due_count > 0, egui::Button::new(format!("Start Review ({} due)", due_count)));
                if start.clicked() {
                    action_start = true;
                }
                if ui.button("Reset All Progress").clicked() {
                    self.show_reset_dialog = true;
                }
            });

            ui.separator();

            egui::ScrollArea::vertical()
                .id_source("flashcards_list")
                .show(ui, |ui| {
                    for card in &self.catalog.flashcards {
                        ui.group(|ui| {
                            ui.label(&card.front);
                            match self.flashcards.progress(&card.id) {
                                Some(p) => {
                                    ui.horizontal(|ui| {
                                        ui.label(format!(
                                            "{} · next {} · {}/{} correct",
                                            p.mastery_level().label(),
                                            p.next_review().format("%Y-%m-%d"),
                                            p.correct_reviews(),
                                            p.total_reviews()
                                        ));
                                        if ui.small_button("Reset").clicked() {
                                            action_reset = Some(card.id.clone());
                                        }
                                    });
                                }
                                None => {
                                    ui.label("New");
                                }
                            }
                        });
                    }
                });
        });

        if let Some(card_id) = action_reset {
            self.flashcards.reset_one(&card_id);
            self.persist();
        }
        if action_start {
            self.start_review();
        }
    }

    /// Renders the review screen: front, reveal, grade
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let mut action_flip = false;
        let mut action_grade: Option<u8> = None;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(queue) = &self.review else {
                ui.label("No review in progress.");
                if ui.button("Back").clicked() {
                    action_back = true;
                }
                return;
            };

            ui.heading("Flashcard Review");
            ui.label(queue.phase_message());
            ui.label(format!(
                "Progress: {} / {} recalled ({} remaining)",
                queue.recalled_count(),
                queue.total_count(),
                queue.remaining_count()
            ));

            ui.add_space(20.0);

            if queue.is_completed() {
                ui.heading("Congratulations!");
                ui.label("Every due card has been recalled.");
                ui.add_space(20.0);
                if ui.button("Back to Flashcards").clicked() {
                    action_back = true;
                }
                return;
            }

            if let Some(card) = queue.current_card() {
                let show_back = queue.show_back;

                ui.group(|ui| {
                    ui.set_min_height(200.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading(&card.flashcard.front);
                        ui.add_space(20.0);
                        if show_back {
                            ui.label(&card.flashcard.back);
                        } else {
                            ui.label("(Click 'Show Answer' to reveal)");
                        }
                        ui.add_space(20.0);
                    });
                });

                ui.add_space(20.0);

                if !show_back {
                    if ui.button("Show Answer").clicked() {
                        action_flip = true;
                    }
                } else if !card.recalled {
                    ui.label("How well did you recall it?");
                    ui.horizontal(|ui| {
                        for (quality, label) in GRADE_BUTTONS {
                            if ui.button(label).clicked() {
                                action_grade = Some(quality);
                            }
                        }
                    });
                }
            }

            ui.add_space(20.0);
            if ui.button("End Review").clicked() {
                action_back = true;
            }
        });

        if action_flip {
            if let Some(queue) = self.review.as_mut() {
                queue.flip();
            }
        }
        if let Some(quality) = action_grade {
            self.grade(quality);
        }
        if action_back {
            self.finish_review();
        }
    }

    /// Starts a review over every card due at the current date
    fn start_review(&mut self) {
        let due: Vec<_> = self
            .flashcards
            .due_cards(&self.catalog.flashcards, self.current_date)
            .into_iter()
            .cloned()
            .collect();
        if due.is_empty() {
            return;
        }

        let topic_ids: BTreeSet<String> = due.iter().map(|c| c.topic_id.clone()).collect();
        self.flashcards
            .start_session(topic_ids.into_iter().collect(), self.current_date);
        self.review = Some(ReviewQueue::new(due));
        self.current_screen = AppScreen::Review;
        self.persist();
    }

    fn grade(&mut self, quality: u8) {
        let now = self.current_date;
        let result = match self.review.as_mut() {
            Some(queue) => queue
                .grade_current_card(&mut self.flashcards, quality, now)
                .map(|_| queue.next_card()),
            None => return,
        };
        match result {
            Ok(()) => self.persist(),
            Err(e) => {
                error!("Grading failed: {}", e);
                self.show_message(e.to_string());
            }
        }
    }

    fn finish_review(&mut self) {
        self.flashcards.end_session(self.current_date);
        self.review = None;
        self.current_screen = AppScreen::Flashcards;
        self.persist();
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            flashcards: self.flashcards.clone(),
            topics: self.topics.clone(),
        }
    }

    /// Handles progress export to a JSON file
    fn handle_export(&mut self) {
        // Open file save dialog
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("exam-progress.json")
            .add_filter("JSON files", &["json"])
            .save_file()
        else {
            return;
        };

        match export_progress_to_path(&self.snapshot(), &path) {
            Ok(_) => self.show_message(format!("Progress exported to {}", path.display())),
            Err(e) => self.show_message(format!("Export failed: {}", e)),
        }
    }

    /// Handles progress import from a JSON file, replacing the current progress
    fn handle_import(&mut self) {
        // Open file selection dialog
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };
        self.import_from(&path);
    }

    fn import_from(&mut self, path: &Path) {
        match import_progress(path) {
            Ok(snapshot) => {
                warn!("Replacing current progress with {}", path.display());
                self.review = None;
                self.flashcards = snapshot.flashcards;
                self.topics = snapshot.topics;
                self.persist();
                self.show_message(format!(
                    "Imported {} flashcard records and {} topics",
                    self.flashcards.all_progress().len(),
                    self.topics.completed_topics.len()
                ));
            }
            Err(e) => self.show_message(format!(
                "Import failed: {}\n\nPlease check the file has the structure:\n{{\n  \"flashcards\": {{...}},\n  \"topics\": {{...}}\n}}",
                e
            )),
        }
    }
}
