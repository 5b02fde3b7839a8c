//! Study window and its event wiring.
//! Network calls run on worker threads; replies are applied at the start of each frame.

use eframe::egui;
use flashcards_study::api::client::LOGIN_PAGE;
use flashcards_study::api::{ApiError, HttpTransport, StudyApi, User};
use flashcards_study::models::{
    Card, Face, LearningSession, Phase, Quality, ReviewOutcome, ReviewRequest,
};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use tracing::{debug, info, warn};

/// Worker replies delivered to the UI thread
enum Reply {
    Probe(Result<User, ApiError>),
    DueCards(Result<Vec<Card>, ApiError>),
    Review(ReviewRequest, Result<(), ApiError>),
}

pub struct StudyApp {
    api: StudyApi<HttpTransport>,
    session: LearningSession,
    user: Option<String>,
    replies: Receiver<Reply>,
    sender: Sender<Reply>,
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_replies();

        match self.session.phase() {
            Phase::Loading => self.render_loading(ctx),
            Phase::Active => self.render_card(ctx),
            Phase::Complete => self.render_complete(ctx),
            Phase::SignedOut => self.render_signed_out(ctx),
        }

        if let Some(notice) = self.session.notice().map(str::to_string) {
            egui::Window::new("Review failed")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&notice);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.session.dismiss_notice();
                    }
                });
        }
    }
}

impl StudyApp {
    /// Creates the window state and starts the sign-in probe and due-card fetch
    pub fn new(
        api: StudyApi<HttpTransport>,
        session: LearningSession,
        ctx: &egui::Context,
    ) -> Self {
        let (sender, replies) = channel();
        let app = Self {
            api,
            session,
            user: None,
            replies,
            sender,
        };
        app.start_loading(ctx.clone());
        app
    }

    fn start_loading(&self, ctx: egui::Context) {
        let api = self.api.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let probe = api.current_user();
            let signed_in = probe.is_ok();
            if sender.send(Reply::Probe(probe)).is_err() {
                return;
            }
            if signed_in {
                let _ = sender.send(Reply::DueCards(api.due_cards()));
            }
            ctx.request_repaint();
        });
    }

    fn start_review(&mut self, quality: Quality, ctx: &egui::Context) {
        let request = match self.session.begin_review(quality) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "review input ignored");
                return;
            }
        };

        let api = self.api.clone();
        let sender = self.sender.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = api.submit_review(request.card_id, request.quality);
            let _ = sender.send(Reply::Review(request, result));
            ctx.request_repaint();
        });
    }

    fn drain_replies(&mut self) {
        while let Ok(reply) = self.replies.try_recv() {
            match reply {
                Reply::Probe(Ok(user)) => {
                    info!(user = ?user.username, "signed in");
                    self.user = user.username;
                }
                Reply::Probe(Err(e)) => {
                    warn!(error = %e, "sign-in check failed");
                    self.session.sign_out();
                }
                Reply::DueCards(result) => self.session.load(result),
                Reply::Review(request, result) => {
                    let outcome = self.session.finish_review(request, result);
                    debug!(?outcome, "review finished");
                    if outcome == ReviewOutcome::SignedOut {
                        self.user = None;
                    }
                }
            }
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Study");
            if let Some(user) = &self.user {
                ui.label(format!("({user})"));
            }
        });
        ui.label(format!(
            "Started {} · {} reviewed",
            self.session.started_at().format("%H:%M"),
            self.session.reviewed_count()
        ));
        ui.separator();
    }

    fn render_loading(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading due cards...");
            });
        });
    }

    /// Renders the active card with its reveal and rating controls
    fn render_card(&mut self, ctx: &egui::Context) {
        let Some(view) = self.session.presentation().view().cloned() else {
            return;
        };
        let face = self.session.presentation().face();
        let submitting = self.session.is_submitting();
        let schedule = self
            .session
            .current_card()
            .map(Card::schedule_summary)
            .unwrap_or_default();

        // Store actions to execute after UI rendering
        let mut action_reveal = false;
        let mut action_grade: Option<Quality> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.label(view.progress.to_string());
            ui.small(schedule);

            ui.add_space(20.0);

            ui.group(|ui| {
                ui.set_min_height(200.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);

                    ui.heading("Question:");
                    ui.label(&view.question);

                    ui.add_space(20.0);

                    match &view.answer {
                        Some(answer) => {
                            ui.heading("Answer:");
                            ui.label(answer);
                        }
                        None => {
                            ui.label("(Click 'Show Answer' to reveal)");
                        }
                    }

                    ui.add_space(20.0);
                });
            });

            ui.add_space(20.0);

            if face == Face::Hidden {
                if ui.button("Show Answer").clicked() {
                    action_reveal = true;
                }
            } else {
                ui.label("Rate your response:");
                for row in Quality::ALL.chunks(3) {
                    ui.horizontal(|ui| {
                        for &quality in row {
                            let button = egui::Button::new(quality.to_string());
                            if ui.add_enabled(!submitting, button).clicked() {
                                action_grade = Some(quality);
                            }
                        }
                    });
                }
                if submitting {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Saving review...");
                    });
                }
            }
        });

        ctx.input(|input| {
            if face == Face::Hidden && input.key_pressed(egui::Key::Space) {
                action_reveal = true;
            }
            if face == Face::Revealed && !submitting {
                for (key, quality) in QUALITY_KEYS.iter().zip(Quality::ALL) {
                    if input.key_pressed(*key) {
                        action_grade = Some(quality);
                    }
                }
            }
        });

        // Execute deferred actions
        if action_reveal {
            self.session.show_answer();
        }
        if let Some(quality) = action_grade {
            self.start_review(quality, ctx);
        }
    }

    fn render_complete(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.add_space(20.0);
            ui.heading("No more due cards");
            ui.label("You've reviewed everything that is due. Come back later!");
        });
    }

    fn render_signed_out(&self, ctx: &egui::Context) {
        let login_url = self.api.transport().url(LOGIN_PAGE);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Sign-in required");
            ui.label("Your session is not signed in or has expired.");
            ui.add_space(10.0);
            ui.hyperlink_to("Sign in", &login_url);
            ui.label("Then restart the app with the new session cookie.");
        });
    }
}

const QUALITY_KEYS: [egui::Key; 6] = [
    egui::Key::Num0,
    egui::Key::Num1,
    egui::Key::Num2,
    egui::Key::Num3,
    egui::Key::Num4,
    egui::Key::Num5,
];
