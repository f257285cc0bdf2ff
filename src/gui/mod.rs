use crate::console::{Console, Options, Outcome};
use eframe::{App, egui};
use egui::Color32;
use egui_extras::syntax_highlighting::CodeTheme;

pub struct Application {
    console: Console,
    query: String,
    outcome: Option<Outcome>,
}

impl App for Application {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let max_rect = ui.max_rect();
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.set_width(max_rect.width() * 0.5);
                    self.draw_code_editor(max_rect.height() - 20., ui);
                    if ui.button("Parse").clicked() {
                        self.outcome = Some(self.console.run(self.query.trim()));
                    }
                });
                ui.separator();
                ui.vertical(|ui| match &self.outcome {
                    None => {
                        ui.label("No results yet.");
                    }
                    Some(outcome) => Self::draw_outcome(outcome, ui),
                });
            });
        });
    }
}

impl Application {
    pub fn new(options: Options) -> Self {
        Self {
            console: Console::new(options),
            query: String::new(),
            outcome: None,
        }
    }

    pub fn launch(self) -> eframe::Result {
        let options = eframe::NativeOptions::default();
        eframe::run_native("pubsql console", options, Box::new(|_cc| Ok(Box::new(self))))
    }

    fn draw_outcome(outcome: &Outcome, ui: &mut egui::Ui) {
        match &outcome.result {
            Ok(request) => {
                ui.colored_label(Color32::GREEN, format!("Parsed {} request.", request.kind()));
                ui.monospace(format!("{request:#?}"));
            }
            Err(err) => {
                ui.colored_label(Color32::RED, format!("Error: {err}"));
            }
        }
        ui.separator();
        egui::Grid::new("tokens").striped(true).show(ui, |ui| {
            ui.strong("kind");
            ui.strong("value");
            ui.end_row();
            for token in &outcome.tokens {
                ui.monospace(token.kind.as_str());
                ui.monospace(&*token.value);
                ui.end_row();
            }
        });
    }

    fn draw_code_editor(&mut self, height: f32, ui: &mut egui::Ui) {
        let mut layouter = |ui: &egui::Ui, buf: &dyn egui::TextBuffer, wrap_width: f32| {
            let mut layout_job = egui_extras::syntax_highlighting::highlight(
                ui.ctx(),
                ui.style(),
                &CodeTheme::dark(20.0),
                buf.as_str(),
                "SQL",
            );
            layout_job.wrap.max_width = wrap_width;
            ui.fonts_mut(|f| f.layout_job(layout_job))
        };
        egui::ScrollArea::vertical()
            .min_scrolled_height(height)
            .show(ui, |ui| {
                ui.take_available_height();
                let editor = egui::TextEdit::multiline(&mut self.query)
                    .font(egui::TextStyle::Monospace) // for cursor height
                    .code_editor()
                    .desired_rows(4)
                    .lock_focus(true)
                    .desired_width(f32::INFINITY)
                    .layouter(&mut layouter);
                ui.add(editor);
            });
    }
}
