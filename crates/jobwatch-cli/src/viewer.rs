//! Notification viewer window.

use eframe::egui;
use jobwatch_core::storage::NotificationLog;

use crate::commands::CliResult;

const WINDOW_TITLE: &str = "Notification Viewer";

/// Read-only view of the notification log with a manual refresh.
pub struct NotificationViewer {
    log: NotificationLog,
    content: String,
}

impl NotificationViewer {
    pub fn new(log: NotificationLog) -> Self {
        let content = log.read_for_display();
        Self { log, content }
    }

    pub fn refresh(&mut self) {
        self.content = self.log.read_for_display();
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl eframe::App for NotificationViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            if ui.button("Refresh").clicked() {
                self.refresh();
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    // &str is a read-only text buffer
                    let mut text = self.content.as_str();
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .desired_width(f32::INFINITY)
                            .font(egui::TextStyle::Monospace),
                    );
                });
        });
    }
}

/// Open the viewer and block until the window is closed.
pub fn run(log: NotificationLog) -> CliResult {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(NotificationViewer::new(log)))),
    )?;
    Ok(())
}
