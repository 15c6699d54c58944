//! Main window
//!
//! Thin presentation over [`UiState`](super::UiState): every button routes
//! straight into [`App`].

use anyhow::Result;
use eframe::egui::{self, Align2, Color32, RichText};
use std::sync::Arc;

use super::fonts;
use super::state::DialogKind;
use crate::app::App;
use crate::business::translation_controller::APP_TITLE;

#[cfg(any(target_os = "windows", target_os = "macos"))]
use super::system_tray::{SystemTray, TrayAction};

const STATUS_COLOR: Color32 = Color32::from_rgb(0, 119, 0);
const TRANSLATE_COLOR: Color32 = Color32::from_rgb(76, 175, 80);
const TOGGLE_COLOR: Color32 = Color32::from_rgb(255, 152, 0);
const RETRY_COLOR: Color32 = Color32::from_rgb(33, 150, 243);

struct TranslatorWindow {
    app: Arc<App>,
    #[cfg(any(target_os = "windows", target_os = "macos"))]
    tray: Option<SystemTray>,
    #[cfg(any(target_os = "windows", target_os = "macos"))]
    tray_label: String,
}

impl TranslatorWindow {
    fn new(cc: &eframe::CreationContext<'_>, app: Arc<App>) -> Self {
        fonts::install_cjk_fallback(&cc.egui_ctx);

        let ctx = cc.egui_ctx.clone();
        app.ui().set_repaint(move || ctx.request_repaint());
        app.ui().set_visible(true);

        #[cfg(any(target_os = "windows", target_os = "macos"))]
        let tray_label = app.hotkeys().toggle_label();
        #[cfg(any(target_os = "windows", target_os = "macos"))]
        let tray = match SystemTray::new(&tray_label, app.hotkeys().display()) {
            Ok(tray) => Some(tray),
            Err(e) => {
                tracing::warn!("System tray unavailable: {}", e);
                None
            }
        };

        Self {
            app,
            #[cfg(any(target_os = "windows", target_os = "macos"))]
            tray,
            #[cfg(any(target_os = "windows", target_os = "macos"))]
            tray_label,
        }
    }

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    fn handle_tray(&mut self, ctx: &egui::Context) {
        let Some(tray) = &self.tray else {
            return;
        };

        while let Some(action) = tray.poll() {
            match action {
                TrayAction::Translate => {
                    self.app.trigger_translation();
                }
                TrayAction::ToggleHotkey => {
                    self.app.toggle_hotkey();
                }
                TrayAction::ShowWindow => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(false));
                    ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
                }
                TrayAction::Quit => {
                    tracing::info!("Quit from tray");
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }

        let label = self.app.hotkeys().toggle_label();
        if label != self.tray_label {
            tray.set_toggle_label(&label);
            self.tray_label = label;
        }

        // Menu events do not wake egui on their own
        ctx.request_repaint_after(std::time::Duration::from_millis(150));
    }
}

impl eframe::App for TranslatorWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        #[cfg(any(target_os = "windows", target_os = "macos"))]
        self.handle_tray(ctx);

        let ui_state = self.app.ui().clone();
        let viewable = ctx.input(|i| is_viewable(i.viewport()));
        if ui_state.is_visible() != viewable {
            ui_state.set_visible(viewable);
        }
        let display = self.app.hotkeys().display().to_string();

        let mut translate = false;
        let mut toggle = false;
        let mut retry = false;
        let mut dismiss = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut state = ui_state.lock();

            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.heading(RichText::new("Clipboard to Japanese Translator").strong());
                ui.add_space(5.0);
                ui.label(format!(
                    "Press {} anywhere to translate text from clipboard\n\
                     or click 'Translate' button below.",
                    display
                ));
                ui.label(
                    RichText::new(state.hotkey_status.as_str())
                        .small()
                        .color(STATUS_COLOR),
                );
            });

            ui.add_space(10.0);
            let panel_height = (ui.available_height() - 120.0).max(120.0) / 2.0;

            ui.group(|ui| {
                ui.label("Original Text");
                egui::ScrollArea::vertical()
                    .id_salt("original")
                    .max_height(panel_height)
                    .show(ui, |ui| {
                        ui.add_sized(
                            [ui.available_width(), panel_height],
                            egui::TextEdit::multiline(&mut state.original_text),
                        );
                    });
            });

            ui.add_space(10.0);
            ui.group(|ui| {
                ui.label("Japanese Translation");
                egui::ScrollArea::vertical()
                    .id_salt("translated")
                    .max_height(panel_height)
                    .show(ui, |ui| {
                        ui.add_sized(
                            [ui.available_width(), panel_height],
                            egui::TextEdit::multiline(&mut state.translated_text),
                        );
                    });
            });

            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                ui.horizontal(|ui| {
                    let translate_button = egui::Button::new(
                        RichText::new("Translate Clipboard").color(Color32::WHITE),
                    )
                    .fill(TRANSLATE_COLOR);
                    if ui.add(translate_button).clicked() {
                        translate = true;
                    }

                    if state.show_toggle {
                        let toggle_button = egui::Button::new(
                            RichText::new(state.toggle_label.as_str()).color(Color32::WHITE),
                        )
                        .fill(TOGGLE_COLOR);
                        if ui.add(toggle_button).clicked() {
                            toggle = true;
                        }
                    }
                });

                if state.show_retry {
                    ui.add_space(10.0);
                    let retry_button = egui::Button::new(
                        RichText::new("Retry After Granting Permissions")
                            .strong()
                            .color(Color32::WHITE),
                    )
                    .fill(RETRY_COLOR);
                    if ui.add(retry_button).clicked() {
                        retry = true;
                    }
                }

                ui.add_space(5.0);
                ui.label(state.result_message.as_str());
            });

            if let Some(dialog) = &state.dialog {
                egui::Window::new(dialog.title.as_str())
                    .collapsible(false)
                    .resizable(false)
                    .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        let text = RichText::new(dialog.message.as_str());
                        let text = match dialog.kind {
                            DialogKind::Info => text,
                            DialogKind::Error => text.color(Color32::from_rgb(200, 40, 40)),
                        };
                        ui.label(text);
                        ui.add_space(8.0);
                        ui.vertical_centered(|ui| {
                            if ui.button("OK").clicked() {
                                dismiss = true;
                            }
                        });
                    });
            }
        });

        // Act after the state lock is released
        if dismiss {
            ui_state.update(|s| s.dialog = None);
        }
        if translate {
            self.app.trigger_translation();
        }
        if toggle {
            self.app.toggle_hotkey();
        }
        if retry {
            self.app.retry_permissions();
        }
    }
}

/// A minimized window is not on screen, so its panels are left alone
fn is_viewable(viewport: &egui::ViewportInfo) -> bool {
    !viewport.minimized.unwrap_or(false)
}

/// Open the main window and block until it is closed
pub fn run_app(app: Arc<App>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([600.0, 550.0])
            .with_min_inner_size([420.0, 420.0]),
        ..Default::default()
    };

    let window_app = app.clone();
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(TranslatorWindow::new(cc, window_app)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create main window: {}", e))?;

    tracing::info!("Main window closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimized_window_is_not_viewable() {
        let mut viewport = egui::ViewportInfo::default();
        assert!(is_viewable(&viewport));

        viewport.minimized = Some(true);
        assert!(!is_viewable(&viewport));

        viewport.minimized = Some(false);
        assert!(is_viewable(&viewport));
    }
}
