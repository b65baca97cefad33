use anyhow::Result;
use async_channel::Receiver;
use eframe::egui::{Align, Align2, Color32, Grid, Layout, RichText, TextEdit};
use eframe::{egui, Frame};
use egui_extras::{Column, TableBuilder};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy::MidpointAwayFromZero;
use time::{OffsetDateTime, UtcOffset};

use calculator::{calculate_income, force_to_int, parse_working_hours, Salary, WorkingHours};
pub use config::{Config, InputStyle};
use ticker::Ticker;

mod calculator;
mod config;
mod ticker;

pub struct App {
    cfg: Config,
    offset: UtcOffset,
    salary_input: String,
    hours_input: String,
    running: Option<Running>,
    warn: Result<()>,
}

/// A submitted configuration and the ticker feeding its display.
struct Running {
    salary: Salary,
    hours: WorkingHours,
    ticker: Ticker,
    updates: Receiver<Decimal>,
    earned: Decimal,
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if let Some(running) = &mut self.running {
            while let Ok(earned) = running.updates.try_recv() {
                running.earned = earned;
            }
        }

        if let Err(e) = &self.warn {
            egui::TopBottomPanel::top("warn_panel").show(ctx, |ui| {
                let warn = RichText::from(e.to_string()).color(Color32::RED);
                ui.label(warn);
            });
        }

        egui::TopBottomPanel::bottom("bottom").show(ctx, |ui| {
            egui::widgets::global_dark_light_mode_switch(ui);
        });

        match self.cfg.input_style {
            InputStyle::Form => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if self.running.is_some() {
                        self.earnings_ui(ui);
                    } else {
                        self.config_form(ui);
                    }
                });
            }
            InputStyle::Dialog => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if self.running.is_some() {
                        self.earnings_ui(ui);
                    }
                });
                if self.running.is_none() {
                    egui::Window::new("Configure")
                        .collapsible(false)
                        .resizable(false)
                        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                        .show(ctx, |ui| self.config_form(ui));
                }
            }
        }
    }
}

impl App {
    pub fn new(cfg: Config, offset: UtcOffset) -> Self {
        Self {
            salary_input: cfg.salary.clone(),
            hours_input: cfg.hours.clone(),
            cfg,
            offset,
            running: None,
            warn: Ok(()),
        }
    }

    fn config_form(&mut self, ui: &mut egui::Ui) {
        Grid::new("config_form").num_columns(2).show(ui, |ui| {
            ui.label("Yearly salary");
            ui.add(TextEdit::singleline(&mut self.salary_input).hint_text(self.cfg.salary.as_str()));
            ui.end_row();

            ui.label("Working hours");
            ui.add(TextEdit::singleline(&mut self.hours_input).hint_text(self.cfg.hours.as_str()));
            ui.end_row();
        });

        if ui.button("Submit").clicked() {
            self.submit(ui.ctx());
        }
    }

    fn earnings_ui(&mut self, ui: &mut egui::Ui) {
        let Some(running) = &self.running else {
            return;
        };

        match self.cfg.input_style {
            InputStyle::Form => {
                let text = format!("{} € Earned Today", money(running.earned, 2));
                ui.label(RichText::new(text).heading().strong());
            }
            InputStyle::Dialog => {
                ui.label(format!("{} €", money(running.earned, 1)));
            }
        }

        ui.collapsing(format!("Breakdown ({})", running.hours), |ui| {
            breakdown_table(ui, &running.salary);
        });

        if ui.button("Reconfigure").clicked() {
            self.stop();
        }
    }

    /// Starts a ticker once both inputs parse. Anything unparseable leaves the form up without comment.
    fn submit(&mut self, ctx: &egui::Context) {
        let yearly = force_to_int(&self.salary_input);
        let hours = parse_working_hours(&self.hours_input);

        if hours.is_empty() || yearly == 0 {
            self.warn = Ok(());
            debug!(
                "ignoring submission: salary {:?}, hours {:?}",
                self.salary_input, self.hours_input
            );
            return;
        }

        self.warn = self.start(ctx, yearly, hours);
        if let Err(e) = &self.warn {
            warn!("submission rejected: {e}");
        }
    }

    fn start(&mut self, ctx: &egui::Context, yearly: i64, hours: WorkingHours) -> Result<()> {
        let salary = calculate_income(yearly, &hours)?;
        self.stop();

        let (tx, updates) = async_channel::unbounded();
        let repaint = ctx.clone();
        let offset = self.offset;
        let ticker = Ticker::start(
            salary,
            hours,
            move || OffsetDateTime::now_utc().to_offset(offset).time(),
            self.cfg.tick,
            move |earned| {
                tx.try_send(earned)?;
                repaint.request_repaint();
                Ok(())
            },
        )?;

        info!("tracking {yearly} a year over {hours}");
        self.running = Some(Running {
            salary,
            hours,
            ticker,
            updates,
            earned: Decimal::ZERO,
        });

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.ticker.cancel();
            if let Err(e) = running.ticker.join() {
                warn!("{e}");
            }
            info!("stopped tracking {}", running.hours);
        }
    }
}

fn breakdown_table(ui: &mut egui::Ui, salary: &Salary) {
    let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
    let rows = [
        ("Yearly", money(Decimal::from(salary.yearly), 2)),
        ("Monthly", money(salary.monthly, 2)),
        ("Daily", money(salary.daily, 2)),
        ("Hourly", money(salary.hourly, 2)),
        ("Per second", money(salary.secondly, 4)),
    ];

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto())
        .column(Column::remainder())
        .header(text_height, |mut header| {
            header.col(|ui| {
                ui.strong("Per");
            });
            header.col(|ui| {
                ui.strong("Income (€)");
            });
        })
        .body(|mut body| {
            for (label, value) in rows {
                body.row(text_height, |mut row| {
                    row.col(|ui| {
                        ui.label(label);
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });
}

fn money(value: Decimal, dp: u32) -> String {
    format!(
        "{:.*}",
        dp as usize,
        value.round_dp_with_strategy(dp, MidpointAwayFromZero)
    )
}
