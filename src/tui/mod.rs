//! TUI module - one-day dashboard with ratatui

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
};
use std::io::{Stdout, stdout};

use crate::plan::{Language, MealKey};
use crate::tracker::{DaySummary, Tracker};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// ml added by one press of `w`
pub const WATER_STEP_ML: i32 = 250;

/// App state for TUI
pub struct App {
    tracker: Tracker,
    day: usize,
    summary: Option<DaySummary>,
    should_quit: bool,
}

impl App {
    pub fn new(tracker: Tracker) -> Self {
        let day = tracker.today();
        let summary = tracker.summary(day);
        Self {
            tracker,
            day,
            summary,
            should_quit: false,
        }
    }

    pub fn day(&self) -> usize {
        self.day
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn refresh(&mut self) {
        self.summary = self.tracker.summary(self.day);
    }

    fn lang(&self) -> Language {
        self.tracker.profile().language
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let lang = self.lang();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let Some(s) = &self.summary else {
            let empty =
                Paragraph::new("No plan days").block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        };

        // Header
        let header = Paragraph::new(format!(
            "ketoday - {} / {} · {} kcal · {}",
            s.plan.day_label,
            self.tracker.total_days(),
            s.totals.goal,
            s.plan.macros
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Meal table
        let cheat_key = s.cheat.as_ref().map(|c| c.meal_key);
        let rows: Vec<Row> = s
            .plan
            .meals
            .iter()
            .enumerate()
            .map(|(i, (key, slot))| {
                let done = s.meals.get(key);
                let mut name = slot.name.clone();
                if slot.is_ai {
                    name.push_str(" (AI)");
                }
                if cheat_key == Some(key) {
                    name.push_str(" *");
                }
                let style = if done {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(if done { "[x]" } else { "[ ]" }),
                    Cell::from(key.label(lang)),
                    Cell::from(name),
                    Cell::from(slot.qty.clone()),
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(10),
                Constraint::Length(30),
                Constraint::Min(20),
            ],
        )
        .header(
            Row::new(match lang {
                Language::Es => vec!["#", "", "Comida", "Plato", "Cantidad"],
                Language::En => vec!["#", "", "Meal", "Dish", "Quantity"],
            })
            .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title(match lang {
            Language::Es => "Comidas",
            Language::En => "Meals",
        }));
        frame.render_widget(table, chunks[1]);

        // Calories
        let kcal_ratio = ratio(s.totals.net, s.totals.goal);
        let kcal_color = if s.totals.remaining < 0 { Color::Red } else { Color::Yellow };
        let kcal = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("kcal"))
            .gauge_style(Style::default().fg(kcal_color))
            .ratio(kcal_ratio)
            .label(format!(
                "{} / {} (+{} extra, -{} ex) · {} left",
                s.totals.net,
                s.totals.goal,
                s.totals.from_extras,
                s.totals.burned,
                s.totals.remaining
            ));
        frame.render_widget(kcal, chunks[2]);

        // Water
        let water = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(match lang {
                Language::Es => "Agua",
                Language::En => "Water",
            }))
            .gauge_style(Style::default().fg(Color::Blue))
            .ratio(ratio(s.water.ml, s.water.goal))
            .label(format!("{} / {} ml", s.water.ml, s.water.goal));
        frame.render_widget(water, chunks[3]);

        // Footer
        let footer =
            Paragraph::new("q: quit | ←/→: day | 1-5: toggle meal | w: +250 ml | r: refresh")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[4]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key.code);
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Left => {
                self.day = self.day.saturating_sub(1);
                self.refresh();
            }
            KeyCode::Right => {
                if self.day + 1 < self.tracker.total_days() {
                    self.day += 1;
                }
                self.refresh();
            }
            KeyCode::Char('w') => {
                self.tracker.add_water(self.day, WATER_STEP_ML);
                self.refresh();
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(meal) = MealKey::parse(&c.to_string()) {
                    self.tracker.toggle_meal(self.day, meal);
                    self.refresh();
                }
            }
            _ => {}
        }
    }
}

fn ratio(value: i32, goal: i32) -> f64 {
    if goal <= 0 {
        return 0.0;
    }
    (value as f64 / goal as f64).clamp(0.0, 1.0)
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
