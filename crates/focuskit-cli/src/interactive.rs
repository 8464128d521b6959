//! Interactive terminal timer.
//!
//! One loop iteration is one frame: pump the clock driver, redraw, then
//! wait up to `timer.frame_ms` for a key.

use std::collections::VecDeque;
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};
use focuskit_core::timer::SessionState;
use focuskit_core::{dispatch, ClockDriver, Config, Control, Event, FocusController, SystemClock};

const LOG_LINES: usize = 6;
const BAR_WIDTH: usize = 30;

struct Screen {
    writer: BufWriter<Stdout>,
}

impl Screen {
    fn new() -> Self {
        Screen {
            writer: BufWriter::new(io::stdout()),
        }
    }

    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )
    }

    fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn draw(&mut self, controller: &FocusController, log: &VecDeque<String>) -> io::Result<()> {
        let engine = controller.engine();
        let p = controller.progression();

        let mut lines = vec![
            format!(
                "Focuskit  Lv {}  {}/{} XP  streak {} (best {})",
                p.level,
                p.xp,
                p.level_cap(),
                p.daily_streak,
                p.best_streak
            ),
            String::new(),
        ];
        if engine.state() == SessionState::Idle {
            let presets: Vec<String> = controller
                .presets()
                .iter()
                .enumerate()
                .map(|(i, m)| format!("[{}] {m} min", i + 1))
                .collect();
            lines.push("Choose your quest".to_string());
            lines.push(presets.join("  "));
        } else {
            lines.push(format!(
                "{}  {}  [{}]  {}",
                engine.mode().label(),
                format_clock(engine.remaining_secs()),
                progress_bar(engine.progress(), BAR_WIDTH),
                state_label(engine.state())
            ));
            lines.push(String::new());
        }
        let mut custom = format!("[c] custom {} min  (+/- to adjust)", engine.custom_mins());
        if controller.bonus_available() {
            custom.push_str("  [n] bonus round");
        }
        lines.push(custom);
        lines.push(String::new());
        lines.extend(log.iter().cloned());
        lines.push(String::new());
        lines.push(Control::help().to_string());

        queue!(self.writer, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in lines.iter().enumerate() {
            queue!(self.writer, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        self.writer.flush()
    }
}

/// Run until the user quits. The terminal is restored even on error.
pub fn run(controller: &mut FocusController, config: &Config) -> io::Result<()> {
    let mut screen = Screen::new();
    screen.init()?;
    let result = event_loop(controller, config, &mut screen);
    let cleanup = screen.cleanup();
    result.and(cleanup)
}

fn event_loop(
    controller: &mut FocusController,
    config: &Config,
    screen: &mut Screen,
) -> io::Result<()> {
    let mut driver = ClockDriver::new(SystemClock::new());
    let frame = Duration::from_millis(config.timer.frame_ms.max(10));
    let mut log = VecDeque::with_capacity(LOG_LINES);

    loop {
        record(&mut log, controller.pump(&mut driver));
        screen.draw(controller, &log)?;

        if !event::poll(frame)? {
            continue;
        }
        let TermEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let control = match key.code {
            KeyCode::Esc => Some(Control::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Control::Quit)
            }
            KeyCode::Char(c) => Control::from_key(c),
            _ => None,
        };
        match control {
            Some(Control::Quit) => break,
            Some(control) => record(&mut log, dispatch(controller, control)),
            None => {}
        }
    }
    Ok(())
}

fn record(log: &mut VecDeque<String>, events: Vec<Event>) {
    for line in events.iter().filter_map(describe) {
        if log.len() == LOG_LINES {
            log.pop_front();
        }
        log.push_back(line);
    }
}

/// Human line for the events worth showing.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::SessionStarted { mode, .. } => format!("{} started", mode.label()),
        Event::SessionCompleted { outcome, .. } if outcome.full => "Focus complete".to_string(),
        Event::SessionCompleted { .. } => "Session ended".to_string(),
        Event::XpGranted { gained, .. } => format!("+{gained} XP"),
        Event::LevelUp { level, .. } => format!("Level up! You reached level {level}"),
        Event::AchievementUnlocked { achievement, .. } => {
            format!("Achievement unlocked: {}", achievement.title())
        }
        Event::Loot { item, .. } => format!("Loot drop: {item}"),
        Event::PartialXpBanked { gained, .. } => {
            format!("Partial XP banked: +{gained}. Bonus round? Press n")
        }
        _ => return None,
    };
    Some(line)
}

fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Ready => "ready",
        SessionState::Running => "running",
        SessionState::Paused => "paused",
        SessionState::Completed => "done",
    }
}

/// `mm:ss` with whole seconds truncated.
fn format_clock(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    format!("{minutes:02}:{seconds:02}")
}

fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(1200.0), "20:00");
        assert_eq!(format_clock(59.9), "00:59");
        assert_eq!(format_clock(-3.0), "00:00");
        assert_eq!(format_clock(10800.0), "180:00");
    }

    #[test]
    fn bar_fills_with_progress() {
        assert_eq!(progress_bar(0.0, 4), "----");
        assert_eq!(progress_bar(0.5, 4), "##--");
        assert_eq!(progress_bar(2.0, 4), "####");
    }

    #[test]
    fn log_keeps_latest_lines() {
        let mut log = VecDeque::new();
        for gained in 0..10 {
            record(
                &mut log,
                vec![Event::XpGranted {
                    gained,
                    xp: 0,
                    level: 1,
                    at: chrono::Utc::now(),
                }],
            );
        }
        assert_eq!(log.len(), LOG_LINES);
        assert_eq!(log.back().map(String::as_str), Some("+9 XP"));
    }
}
