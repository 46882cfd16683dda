mod core;
mod leaderboard;
mod mana;
mod spells;
mod synergy;
mod targets;
mod ui;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
    MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::clock::Clock;
use crate::core::constants::{LEADERBOARD_NAME_MAX_CHARS, TICK_INTERVAL_MS};
use crate::core::encounter::{Encounter, EncounterEvent, RoundPhase};
use crate::leaderboard::Leaderboard;
use crate::spells::types::{spell_table_or_default, CastButton, Modifiers};
use crate::ui::{draw_ui, hit_target, screen_layout, targets_inner, UiState};

fn main() -> io::Result<()> {
    env_logger::init();

    // Handle CLI arguments
    let mut spell_table_path: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--spells" => match args.next() {
                Some(path) => spell_table_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("--spells requires a path");
                    std::process::exit(1);
                }
            },
            "--version" | "-v" => {
                println!("wardkeeper {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                println!("Wardkeeper - Terminal Encounter-Healing Game\n");
                println!("Usage: wardkeeper [options]\n");
                println!("Options:");
                println!("  --spells <path>  Load a custom spell table (JSON)");
                println!("  --version        Show version information");
                println!("  --help           Show this help message");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Run 'wardkeeper --help' for usage.");
                std::process::exit(1);
            }
        }
    }

    let table = spell_table_or_default(spell_table_path.as_deref());
    let mut encounter = Encounter::with_spell_table(table);
    let board = Leaderboard::new();
    let mut ui_state = UiState {
        name_input: String::new(),
        leaderboard: board.load(),
        score_submitted: false,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut encounter, &board, &mut ui_state);

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    encounter: &mut Encounter,
    board: &Leaderboard,
    ui_state: &mut UiState,
) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let mut clock = Clock::new();

    loop {
        let dt = clock.delta_seconds();
        for event in encounter.tick(dt) {
            if let EncounterEvent::Defeat { round, .. } = event {
                log::info!("defeated on round {round}");
                ui_state.name_input.clear();
                ui_state.score_submitted = false;
            }
        }

        let snapshot = encounter.snapshot();
        terminal.draw(|frame| draw_ui(frame, &snapshot, ui_state))?;

        if !event::poll(Duration::from_millis(TICK_INTERVAL_MS))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => match snapshot.phase {
                RoundPhase::NotStarted => match key.code {
                    KeyCode::Enter => {
                        encounter.start(&mut rng);
                        clock.rearm();
                    }
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                },
                RoundPhase::InRound => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    // Debug helpers
                    KeyCode::F(2) => encounter.debug_add_mana(50.0),
                    KeyCode::F(3) => {
                        encounter.skip_round_request();
                    }
                    _ => {}
                },
                RoundPhase::PostRound => match key.code {
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        encounter.advance_round_request(&mut rng);
                        clock.rearm();
                    }
                    KeyCode::Char(c @ '1'..='9') => {
                        let index = c as usize - '1' as usize;
                        if let Some(unlock) = snapshot.available_unlocks.get(index) {
                            encounter.unlock_request(unlock.id);
                        }
                    }
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                },
                RoundPhase::Ended => {
                    if ui_state.score_submitted {
                        match key.code {
                            KeyCode::Char('r') => {
                                encounter.reset();
                                ui_state.leaderboard = board.load();
                            }
                            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Enter => {
                                ui_state.leaderboard =
                                    board.submit(&ui_state.name_input, snapshot.round);
                                ui_state.score_submitted = true;
                            }
                            KeyCode::Esc => ui_state.score_submitted = true,
                            KeyCode::Backspace => {
                                ui_state.name_input.pop();
                            }
                            KeyCode::Char(c) => {
                                if ui_state.name_input.chars().count() < LEADERBOARD_NAME_MAX_CHARS
                                {
                                    ui_state.name_input.push(c);
                                }
                            }
                            _ => {}
                        }
                    }
                }
            },
            Event::Mouse(mouse) => {
                if snapshot.phase != RoundPhase::InRound {
                    continue;
                }
                let button = match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => CastButton::Primary,
                    MouseEventKind::Down(MouseButton::Right) => CastButton::Secondary,
                    _ => continue,
                };
                let modifiers = Modifiers {
                    shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
                    ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
                    alt: mouse.modifiers.contains(KeyModifiers::ALT),
                };
                let layout = screen_layout(terminal.size()?);
                let inner = targets_inner(layout.targets);
                if let Some(target) =
                    hit_target(inner, snapshot.targets.len(), mouse.column, mouse.row)
                {
                    if let Err(rejection) = encounter.cast_request(button, modifiers, target) {
                        log::debug!("cast rejected: {rejection}");
                    }
                }
            }
            _ => {}
        }
    }
}
