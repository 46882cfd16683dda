//! Terminal rendering for the encounter.
//!
//! Everything draws from a [`Snapshot`]; the layout helpers are pure so
//! the input loop can reuse them for mouse hit-testing.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::core::encounter::RoundPhase;
use crate::core::view::Snapshot;
use crate::leaderboard::ScoreEntry;

/// Transient presentation state owned by the main loop.
pub struct UiState {
    pub name_input: String,
    pub leaderboard: Vec<ScoreEntry>,
    pub score_submitted: bool,
}

/// Screen regions. Computed from the terminal size alone so the event
/// loop can map mouse clicks to the same rectangles.
pub struct ScreenLayout {
    pub header: Rect,
    pub targets: Rect,
    pub sidebar: Rect,
    pub footer: Rect,
}

pub fn screen_layout(size: Rect) -> ScreenLayout {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(size);

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(v_chunks[1]);

    ScreenLayout {
        header: v_chunks[0],
        targets: h_chunks[0],
        sidebar: h_chunks[1],
        footer: v_chunks[2],
    }
}

/// Interior of the bordered party panel; target rows stack inside this.
pub fn targets_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// One 3-line row per target, top to bottom. Index into the result is the
/// target index; clicks outside every row hit nothing.
pub fn target_bar_areas(area: Rect, count: usize) -> Vec<Rect> {
    let mut areas = Vec::with_capacity(count);
    let row_height = 3u16;
    for i in 0..count {
        let y = area.y + row_height * i as u16;
        if y + row_height > area.y + area.height {
            break;
        }
        areas.push(Rect::new(area.x, y, area.width, row_height));
    }
    areas
}

pub fn hit_target(area: Rect, count: usize, column: u16, row: u16) -> Option<usize> {
    target_bar_areas(area, count)
        .iter()
        .position(|rect| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
}

pub fn draw_ui(frame: &mut Frame, snapshot: &Snapshot, ui: &UiState) {
    let layout = screen_layout(frame.size());

    match snapshot.phase {
        RoundPhase::NotStarted => draw_title_screen(frame, ui),
        RoundPhase::Ended => draw_game_over(frame, snapshot, ui),
        RoundPhase::InRound | RoundPhase::PostRound => {
            draw_header(frame, layout.header, snapshot);
            draw_targets(frame, layout.targets, snapshot);
            draw_sidebar(frame, layout.sidebar, snapshot);
            draw_footer(frame, layout.footer, snapshot);
        }
    }
}

fn draw_title_screen(frame: &mut Frame, ui: &UiState) {
    let area = frame.size();
    let mut lines = vec![
        Line::from(Span::styled(
            "WARDKEEPER",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Keep the party alive for as many rounds as you can."),
        Line::from(""),
        Line::from("Click a target to heal it. Hold modifiers for other spells."),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Start    [Q] Quit",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "── Leaderboard ──",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    for entry in &ui.leaderboard {
        lines.push(Line::from(format!("{:<20} round {}", entry.name, entry.round)));
    }
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_header(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let timer_color = if snapshot.time_remaining < 5.0 {
        Color::Red
    } else {
        Color::White
    };
    let mut spans = vec![
        Span::styled(
            format!(" Round {} ", snapshot.round),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {:>4.1}s ", snapshot.time_remaining),
            Style::default().fg(timer_color),
        ),
    ];
    if let Some(banner) = &snapshot.banner {
        spans.push(Span::styled(
            format!("  {}", banner.message),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let paragraph =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_targets(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default().title(" Party ").borders(Borders::ALL);
    let inner = targets_inner(area);
    frame.render_widget(block, area);

    for (target, row) in snapshot
        .targets
        .iter()
        .zip(target_bar_areas(inner, snapshot.targets.len()))
    {
        let ratio = if target.max_health > 0.0 {
            (target.health / target.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let hp_color = if ratio > 0.5 {
            Color::Green
        } else if ratio > 0.25 {
            Color::Yellow
        } else {
            Color::Red
        };
        let mut tags = Vec::new();
        if target.is_clone {
            tags.push("clone");
        }
        if target.shield > 0.0 {
            tags.push("shield");
        }
        if target.hot_active {
            tags.push("hot");
        }
        if target.protected {
            tags.push("ward");
        }
        if target.high_damage {
            tags.push("focus");
        }
        if target.warning_active {
            tags.push("!");
        }
        let title = if tags.is_empty() {
            format!(" {} ", target.label)
        } else {
            format!(" {} [{}] ", target.label, tags.join(" "))
        };
        let gauge = Gauge::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .gauge_style(Style::default().fg(hp_color).add_modifier(Modifier::BOLD))
            .ratio(ratio)
            .label(format!("{:.0}/{:.0}", target.health, target.max_health));
        frame.render_widget(gauge, row);
    }
}

fn draw_sidebar(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default().title(" Spells ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = snapshot
        .spells
        .iter()
        .map(|spell| {
            Line::from(vec![
                Span::styled(
                    format!("{:<14}", spell.name),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<15}", spell.binding),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:>3.0}", spell.mana_cost), Style::default().fg(Color::Blue)),
            ])
        })
        .collect();

    if !snapshot.available_unlocks.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Milestone! Pick one:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for (i, unlock) in snapshot.available_unlocks.iter().enumerate() {
            lines.push(Line::from(format!("  [{}] {}", i + 1, unlock.name)));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_footer(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    // Mana bar, with the post-round projection when one is pending.
    let mana_label = match (snapshot.mana.projected_mana, snapshot.mana.projected_max) {
        (Some(mana), Some(max)) if snapshot.phase == RoundPhase::PostRound => {
            format!(
                "{:.0}/{:.0} -> {:.0}/{:.0} next round",
                snapshot.mana.current, snapshot.mana.max, mana, max
            )
        }
        _ => format!(
            "{:.0}/{:.0}  (+{:.1}/s)",
            snapshot.mana.current, snapshot.mana.max, snapshot.mana.regen_per_second
        ),
    };
    let ratio = if snapshot.mana.max > 0.0 {
        (snapshot.mana.current / snapshot.mana.max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mana_gauge = Gauge::default()
        .block(Block::default().borders(Borders::TOP).title(" Mana "))
        .gauge_style(Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
        .ratio(ratio)
        .label(mana_label);
    frame.render_widget(mana_gauge, chunks[0]);

    // Cast bar, or the phase prompt.
    match (&snapshot.cast, snapshot.phase) {
        (Some(cast), _) => {
            let ratio = if cast.duration > 0.0 {
                (cast.progress / cast.duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::TOP).title(" Casting "))
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(ratio)
                .label(cast.name.clone());
            frame.render_widget(gauge, chunks[1]);
        }
        (None, RoundPhase::PostRound) => {
            let prompt = Paragraph::new(Line::from(Span::styled(
                "Round complete - [Space] next round",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )))
            .block(Block::default().borders(Borders::TOP));
            frame.render_widget(prompt, chunks[1]);
        }
        _ => {
            let hint = Paragraph::new(Line::from(Span::styled(
                "LMB heal | RMB flash | +Shift/Ctrl/Alt other spells",
                Style::default().fg(Color::DarkGray),
            )))
            .block(Block::default().borders(Borders::TOP));
            frame.render_widget(hint, chunks[1]);
        }
    }
}

fn draw_game_over(frame: &mut Frame, snapshot: &Snapshot, ui: &UiState) {
    let area = frame.size();
    let mut lines = vec![
        Line::from(Span::styled(
            "A TARGET HAS FALLEN",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("You survived {} rounds", snapshot.round)),
        Line::from(""),
    ];
    if ui.score_submitted {
        lines.push(Line::from(Span::styled(
            "── Leaderboard ──",
            Style::default().fg(Color::DarkGray),
        )));
        for entry in &ui.leaderboard {
            lines.push(Line::from(format!("{:<20} round {}", entry.name, entry.round)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[R] Play again    [Q] Quit",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from("Enter your name for the leaderboard:"));
        lines.push(Line::from(Span::styled(
            format!("> {}_", ui.name_input),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] Submit    [Esc] Skip",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bar_areas_stack_vertically() {
        let area = Rect::new(1, 2, 40, 12);
        let areas = target_bar_areas(area, 3);
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[0].y, 2);
        assert_eq!(areas[1].y, 5);
        assert_eq!(areas[2].y, 8);
        assert!(areas.iter().all(|r| r.height == 3 && r.width == 40));
    }

    #[test]
    fn test_target_bar_areas_clip_to_available_height() {
        let area = Rect::new(0, 0, 40, 7);
        let areas = target_bar_areas(area, 5);
        assert_eq!(areas.len(), 2);
    }

    #[test]
    fn test_hit_target_maps_click_to_row() {
        let area = Rect::new(0, 0, 40, 30);
        assert_eq!(hit_target(area, 3, 5, 1), Some(0));
        assert_eq!(hit_target(area, 3, 5, 4), Some(1));
        assert_eq!(hit_target(area, 3, 5, 8), Some(2));
        assert_eq!(hit_target(area, 3, 5, 20), None);
        assert_eq!(hit_target(area, 3, 50, 1), None);
    }
}
