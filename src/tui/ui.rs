//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::Flag;
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: code and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory, program output, and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_output(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw the disassembly view, scrolled to keep the PC visible.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly();
    let visible = (area.height as usize).saturating_sub(2);
    let current = disasm.iter().position(|(_, _, cur)| *cur).unwrap_or(0);
    let skip = current.saturating_sub(visible / 2);

    let items: Vec<ListItem> = disasm
        .iter()
        .skip(skip)
        .take(visible)
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:02X}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw register state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let r = |i: usize| format!("{:02X}", app.cpu.regs.get(i));

    let content = vec![
        Line::from(format!(
            "R0: {}  R1: {}  R2: {}  R3: {}",
            r(0), r(1), r(2), r(3)
        )),
        Line::from(format!(
            "R4: {}  R5: {}  R6: {}  R7: {} (SP)",
            r(4), r(5), r(6), r(7)
        )),
        Line::from(vec![
            Span::raw("PC: "),
            Span::styled(
                format!("{:02X}", app.cpu.regs.pc),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("   FL: "),
            Span::styled(
                format!("{}", app.cpu.regs.flag),
                flag_style(app.cpu.regs.flag),
            ),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(
                format!("{}", app.cpu.cycles),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("   State: "),
            Span::styled(
                format!("{:?}", app.cpu.state),
                if app.cpu.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                },
            ),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view, one byte per row.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible_rows).min(crate::cpu::MEMORY_SIZE);

    let items: Vec<ListItem> = (start..end)
        .map(|addr| {
            let value = app.cpu.mem.read(addr as u8);
            let is_pc = addr as u8 == app.cpu.regs.pc;
            let is_sp = addr as u8 == app.cpu.regs.sp();

            let marker = if is_sp { " ◀ SP" } else { "" };
            let text = format!("{:02X}: {:08b} = {}{}", addr, value, value, marker);

            let style = if is_pc {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if is_sp {
                Style::default().fg(Color::Cyan)
            } else if value != 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw the status line.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw program output (values printed by PRN), newest at the bottom.
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible = (area.height as usize).saturating_sub(2);
    let output = app.cpu.output();
    let skip = output.len().saturating_sub(visible);

    let items: Vec<ListItem> = output[skip..]
        .iter()
        .map(|value| ListItem::new(format!("{}", value)))
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)));

    frame.render_widget(list, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Get color style for the comparison flag.
fn flag_style(flag: Flag) -> Style {
    match flag {
        Flag::Unset => Style::default().fg(Color::DarkGray),
        Flag::Equal => Style::default().fg(Color::Green),
        Flag::Less => Style::default().fg(Color::Red),
        Flag::Greater => Style::default().fg(Color::Cyan),
    }
}
