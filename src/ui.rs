use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Tabs, Wrap,
    },
};

use crate::domain::{CMDMode, ListKind};
use crate::forms::Recipients;
use crate::items::SubscriberStatus;
use crate::model::{Tab, UIData};
use crate::pager::{Pager, PagerEntry};
use crate::render::ListFragment;
use crate::store::Theme;

pub const HEADER_HEIGHT: u16 = 1;
pub const STATS_HEIGHT: u16 = 3;
pub const PAGER_HEIGHT: u16 = 1;
pub const CMDLINE_HEIGHT: u16 = 1;

struct Palette {
    base: Style,
    accent: Color,
    muted: Color,
    error: Color,
    success: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                base: Style::default(),
                accent: Color::Blue,
                muted: Color::DarkGray,
                error: Color::Red,
                success: Color::Green,
            },
            Theme::Dark => Palette {
                base: Style::default().bg(Color::Black).fg(Color::White),
                accent: Color::LightBlue,
                muted: Color::Gray,
                error: Color::LightRed,
                success: Color::LightGreen,
            },
        }
    }
}

#[derive(Default)]
pub struct DashboardUI;

impl DashboardUI {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, data: &UIData, f: &mut Frame) {
        let palette = Palette::for_theme(data.theme);
        f.render_widget(Block::default().style(palette.base), f.area());

        if data.show_login {
            draw_login(f, data, &palette);
            draw_cmdline(f, bottom_line(f.area()), data, &palette);
            return;
        }

        let stats_height = if data.compact { 0 } else { STATS_HEIGHT };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(stats_height),
                Constraint::Min(3),
                Constraint::Length(PAGER_HEIGHT),
                Constraint::Length(CMDLINE_HEIGHT),
            ])
            .split(f.area());

        draw_header(f, chunks[0], data, &palette);
        if !data.compact {
            draw_stats(f, chunks[1], data, &palette);
        }
        match data.tab {
            Tab::Subscribers => draw_subscribers(f, chunks[2], data, &palette),
            Tab::Messages => draw_messages(f, chunks[2], data, &palette),
            Tab::Newsletter => draw_newsletter(f, chunks[2], data, &palette),
        }
        draw_pager(f, chunks[3], &data.pager, &palette);
        draw_cmdline(f, chunks[4], data, &palette);

        if let Some(question) = &data.confirm_message {
            draw_confirm(f, question, &palette);
        } else if data.show_popup {
            draw_popup(f, &data.popup_title, &data.popup_message, &palette);
        }
    }
}

fn bottom_line(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(CMDLINE_HEIGHT),
        width: area.width,
        height: CMDLINE_HEIGHT.min(area.height),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_header(f: &mut Frame, area: Rect, data: &UIData, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(32)])
        .split(area);

    let selected = Tab::ALL.iter().position(|t| *t == data.tab).unwrap_or(0);
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(selected)
        .highlight_style(Style::new().fg(palette.accent).add_modifier(Modifier::BOLD))
        .divider("│");
    f.render_widget(tabs, chunks[0]);

    let mut right = vec![Span::styled(
        if data.theme == Theme::Dark { "☾ " } else { "☀ " },
        Style::new().fg(palette.muted),
    )];
    if data.in_flight > 0 {
        right.push(Span::styled(
            format!("⟳{} ", data.in_flight),
            Style::new().fg(palette.accent),
        ));
    }
    if let Some(admin) = &data.admin {
        right.push(Span::styled(admin.clone(), Style::new().bold()));
    }
    f.render_widget(Paragraph::new(Line::from(right).right_aligned()), chunks[1]);
}

fn draw_stats(f: &mut Frame, area: Rect, data: &UIData, palette: &Palette) {
    let s = &data.stats;
    let cards = [
        ("Subscribers", s.total_subscribers.to_string()),
        ("Active", s.active_subscribers.to_string()),
        ("Messages", s.total_messages.to_string()),
        ("Unread", s.unread_messages.to_string()),
        ("Sent", s.total_sent.to_string()),
    ];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cards.len() as u32); 5])
        .split(area);
    for (i, (label, value)) in cards.into_iter().enumerate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::new().fg(palette.muted))
            .title(label);
        let text = Paragraph::new(Line::from(value).bold().fg(palette.accent))
            .centered()
            .block(block);
        f.render_widget(text, chunks[i]);
    }
}

fn list_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::new().fg(palette.accent))
        .title(Line::from(format!(" {title} ")).bold())
}

fn draw_placeholder<R>(
    f: &mut Frame,
    area: Rect,
    fragment: &ListFragment<R>,
    kind: ListKind,
    block: Block,
    palette: &Palette,
) {
    let text = fragment.placeholder(kind).unwrap_or_default();
    let color = match fragment {
        ListFragment::LoadFailed(_) => palette.error,
        _ => palette.muted,
    };
    let mut lines = vec![Line::from(""), Line::from(text).fg(color)];
    if let ListFragment::LoadFailed(reason) = fragment {
        lines.push(Line::from(reason.clone()).fg(palette.muted).italic());
    }
    f.render_widget(Paragraph::new(lines).centered().block(block), area);
}

fn draw_subscribers(f: &mut Frame, area: Rect, data: &UIData, palette: &Palette) {
    let block = list_block(&data.list_title, palette);
    let rows = match &data.subscriber_rows {
        ListFragment::Rows(rows) => rows,
        other => {
            draw_placeholder(f, area, other, ListKind::Subscribers, block, palette);
            return;
        }
    };

    let header = Row::new(["#", "Email", "Subscribed", "Status"])
        .style(Style::new().bold().fg(palette.muted));
    let table_rows = rows.iter().map(|r| {
        let status_color = if r.status == SubscriberStatus::Active {
            palette.success
        } else {
            palette.muted
        };
        Row::new(vec![
            Cell::from(r.index.to_string()),
            Cell::from(r.email.clone()),
            Cell::from(r.date_label.clone()),
            Cell::from(r.status.to_string()).style(Style::new().fg(status_color)),
        ])
    });
    let widths = [
        Constraint::Length(5),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(10),
    ];
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let mut state = TableState::default().with_selected(Some(data.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_messages(f: &mut Frame, area: Rect, data: &UIData, palette: &Palette) {
    let block = list_block(&data.list_title, palette);
    let cards = match &data.message_cards {
        ListFragment::Rows(cards) => cards,
        other => {
            draw_placeholder(f, area, other, ListKind::Messages, block, palette);
            return;
        }
    };

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let expanded = data.expanded.as_deref() == Some(card.id.as_str());
            let marker = if card.unread {
                Span::styled("● New ", Style::new().fg(palette.accent).bold())
            } else {
                Span::raw("      ")
            };
            let mut lines = vec![
                Line::from(vec![
                    marker,
                    Span::styled(card.sender.clone(), Style::new().bold()),
                    Span::styled(format!(" <{}>", card.email), Style::new().fg(palette.muted)),
                    Span::raw("  "),
                    Span::styled(card.date_label.clone(), Style::new().fg(palette.muted)),
                ]),
                Line::from(vec![Span::raw("      Subject: ").bold(), Span::raw(card.subject.clone())]),
            ];
            if expanded {
                lines.extend(card.body.lines().map(|l| Line::from(format!("      {l}"))));
            } else {
                lines.push(Line::from(format!("      {}", card.preview)).fg(palette.muted));
            }
            lines.push(Line::from(""));
            ListItem::new(Text::from(lines))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(data.selected_row));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_newsletter(f: &mut Frame, area: Rect, data: &UIData, palette: &Palette) {
    let draft = &data.draft;
    let label = Style::new().bold().fg(palette.muted);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Recipients: ", label),
            Span::raw(match draft.recipients {
                Recipients::Active => "Active subscribers only",
                Recipients::All => "All subscribers",
            }),
        ]),
        Line::from(vec![Span::styled("Topic:      ", label), Span::raw(draft.topic.clone())]),
        Line::from(""),
        Line::from(Span::styled("Body:", label)),
    ];
    lines.extend(draft.body.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(
        Line::from("[n] topic  [b] body  [a] recipients  [p] preview  [s] send").fg(palette.muted),
    );
    let paragraph = Paragraph::new(lines)
        .block(list_block(&data.list_title, palette))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_pager(f: &mut Frame, area: Rect, pager: &Pager, palette: &Palette) {
    if pager.is_empty() {
        return;
    }
    let disabled = Style::new().fg(palette.muted).add_modifier(Modifier::DIM);
    let spans: Vec<Span> = pager
        .entries
        .iter()
        .map(|entry| match entry {
            PagerEntry::Prev { enabled, .. } => {
                Span::styled(" ‹ ", if *enabled { Style::new() } else { disabled })
            }
            PagerEntry::Next { enabled, .. } => {
                Span::styled(" › ", if *enabled { Style::new() } else { disabled })
            }
            PagerEntry::Page { number, active: true } => Span::styled(
                format!(" {number} "),
                Style::new().fg(palette.accent).add_modifier(Modifier::REVERSED),
            ),
            PagerEntry::Page { number, .. } => Span::raw(format!(" {number} ")),
            PagerEntry::Ellipsis => Span::styled(" … ", disabled),
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)).centered(), area);
}

fn prompt(mode: Option<CMDMode>) -> &'static str {
    match mode {
        Some(CMDMode::Search) => "/",
        Some(CMDMode::LoginUsername) => "Username: ",
        Some(CMDMode::LoginPassword) => "Password: ",
        Some(CMDMode::NewsletterTopic) => "Topic: ",
        Some(CMDMode::NewsletterBody) => "Body (Alt+Enter for new line): ",
        None => "",
    }
}

fn draw_cmdline(f: &mut Frame, area: Rect, data: &UIData, palette: &Palette) {
    if data.active_cmdinput {
        let prompt = prompt(data.cmd_mode);
        let shown = data.cmdinput.display();
        let line = Line::from(vec![
            Span::styled(prompt, Style::new().fg(palette.accent).bold()),
            Span::raw(shown.clone()),
        ]);
        f.render_widget(Paragraph::new(line), area);

        let before_cursor = if data.cmdinput.masked {
            data.cmdinput.curser_pos
        } else {
            data.cmdinput
                .input
                .chars()
                .take(data.cmdinput.curser_pos)
                .map(|c| if c == '\n' { 3 } else { 1 })
                .sum()
        };
        let x = area.x + (prompt.chars().count() + before_cursor) as u16;
        f.set_cursor_position((x.min(area.x + area.width.saturating_sub(1)), area.y));
        return;
    }

    let line = match &data.status_message {
        Some(msg) if data.status_is_error => Line::from(msg.clone()).fg(palette.error),
        Some(msg) => Line::from(msg.clone()).fg(palette.success),
        None => Line::from("? help  Tab switch  / search  f filter  q quit").fg(palette.muted),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_login(f: &mut Frame, data: &UIData, palette: &Palette) {
    let area = centered_rect(50, 40, f.area());
    let mut lines = vec![
        Line::from("AntechLearn Admin").bold().fg(palette.accent).centered(),
        Line::from(""),
        Line::from(vec![
            Span::styled("Username: ", Style::new().fg(palette.muted)),
            Span::raw(data.login_username.clone()),
        ]),
        Line::from(""),
    ];
    if let Some(err) = &data.login_error {
        lines.push(Line::from(err.clone()).fg(palette.error));
    } else if let Some(msg) = &data.status_message {
        lines.push(Line::from(msg.clone()).fg(palette.muted));
    }
    if !data.active_cmdinput {
        lines.push(Line::from("Press Enter to sign in, q to quit").fg(palette.muted));
    }
    let block = Block::bordered()
        .title(Line::from(" Sign in ").bold().centered())
        .border_set(border::THICK);
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_popup(f: &mut Frame, title: &str, message: &str, palette: &Palette) {
    let area = centered_rect(70, 70, f.area());
    let block = Block::bordered()
        .title(Line::from(format!(" {title} ")).bold().centered())
        .title_bottom(Line::from(" <Esc> close ").centered())
        .border_style(Style::new().fg(palette.accent))
        .border_set(border::THICK);
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(message.to_string())
            .style(palette.base)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_confirm(f: &mut Frame, question: &str, palette: &Palette) {
    let area = centered_rect(50, 20, f.area());
    let block = Block::bordered()
        .title(Line::from(" Confirm ").bold().centered())
        .border_style(Style::new().fg(palette.error))
        .border_set(border::THICK);
    let lines = vec![
        Line::from(question.to_string()).centered(),
        Line::from(""),
        Line::from("[y] Yes   [Esc] No").fg(palette.muted).centered(),
    ];
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).style(palette.base).block(block), area);
}
