use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use nifty_valuation::{NseIndex, ScoredStock, ScreenerReport, Valuation};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Screener,
    Distribution,
    Views,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    None,
    AllStocks,
    ByValuation(Valuation),
    ByIndex(NseIndex),
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Screener => Page::Distribution,
            Page::Distribution => Page::Views,
            Page::Views => Page::Screener,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Screener => Page::Views,
            Page::Distribution => Page::Screener,
            Page::Views => Page::Distribution,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Screener => "Stock Screener",
            Page::Distribution => "Valuation Distribution",
            Page::Views => "Views",
        }
    }
}

pub struct App {
    pub report: ScreenerReport,
    pub filtered_rows: Vec<ScoredStock>,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub active_filter: FilterType,
    pub sort_ascending: bool,
}

impl App {
    pub fn new(report: ScreenerReport) -> Self {
        let mut state = TableState::default();
        if !report.is_empty() {
            state.select(Some(0));
        }

        let filtered_rows = report.rows.clone();

        Self {
            report,
            filtered_rows,
            state,
            current_page: Page::Screener,
            show_detail: false,
            active_filter: FilterType::None,
            sort_ascending: false,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_stock(&self) -> Option<&ScoredStock> {
        self.state.selected().and_then(|i| self.filtered_rows.get(i))
    }

    pub fn apply_filter(&mut self, filter: FilterType) {
        self.active_filter = filter;

        self.filtered_rows = match filter {
            FilterType::None | FilterType::AllStocks => self.report.rows.clone(),
            FilterType::ByValuation(v) => self
                .report
                .rows
                .iter()
                .filter(|row| row.valuation == v)
                .cloned()
                .collect(),
            FilterType::ByIndex(index) => self
                .report
                .rows
                .iter()
                .filter(|row| index.contains(&row.record.symbol))
                .cloned()
                .collect(),
        };

        self.resort();

        // Reset selection to first item
        if !self.filtered_rows.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(FilterType::None);
    }

    pub fn toggle_sort(&mut self) {
        self.sort_ascending = !self.sort_ascending;
        self.resort();
    }

    fn resort(&mut self) {
        if self.sort_ascending {
            self.filtered_rows.sort_by(|a, b| {
                a.score
                    .cmp(&b.score)
                    .then_with(|| a.record.symbol.cmp(&b.record.symbol))
            });
        } else {
            self.filtered_rows.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| a.record.symbol.cmp(&b.record.symbol))
            });
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.filtered_rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered_rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered_rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                let next = i + 20;
                if next >= len {
                    len - 1
                } else {
                    next
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if i < 20 {
                    0
                } else {
                    i - 20
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Char('s') => app.toggle_sort(),
                KeyCode::Char('c') => {
                    app.clear_filter();
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('1') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::AllStocks);
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('2') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByValuation(Valuation::Undervalued));
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('3') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByValuation(Valuation::Neutral));
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('4') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByValuation(Valuation::Overvalued));
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('5') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByIndex(NseIndex::Nifty50));
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('6') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByIndex(NseIndex::NiftyNext50));
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('7') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByIndex(NseIndex::Nifty101To150));
                    app.current_page = Page::Screener;
                }
                KeyCode::Char('8') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::ByIndex(NseIndex::Nifty151To250));
                    app.current_page = Page::Screener;
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered_rows.is_empty() {
                        app.state.select(Some(app.filtered_rows.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation + KPIs
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    // Header with page navigation
    render_header(f, chunks[0], app);

    // Content area with optional split for detail panel
    if app.show_detail && app.current_page == Page::Screener {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Screener table
                Constraint::Percentage(40), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        // Normal full-width content
        match app.current_page {
            Page::Screener => render_table(f, chunks[1], app),
            Page::Distribution => render_distribution(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    // Status bar
    render_status_bar(f, chunks[2], app);
}

fn valuation_color(valuation: Valuation) -> Color {
    match valuation {
        Valuation::Undervalued => Color::Green,
        Valuation::Neutral => Color::Yellow,
        Valuation::Overvalued => Color::Red,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let counts = app.report.counts();

    // Page tabs
    let pages = [
        (Page::Screener, "Screener"),
        (Page::Distribution, "Distribution"),
        (Page::Views, "Views"),
    ];

    let mut tab_spans = vec![];
    for (i, (page, name)) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(*name, style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Total: {}", app.report.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("🟢 {}", counts.undervalued),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("🟡 {}", counts.neutral),
        Style::default().fg(Color::Yellow),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("🔴 {}", counts.overvalued),
        Style::default().fg(Color::Red),
    ));

    let header_text = vec![Line::from(tab_spans)];

    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Stock", "Sector", "PE", "PB", "ROE", "D/E", "Score", "Valuation"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered_rows.iter().map(|stock| {
        let color = valuation_color(stock.valuation);
        let f = &stock.record.fundamentals;

        let cells = vec![
            Cell::from(truncate(&stock.record.name, 14)),
            Cell::from(truncate(stock.record.sector.as_deref().unwrap_or("-"), 18)),
            Cell::from(fmt_metric(f.pe_ratio)),
            Cell::from(fmt_metric(f.pb_ratio)),
            Cell::from(fmt_metric(f.return_on_equity)),
            Cell::from(fmt_metric(f.debt_to_equity)),
            Cell::from(format!("{}", stock.score)).style(Style::default().fg(color)),
            Cell::from(stock.valuation.as_str()).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let title = match app.active_filter {
        FilterType::ByValuation(v) => format!(" Screener - {} ", v),
        FilterType::ByIndex(index) => format!(" Screener - {} ", index.title()),
        _ => " Screener ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(20),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(13),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_distribution(f: &mut Frame, area: Rect, app: &App) {
    let distribution = app.report.distribution();

    let mut lines = vec![Line::from(""), Line::from("  Valuation Distribution"), Line::from("")];

    for (valuation, count, pct) in distribution {
        let bar_len = (pct / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<12}", valuation.as_str()),
                Style::default().fg(valuation_color(valuation)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(bar, Style::default().fg(valuation_color(valuation))),
            Span::raw(format!(" {} ({:.1}%)", count, pct)),
        ]));
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Distribution "),
    );

    f.render_widget(paragraph, area);
}

fn render_views(f: &mut Frame, area: Rect, _app: &App) {
    let lines = vec![
        Line::from(""),
        Line::from("  Filter the screener table:"),
        Line::from(""),
        Line::from("  [1] All stocks"),
        Line::from(vec![
            Span::raw("  [2] "),
            Span::styled("Undervalued", Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw("  [3] "),
            Span::styled("Neutral", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("  [4] "),
            Span::styled("Overvalued", Style::default().fg(Color::Red)),
        ]),
        Line::from(""),
        Line::from("  Scope to one index:"),
        Line::from(""),
        Line::from("  [5] NIFTY 50"),
        Line::from("  [6] NIFTY 51-100"),
        Line::from("  [7] NIFTY 101-150"),
        Line::from("  [8] NIFTY 151-250"),
        Line::from(""),
        Line::from("  [c] Clear filter"),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views "),
    );

    f.render_widget(paragraph, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let lines = match app.selected_stock() {
        Some(stock) => {
            let fu = &stock.record.fundamentals;
            let color = valuation_color(stock.valuation);

            vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw("  Stock:    "),
                    Span::styled(
                        stock.record.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(format!("  Symbol:   {}", stock.record.symbol)),
                Line::from(format!(
                    "  Sector:   {}",
                    stock.record.sector.as_deref().unwrap_or("n/a")
                )),
                Line::from(format!("  Price:    {}", fmt_metric(stock.record.price))),
                Line::from(""),
                Line::from(format!("  P/E:             {}", fmt_metric(fu.pe_ratio))),
                Line::from(format!("  P/B:             {}", fmt_metric(fu.pb_ratio))),
                Line::from(format!("  ROE:             {}", fmt_metric(fu.return_on_equity))),
                Line::from(format!("  Debt/Equity:     {}", fmt_metric(fu.debt_to_equity))),
                Line::from(format!("  Revenue Growth:  {}", fmt_metric(fu.revenue_growth))),
                Line::from(format!("  Profit Margin:   {}", fmt_metric(fu.profit_margin))),
                Line::from(format!(
                    "  Reported:        {} / {}",
                    fu.reported_count(),
                    nifty_valuation::Fundamentals::METRIC_COUNT
                )),
                Line::from(""),
                Line::from(vec![
                    Span::raw("  Score:    "),
                    Span::styled(
                        format!("{}", stock.score),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("  Valuation: "),
                    Span::styled(
                        stock.valuation.as_str(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
            ]
        }
        None => vec![Line::from(""), Line::from("  No stock selected")],
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Stock Details "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let sort = if app.sort_ascending { "score ↑" } else { "score ↓" };

    let text = format!(
        " {} | Tab: pages | ↑/↓: navigate | Enter: details | s: sort ({}) | q: quit ",
        app.current_page.title(),
        sort
    );

    let status = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(status, area);
}

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nifty_valuation::{run_screener, Fundamentals, ScoringConfig, StockRecord};

    fn sample_app() -> App {
        let report = run_screener(
            vec![
                StockRecord::new(
                    "STRONG.NS",
                    Fundamentals {
                        pe_ratio: Some(15.0),
                        pb_ratio: Some(2.0),
                        return_on_equity: Some(0.25),
                        debt_to_equity: Some(0.2),
                        revenue_growth: Some(0.20),
                        profit_margin: Some(0.15),
                    },
                ),
                StockRecord::new("WEAK.NS", Fundamentals::default()),
            ],
            &ScoringConfig::default(),
        );
        App::new(report)
    }

    #[test]
    fn test_filter_by_valuation() {
        let mut app = sample_app();
        assert_eq!(app.filtered_rows.len(), 2);

        app.apply_filter(FilterType::ByValuation(Valuation::Undervalued));
        assert_eq!(app.filtered_rows.len(), 1);
        assert_eq!(app.filtered_rows[0].record.symbol, "STRONG.NS");

        app.clear_filter();
        assert_eq!(app.filtered_rows.len(), 2);
    }

    #[test]
    fn test_filter_by_index() {
        let report = run_screener(
            vec![
                StockRecord::new("RELIANCE.NS", Fundamentals::default()), // NIFTY 50
                StockRecord::new("DIXON.NS", Fundamentals::default()),    // NIFTY 151-250
                StockRecord::new("UNLISTED.NS", Fundamentals::default()),
            ],
            &ScoringConfig::default(),
        );
        let mut app = App::new(report);

        app.apply_filter(FilterType::ByIndex(NseIndex::Nifty50));
        assert_eq!(app.filtered_rows.len(), 1);
        assert_eq!(app.filtered_rows[0].record.symbol, "RELIANCE.NS");

        app.apply_filter(FilterType::ByIndex(NseIndex::Nifty151To250));
        assert_eq!(app.filtered_rows.len(), 1);
        assert_eq!(app.filtered_rows[0].record.symbol, "DIXON.NS");

        app.clear_filter();
        assert_eq!(app.filtered_rows.len(), 3);
    }

    #[test]
    fn test_sort_toggle() {
        let mut app = sample_app();
        assert_eq!(app.filtered_rows[0].record.symbol, "STRONG.NS");

        app.toggle_sort();
        assert_eq!(app.filtered_rows[0].record.symbol, "WEAK.NS");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = sample_app();
        assert_eq!(app.state.selected(), Some(0));

        app.next();
        assert_eq!(app.state.selected(), Some(1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(1));
    }

    #[test]
    fn test_selection_resets_on_empty_filter() {
        let mut app = sample_app();
        // Nothing scores Neutral in the sample set
        app.apply_filter(FilterType::ByValuation(Valuation::Neutral));
        assert!(app.filtered_rows.is_empty());
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("SHORT", 10), "SHORT");
        assert_eq!(truncate("VERYLONGSTOCKNAME", 8), "VERYLON…");
    }
}
