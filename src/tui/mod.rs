//! Ratatui-based terminal dashboard.
//!
//! Four tabs render the session dataset:
//! - Table: the raw rows, scrollable
//! - Overview: daily sales, daily customers, sales vs customers, region share
//! - Categories: mean sales and mean customers per category
//! - Heat map: summed sales per month × category
//!
//! The dataset comes from the session's `Assembler` on every frame (a cache hit
//! after the first build); aggregates are recomputed per frame from it.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table,
        Tabs,
    },
};

use crate::aggregate::{self, Aggregate};
use crate::data::Assembler;
use crate::domain::{Dataset, DatasetConfig};
use crate::error::AppError;

mod palette;
mod plotters_chart;

use plotters_chart::SeriesChart;

/// Start the TUI.
pub fn run(config: DatasetConfig) -> Result<(), AppError> {
    // Build before touching the terminal so config errors print normally.
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Table,
    Overview,
    Categories,
    HeatMap,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Table, Tab::Overview, Tab::Categories, Tab::HeatMap];

    fn title(self) -> &'static str {
        match self {
            Tab::Table => "1 Table",
            Tab::Overview => "2 Overview",
            Tab::Categories => "3 Categories",
            Tab::HeatMap => "4 Heat map",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

struct App {
    config: DatasetConfig,
    base_seed: u64,
    assembler: Assembler,
    tab: Tab,
    scroll: usize,
    status: String,
}

impl App {
    fn new(config: DatasetConfig) -> Result<Self, AppError> {
        let mut assembler = Assembler::new();
        let dataset = assembler.dataset(&config)?;
        let status = format!("Generated {} rows.", dataset.len());
        Ok(Self {
            base_seed: config.seed,
            config,
            assembler,
            tab: Tab::Overview,
            scroll: 0,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Char('r') => {
                self.config.seed = self.config.seed.wrapping_add(1);
                self.reload()?;
            }
            KeyCode::Char('b') => {
                self.config.seed = self.base_seed;
                self.reload()?;
            }
            _ => {}
        }
        Ok(false)
    }

    fn reload(&mut self) -> Result<(), AppError> {
        let dataset = self.assembler.dataset(&self.config)?;
        self.scroll = 0;
        self.status = format!(
            "seed {} -> {} rows (builds this session: {})",
            self.config.seed,
            dataset.len(),
            self.assembler.build_count()
        );
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        let dataset = match self.assembler.dataset(&self.config) {
            Ok(d) => d,
            Err(e) => {
                let msg = Paragraph::new(format!("Dataset error: {e}"))
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(msg, chunks[1]);
                return;
            }
        };

        self.draw_header(frame, chunks[0], &dataset);
        match self.tab {
            Tab::Table => self.draw_table(frame, chunks[1], &dataset),
            Tab::Overview => draw_overview(frame, chunks[1], &dataset),
            Tab::Categories => draw_categories(frame, chunks[1], &dataset),
            Tab::HeatMap => draw_heat_map(frame, chunks[1], &dataset),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, dataset: &Dataset) {
        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            " dash: sales dashboard ",
            Style::default().fg(Color::Cyan),
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let span = match dataset.stats() {
            Some(s) => format!(
                "seed: {} | rows: {} | {} .. {} | sales={:.0} revenue={:.0}",
                self.config.seed,
                s.n_rows,
                s.first_date,
                s.last_date,
                s.total_sales,
                s.total_revenue
            ),
            None => format!("seed: {} | empty dataset", self.config.seed),
        };
        frame.render_widget(
            Paragraph::new(span).style(Style::default().fg(Color::Gray)),
            rows[0],
        );

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
            .select(self.tab.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(tabs, rows[1]);
    }

    fn draw_table(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect, dataset: &Dataset) {
        let block = Block::default().title("Data").borders(Borders::ALL);
        let visible = block.inner(area).height.saturating_sub(1) as usize;

        // Clamp so the last page stays full.
        let max_scroll = dataset.len().saturating_sub(visible.max(1));
        self.scroll = self.scroll.min(max_scroll);

        let header = TableRow::new(vec![
            "date",
            "sales",
            "customers",
            "avg_purchase",
            "category",
            "region",
            "revenue",
            "year_month",
        ])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

        let rows = dataset.rows().iter().skip(self.scroll).take(visible).map(|r| {
            TableRow::new(vec![
                r.date.to_string(),
                format!("{:.2}", r.sales),
                r.customers.to_string(),
                format!("{:.2}", r.avg_purchase),
                r.category.label().to_string(),
                r.region.label().to_string(),
                r.revenue().map(|v| format!("{v:.2}")).unwrap_or_default(),
                r.year_month().unwrap_or_default().to_string(),
            ])
        });

        let widths = [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/←/→ switch  ↑/↓ scroll  r reseed  b base seed  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_overview(frame: &mut ratatui::Frame<'_>, area: Rect, dataset: &Dataset) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let sales = daily_series(dataset, |r| r.sales);
    draw_series_panel(frame, top[0], "Daily sales", &sales, RGBColor(65, 105, 225), "sales");

    let customers = daily_series(dataset, |r| f64::from(r.customers));
    let red = RGBColor(178, 34, 34);
    draw_series_panel(frame, top[1], "Daily customers", &customers, red, "customers");

    draw_scatter_panel(frame, bottom[0], dataset);

    match aggregate::region_sales(dataset) {
        Ok(agg) => draw_region_share(frame, bottom[1], &agg),
        Err(e) => draw_error(frame, bottom[1], "Sales by region", &e.to_string()),
    }
}

fn draw_series_panel(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &[(f64, f64)],
    color: RGBColor,
    y_label: &str,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let points: Vec<(f64, f64, RGBColor)> = series.iter().map(|&(x, y)| (x, y, color)).collect();
    let widget = SeriesChart {
        line: series,
        line_color: color,
        points: &points,
        x_bounds: bounds(series.iter().map(|p| p.0), 0.0),
        y_bounds: bounds(series.iter().map(|p| p.1), 0.05),
        x_label: "date",
        y_label,
        fmt_x: fmt_axis_date,
        fmt_y: fmt_axis_int,
    };
    frame.render_widget(widget, inner);
}

fn draw_scatter_panel(frame: &mut ratatui::Frame<'_>, area: Rect, dataset: &Dataset) {
    let block = Block::default()
        .title("Sales vs customers (color: avg purchase)")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let rows = dataset.rows();
    let [avg_min, avg_max] = bounds(rows.iter().map(|r| r.avg_purchase), 0.0);
    let points: Vec<(f64, f64, RGBColor)> = rows
        .iter()
        .map(|r| {
            let t = palette::normalize(r.avg_purchase, avg_min, avg_max);
            let (cr, cg, cb) = palette::viridis(t);
            (f64::from(r.customers), r.sales, RGBColor(cr, cg, cb))
        })
        .collect();

    let widget = SeriesChart {
        line: &[],
        line_color: RGBColor(255, 255, 255),
        points: &points,
        x_bounds: bounds(points.iter().map(|p| p.0), 0.05),
        y_bounds: bounds(points.iter().map(|p| p.1), 0.05),
        x_label: "customers",
        y_label: "sales",
        fmt_x: fmt_axis_int,
        fmt_y: fmt_axis_int,
    };
    frame.render_widget(widget, inner);
}

fn draw_region_share(frame: &mut ratatui::Frame<'_>, area: Rect, agg: &Aggregate) {
    let total = agg.column_total(0);
    let bars: Vec<Bar> = agg
        .rows
        .iter()
        .map(|r| {
            let value = r.values.first().copied().unwrap_or(0.0);
            let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            Bar::default()
                .label(Line::from(r.keys.first().cloned().unwrap_or_default()))
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{share:.1}%"))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title("Sales share by region").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
}

fn draw_categories(frame: &mut ratatui::Frame<'_>, area: Rect, dataset: &Dataset) {
    let agg = match aggregate::category_means(dataset) {
        Ok(agg) => agg,
        Err(e) => return draw_error(frame, area, "Categories", &e.to_string()),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    draw_category_bars(frame, cols[0], &agg, 0, "Mean sales by category", Color::Cyan);
    draw_category_bars(frame, cols[1], &agg, 1, "Mean customers by category", Color::Magenta);

    let footer = Paragraph::new(avg_purchase_line(&agg))
        .block(Block::default().title("Mean avg purchase").borders(Borders::ALL));
    frame.render_widget(footer, rows[1]);
}

/// `A $29.1  B $31.0 ...` from the third category-means target.
fn avg_purchase_line(agg: &Aggregate) -> String {
    let target = aggregate::Target::mean(aggregate::ValueColumn::AvgPurchase);
    agg.rows
        .iter()
        .filter_map(|r| {
            let key = r.keys.first()?;
            let avg = agg.value(&[key.as_str()], target)?;
            Some(format!("{key} ${avg:.1}"))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn draw_category_bars(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    agg: &Aggregate,
    target: usize,
    title: &str,
    color: Color,
) {
    let bars: Vec<Bar> = agg
        .rows
        .iter()
        .map(|r| {
            let value = r.values.get(target).copied().unwrap_or(0.0);
            let key = r.keys.first().map(String::as_str).unwrap_or("?");
            Bar::default()
                .label(Line::from(format!("{key} n={}", r.count)))
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{value:.1}"))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(((area.width.saturating_sub(2)) / 4).saturating_sub(2).clamp(3, 24))
        .bar_gap(2)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color));
    frame.render_widget(chart, area);
}

fn draw_heat_map(frame: &mut ratatui::Frame<'_>, area: Rect, dataset: &Dataset) {
    let agg = match aggregate::month_category_sales(dataset) {
        Ok(agg) => agg,
        Err(e) => return draw_error(frame, area, "Heat map", &e.to_string()),
    };

    let months = agg.distinct_keys(0);
    let mut categories = agg.distinct_keys(1);
    categories.sort();

    let sales = aggregate::Target::sum(aggregate::ValueColumn::Sales);
    let [min, max] = bounds(agg.rows.iter().filter_map(|r| r.values.first().copied()), 0.0);

    let mut header = vec![Cell::from("category")];
    header.extend(months.iter().map(|m| Cell::from(m.clone())));

    let rows = categories.iter().map(|cat| {
        let mut cells = vec![Cell::from(cat.clone())];
        for month in &months {
            let cell = match agg.value(&[month.as_str(), cat.as_str()], sales) {
                Some(v) => {
                    let t = palette::normalize(v, min, max);
                    let (r, g, b) = palette::viridis(t);
                    let fg = if t > 0.5 { Color::Black } else { Color::White };
                    let style = Style::default().bg(Color::Rgb(r, g, b)).fg(fg);
                    Cell::from(format!("{v:>9.0}")).style(style)
                }
                None => Cell::from(format!("{:>9}", "-")),
            };
            cells.push(cell);
        }
        TableRow::new(cells).height(2)
    });

    let mut widths = vec![Constraint::Length(9)];
    widths.extend(months.iter().map(|_| Constraint::Length(10)));

    let table = Table::new(rows, widths)
        .header(
            TableRow::new(header)
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title("Sales by month and category")
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn draw_error(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, message: &str) {
    let p = Paragraph::new(Text::from(message.to_string()))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

/// `(days since CE, value)` pairs for a per-row metric.
fn daily_series(dataset: &Dataset, metric: impl Fn(&crate::domain::Row) -> f64) -> Vec<(f64, f64)> {
    dataset
        .rows()
        .iter()
        .map(|r| (f64::from(r.date.num_days_from_ce()), metric(r)))
        .collect()
}

/// Min/max of `values`, padded by `pad` of the span. Falls back to `[0, 1]`.
fn bounds(values: impl Iterator<Item = f64>, pad: f64) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 0.5, hi + 0.5];
    }
    let p = (hi - lo) * pad;
    [lo - p, hi + p]
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

fn fmt_axis_int(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::assemble;

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(Tab::HeatMap.next(), Tab::Table);
        assert_eq!(Tab::Table.prev(), Tab::HeatMap);
        for t in Tab::ALL {
            assert_eq!(t.next().prev(), t);
        }
    }

    #[test]
    fn bounds_pad_and_fall_back() {
        assert_eq!(bounds([1.0, 3.0].into_iter(), 0.5), [0.0, 4.0]);
        assert_eq!(bounds([2.0, 2.0].into_iter(), 0.1), [1.5, 2.5]);
        assert_eq!(bounds(std::iter::empty(), 0.1), [0.0, 1.0]);
    }

    #[test]
    fn date_axis_round_trips_day_numbers() {
        let ds = assemble(&DatasetConfig::default()).unwrap();
        let series = daily_series(&ds, |r| r.sales);
        assert_eq!(series.len(), 100);
        assert_eq!(fmt_axis_date(series[0].0), "01-01");
        assert_eq!(fmt_axis_date(series[99].0), "04-10");
        assert!(series.windows(2).all(|w| w[1].0 - w[0].0 == 1.0));
    }

    #[test]
    fn app_reseed_builds_once_per_seed() {
        let mut app = App::new(DatasetConfig::default()).unwrap();
        app.handle_key(KeyCode::Char('r')).unwrap();
        assert_eq!(app.config.seed, 43);
        app.handle_key(KeyCode::Char('b')).unwrap();
        assert_eq!(app.config.seed, 42);
        assert_eq!(app.assembler.build_count(), 3);

        let a = app.assembler.dataset(&app.config).unwrap();
        let b = app.assembler.dataset(&app.config).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(app.assembler.build_count(), 3);
    }

    #[test]
    fn avg_purchase_footer_lists_every_category() {
        let ds = assemble(&DatasetConfig::default()).unwrap();
        let agg = aggregate::category_means(&ds).unwrap();
        let line = avg_purchase_line(&agg);
        for r in &agg.rows {
            assert!(line.contains(&format!("{} $", r.keys[0])), "{line}");
        }
        assert_eq!(line.matches('$').count(), agg.rows.len());
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let mut app = App::new(DatasetConfig::default()).unwrap();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(!app.handle_key(KeyCode::Char('3')).unwrap());
        assert_eq!(app.tab, Tab::Categories);
    }
}
