//! Horizontal bar chart of the top repliers.

use super::canvas::{blank, draw_text, fill_rect};
use super::{TextMeasure, TextSize};
use crate::config::ChartConfig;
use crate::models::TopRepliers;
use fontdue::Font;
use image::{Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([34, 34, 34]);
const BAR: Rgb<u8> = Rgb([76, 114, 176]);
const GRID: Rgb<u8> = Rgb([228, 228, 228]);

/// Caption drawn when nobody replied to a question.
pub const EMPTY_CAPTION: &str = "No replies to questions found";

/// Resolved chart settings.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub bar_height: u32,
    pub title: String,
    pub x_label: String,
}

impl ChartOptions {
    pub fn new(config: &ChartConfig, top_n: usize) -> Self {
        Self {
            width: config.width,
            bar_height: config.bar_height,
            title: format!("Top {} Users in Replying to Questions", top_n),
            x_label: "Number of Replies".to_string(),
        }
    }
}

/// A text item at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub px: f32,
}

/// One user row.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub label: TextItem,
    pub value: TextItem,
    pub bar_x: u32,
    pub bar_y: u32,
    pub bar_width: u32,
    pub bar_height: u32,
}

/// Positions of every element of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub title: TextItem,
    pub x_label: TextItem,
    /// Left edge and width of the bar area.
    pub plot_x: u32,
    pub plot_width: u32,
    pub plot_y: u32,
    pub plot_height: u32,
    pub rows: Vec<BarRow>,
    /// Shown instead of rows when the ranking is empty.
    pub caption: Option<TextItem>,
}

/// Compute the chart layout.
pub fn layout_chart<M: TextMeasure>(measure: &M, top: &TopRepliers, options: &ChartOptions) -> ChartLayout {
    let width = options.width;
    let row_height = options.bar_height;
    let padding = (row_height / 2).max(4);
    let label_px = row_height as f32 * 0.5;
    let title_px = row_height as f32 * 0.7;

    let title_size = measure.measure(&options.title, title_px);
    let title = TextItem {
        text: options.title.clone(),
        x: centered(width, title_size.width),
        y: padding,
        px: title_px,
    };

    let plot_y = padding * 2 + title_size.height;
    let row_count = top.len().max(1) as u32;
    let plot_height = row_count * row_height;

    // Labels may take at most a third of the width.
    let max_label_width = width / 3;
    let labels: Vec<(String, TextSize)> = top
        .entries
        .iter()
        .map(|tally| fit_label(measure, &tally.user, label_px, max_label_width))
        .collect();
    let label_column = labels.iter().map(|(_, size)| size.width).max().unwrap_or(0);

    let max_replies = top.max_replies();
    let value_column = measure.measure(&max_replies.to_string(), label_px).width;

    let plot_x = padding + label_column + padding;
    let plot_width = width.saturating_sub(plot_x + padding + value_column + padding).max(1);

    let rows = top
        .entries
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (tally, (label, label_size)))| {
            let row_y = plot_y + i as u32 * row_height;
            let bar_height = (row_height * 7 / 10).max(1);
            let bar_width = if max_replies == 0 {
                0
            } else {
                ((plot_width as u64 * tally.replies as u64) / max_replies as u64) as u32
            };
            let text_y = row_y + (row_height.saturating_sub(label_size.height)) / 2;

            BarRow {
                label: TextItem {
                    text: label,
                    x: plot_x - padding - label_size.width,
                    y: text_y,
                    px: label_px,
                },
                value: TextItem {
                    text: tally.replies.to_string(),
                    x: plot_x + bar_width + padding / 2,
                    y: text_y,
                    px: label_px,
                },
                bar_x: plot_x,
                bar_y: row_y + (row_height - bar_height) / 2,
                bar_width,
                bar_height,
            }
        })
        .collect();

    let caption = top.is_empty().then(|| {
        let size = measure.measure(EMPTY_CAPTION, label_px);
        TextItem {
            text: EMPTY_CAPTION.to_string(),
            x: centered(width, size.width),
            y: plot_y + (row_height.saturating_sub(size.height)) / 2,
            px: label_px,
        }
    });

    let x_label_size = measure.measure(&options.x_label, label_px);
    let x_label = TextItem {
        text: options.x_label.clone(),
        x: plot_x + plot_width.saturating_sub(x_label_size.width) / 2,
        y: plot_y + plot_height + padding,
        px: label_px,
    };

    ChartLayout {
        width,
        height: x_label.y + x_label_size.height + padding,
        title,
        x_label,
        plot_x,
        plot_width,
        plot_y,
        plot_height,
        rows,
        caption,
    }
}

fn centered(outer: u32, inner: u32) -> u32 {
    outer.saturating_sub(inner) / 2
}

/// Shorten `text` with an ellipsis until it fits in `max_width`.
fn fit_label<M: TextMeasure>(measure: &M, text: &str, px: f32, max_width: u32) -> (String, TextSize) {
    let size = measure.measure(text, px);
    if size.width <= max_width {
        return (text.to_string(), size);
    }

    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let candidate: String = chars[..keep].iter().chain(std::iter::once(&'…')).collect();
        let size = measure.measure(&candidate, px);
        if size.width <= max_width {
            return (candidate, size);
        }
    }

    let ellipsis = "…".to_string();
    let size = measure.measure(&ellipsis, px);
    (ellipsis, size)
}

/// Draw the chart.
pub fn render_chart(font: &Font, top: &TopRepliers, options: &ChartOptions) -> RgbImage {
    let layout = layout_chart(font, top, options);
    let mut img = blank(layout.width, layout.height, BACKGROUND);

    // Vertical grid lines at quarters of the bar area
    for quarter in 0..=4 {
        let x = layout.plot_x + layout.plot_width * quarter / 4;
        fill_rect(&mut img, x, layout.plot_y, 1, layout.plot_height, GRID);
    }

    draw_item(&mut img, font, &layout.title, INK);
    draw_item(&mut img, font, &layout.x_label, INK);

    for row in &layout.rows {
        fill_rect(&mut img, row.bar_x, row.bar_y, row.bar_width, row.bar_height, BAR);
        draw_item(&mut img, font, &row.label, INK);
        draw_item(&mut img, font, &row.value, INK);
    }

    if let Some(ref caption) = layout.caption {
        draw_item(&mut img, font, caption, INK);
    }

    img
}

fn draw_item(img: &mut RgbImage, font: &Font, item: &TextItem, color: Rgb<u8>) {
    draw_text(img, font, &item.text, item.x as i32, item.y as i32, item.px, color);
}
