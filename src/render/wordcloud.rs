//! Word cloud layout and rendering.
//!
//! Words are placed from most to least frequent. Each word gets a font
//! size derived from its frequency relative to the previous word; if no
//! free spot is large enough the size shrinks one pixel at a time, and the
//! layout stops once it would go below the minimum size. Free space is
//! tracked on a coarse cell grid with a summed-area table so every box
//! test is O(1). Candidate positions are tried from the canvas center
//! outwards.

use super::canvas::{blank, draw_text};
use super::{parse_color, TextMeasure, PALETTE};
use crate::config::WordCloudConfig;
use crate::error::Result;
use crate::models::WordFrequency;
use fontdue::Font;
use image::{Rgb, RgbImage};
use indicatif::ProgressBar;
use tracing::debug;

/// Side of one occupancy cell in pixels.
const CELL: u32 = 4;

/// Resolved word cloud settings.
#[derive(Debug, Clone)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub max_font_size: f32,
    pub min_font_size: f32,
    pub relative_scaling: f32,
    pub margin: u32,
    pub background: Rgb<u8>,
}

impl WordCloudOptions {
    pub fn from_config(config: &WordCloudConfig) -> Result<Self> {
        Ok(Self {
            width: config.width,
            height: config.height,
            max_font_size: config.max_font_size as f32,
            min_font_size: config.min_font_size as f32,
            relative_scaling: config.relative_scaling,
            margin: config.margin,
            background: parse_color(&config.background_color)?,
        })
    }
}

/// A word with its final size, box and color.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub font_size: f32,
    /// Top-left corner of the occupied box, including margin.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: Rgb<u8>,
}

impl PlacedWord {
    #[allow(dead_code)] // Used by is_disjoint
    fn overlaps(&self, other: &PlacedWord) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Result of laying out a word cloud.
#[derive(Debug, Clone)]
pub struct WordCloudLayout {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub words: Vec<PlacedWord>,
}

impl WordCloudLayout {
    /// True if no two placed boxes intersect.
    #[allow(dead_code)] // Layout invariant check, used by tests
    pub fn is_disjoint(&self) -> bool {
        self.words.iter().enumerate().all(|(i, a)| {
            self.words[i + 1..].iter().all(|b| !a.overlaps(b))
        })
    }
}

/// Free/used cells with a summed-area table for O(1) box queries.
struct OccupancyGrid {
    cols: usize,
    rows: usize,
    used: Vec<bool>,
    integral: Vec<u32>,
    free_cells: usize,
    /// All cells ordered by distance from the center.
    candidates: Vec<(usize, usize)>,
}

impl OccupancyGrid {
    fn new(width: u32, height: u32) -> Self {
        let cols = (width / CELL) as usize;
        let rows = (height / CELL) as usize;

        let cx = cols as f32 / 2.0;
        let cy = rows as f32 / 2.0;
        let mut candidates: Vec<(usize, usize)> = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (x, y)))
            .collect();
        let distance = |&(x, y): &(usize, usize)| {
            let dx = (x as f32 + 0.5 - cx) / cols.max(1) as f32;
            let dy = (y as f32 + 0.5 - cy) / rows.max(1) as f32;
            dx * dx + dy * dy
        };
        candidates.sort_by(|a, b| distance(a).total_cmp(&distance(b)));

        Self {
            cols,
            rows,
            used: vec![false; cols * rows],
            integral: vec![0; (cols + 1) * (rows + 1)],
            free_cells: cols * rows,
            candidates,
        }
    }

    fn used_in(&self, x: usize, y: usize, w: usize, h: usize) -> u32 {
        let stride = self.cols + 1;
        let at = |cx: usize, cy: usize| self.integral[cy * stride + cx];
        (at(x + w, y + h) + at(x, y)) - (at(x + w, y) + at(x, y + h))
    }

    /// Top-left cell of the free `w` x `h` box whose center is closest to
    /// the grid center.
    fn find_spot(&self, w: usize, h: usize) -> Option<(usize, usize)> {
        if w == 0 || h == 0 || w > self.cols || h > self.rows || w * h > self.free_cells {
            return None;
        }

        self.candidates.iter().find_map(|&(cx, cy)| {
            let x = cx.checked_sub(w / 2)?;
            let y = cy.checked_sub(h / 2)?;
            if x + w > self.cols || y + h > self.rows {
                return None;
            }
            (self.used_in(x, y, w, h) == 0).then_some((x, y))
        })
    }

    fn occupy(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for row in y..y + h {
            for col in x..x + w {
                let cell = &mut self.used[row * self.cols + col];
                if !*cell {
                    *cell = true;
                    self.free_cells -= 1;
                }
            }
        }
        self.rebuild_integral();
    }

    fn rebuild_integral(&mut self) {
        let stride = self.cols + 1;
        for row in 0..self.rows {
            let mut row_sum = 0;
            for col in 0..self.cols {
                row_sum += self.used[row * self.cols + col] as u32;
                self.integral[(row + 1) * stride + col + 1] = self.integral[row * stride + col + 1] + row_sum;
            }
        }
    }
}

/// Place words on the canvas. `frequencies` must be sorted by count,
/// most frequent first.
pub fn layout<M: TextMeasure>(
    measure: &M,
    frequencies: &[WordFrequency],
    options: &WordCloudOptions,
    progress: &ProgressBar,
) -> WordCloudLayout {
    let mut grid = OccupancyGrid::new(options.width, options.height);
    let mut words = Vec::new();

    let max_count = frequencies.iter().map(|f| f.count).max().unwrap_or(0);
    if max_count == 0 {
        return WordCloudLayout {
            width: options.width,
            height: options.height,
            margin: options.margin,
            words,
        };
    }

    let rs = options.relative_scaling;
    let mut font_size = options.max_font_size;
    let mut last_freq = 1.0f32;

    'words: for (rank, freq) in frequencies.iter().enumerate() {
        let normalized = freq.count as f32 / max_count as f32;
        if rs != 0.0 {
            font_size = ((rs * (normalized / last_freq) + (1.0 - rs)) * font_size).round();
        }

        let (x, y, w, h) = loop {
            if font_size < options.min_font_size {
                debug!("Canvas full after {} words", words.len());
                break 'words;
            }

            let size = measure.measure(&freq.word, font_size);
            let padding = options.margin.saturating_mul(2);
            let w = cells_for(size.width.saturating_add(padding));
            let h = cells_for(size.height.saturating_add(padding));

            if let Some((x, y)) = grid.find_spot(w, h) {
                break (x, y, w, h);
            }
            font_size -= 1.0;
        };

        grid.occupy(x, y, w, h);
        words.push(PlacedWord {
            word: freq.word.clone(),
            font_size,
            x: x as u32 * CELL,
            y: y as u32 * CELL,
            width: w as u32 * CELL,
            height: h as u32 * CELL,
            color: PALETTE[rank % PALETTE.len()],
        });

        last_freq = normalized;
        progress.inc(1);
    }

    debug!("Placed {} of {} words", words.len(), frequencies.len());
    WordCloudLayout {
        width: options.width,
        height: options.height,
        margin: options.margin,
        words,
    }
}

fn cells_for(pixels: u32) -> usize {
    pixels.div_ceil(CELL).max(1) as usize
}

/// Draw a computed layout.
pub fn render(font: &Font, layout: &WordCloudLayout, background: Rgb<u8>) -> RgbImage {
    let mut img = blank(layout.width, layout.height, background);

    for word in &layout.words {
        draw_text(
            &mut img,
            font,
            &word.word,
            (word.x + layout.margin) as i32,
            (word.y + layout.margin) as i32,
            word.font_size,
            word.color,
        );
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{test_font, FixedMeasure};

    fn options(width: u32, height: u32, max_font_size: f32) -> WordCloudOptions {
        WordCloudOptions {
            width,
            height,
            max_font_size,
            min_font_size: 4.0,
            relative_scaling: 0.5,
            margin: 2,
            background: Rgb([255, 255, 255]),
        }
    }

    fn freq(word: &str, count: usize) -> WordFrequency {
        WordFrequency {
            word: word.to_string(),
            count,
        }
    }

    #[test]
    fn test_layout_places_words_inside_canvas() {
        let freqs: Vec<_> = (0..40)
            .map(|i| freq(&format!("word{}", i), 100 - i * 2))
            .collect();
        let opts = options(400, 300, 80.0);

        let layout = layout(&FixedMeasure, &freqs, &opts, &ProgressBar::hidden());

        assert!(!layout.words.is_empty());
        assert!(layout.is_disjoint());
        for word in &layout.words {
            assert!(word.x + word.width <= 400);
            assert!(word.y + word.height <= 300);
        }
    }

    #[test]
    fn test_font_size_follows_frequency() {
        let freqs = vec![freq("alpha", 10), freq("beta", 5), freq("gamma", 1)];
        let layout = layout(&FixedMeasure, &freqs, &options(800, 600, 60.0), &ProgressBar::hidden());

        assert_eq!(layout.words.len(), 3);
        assert_eq!(layout.words[0].font_size, 60.0);
        assert!(layout.words[0].font_size > layout.words[1].font_size);
        assert!(layout.words[1].font_size > layout.words[2].font_size);
    }

    #[test]
    fn test_oversized_word_shrinks_to_fit() {
        let freqs = vec![freq("averyveryverylongword", 3)];
        let layout = layout(&FixedMeasure, &freqs, &options(200, 100, 250.0), &ProgressBar::hidden());

        assert_eq!(layout.words.len(), 1);
        let word = &layout.words[0];
        assert!(word.font_size < 250.0);
        assert!(word.x + word.width <= 200);
    }

    #[test]
    fn test_first_word_is_centered() {
        let freqs = vec![freq("hi", 1)];
        let layout = layout(&FixedMeasure, &freqs, &options(400, 400, 40.0), &ProgressBar::hidden());

        let word = &layout.words[0];
        let center_x = word.x + word.width / 2;
        let center_y = word.y + word.height / 2;
        assert!((center_x as i32 - 200).abs() <= 8);
        assert!((center_y as i32 - 200).abs() <= 8);
    }

    #[test]
    fn test_stops_when_canvas_full() {
        let freqs: Vec<_> = (0..500).map(|i| freq(&format!("w{}", i), 1)).collect();
        let layout = layout(&FixedMeasure, &freqs, &options(64, 64, 20.0), &ProgressBar::hidden());

        assert!(layout.words.len() < 500);
        assert!(layout.is_disjoint());
    }

    #[test]
    fn test_empty_frequencies() {
        let layout = layout(&FixedMeasure, &[], &options(100, 100, 40.0), &ProgressBar::hidden());
        assert!(layout.words.is_empty());
    }

    #[test]
    fn test_render_matches_canvas_size() {
        let font = test_font();
        let freqs = vec![freq("سلام", 8), freq("rust", 5), freq("chat", 2)];
        let opts = options(320, 200, 60.0);

        let layout = layout(&font, &freqs, &opts, &ProgressBar::hidden());
        assert_eq!(layout.words.len(), 3);
        assert!(layout.is_disjoint());

        let img = render(&font, &layout, opts.background);
        assert_eq!(img.dimensions(), (320, 200));
        assert!(img.pixels().any(|p| *p != opts.background));
    }

    #[test]
    fn test_huge_margin_places_nothing() {
        let mut opts = options(100, 100, 40.0);
        opts.margin = u32::MAX;

        let layout = layout(&FixedMeasure, &[freq("hi", 1)], &opts, &ProgressBar::hidden());
        assert!(layout.words.is_empty());
    }

    #[test]
    fn test_options_from_config() {
        let mut config = WordCloudConfig::default();
        config.background_color = "#000".to_string();

        let opts = WordCloudOptions::from_config(&config).unwrap();
        assert_eq!(opts.background, Rgb([0, 0, 0]));
        assert_eq!(opts.max_font_size, 250.0);

        config.background_color = "nope".to_string();
        assert!(WordCloudOptions::from_config(&config).is_err());
    }
}
