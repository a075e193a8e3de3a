//! # Page Layout Planner
//!
//! Computes where every rendered symbol goes: page index and a rectangle in page
//! space (points, origin at the bottom-left corner).
//!
//! ## Grid mode (A4, Letter, A3, A5, Legal)
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            margin (20mm)             │
//! │   ┌──────────┬──────────┬──────────┐ │ ┐
//! │   │  [0]     │  [1]     │  [2]     │ │ │ cell_height =
//! │   ├──────────┼──────────┼──────────┤ │ │   symbol + caption reserve + row gap
//! │   │  [3]     │  [4]     │  [5]     │ │ ┘
//! │   └──────────┴──────────┴──────────┘ │
//! │       cell_width = usable / columns  │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Thermal mode (50x25mm label)
//!
//! One symbol per page, centred horizontally, anchored 2mm below the top edge.

mod page;

pub use page::{PageSize, mm_to_pt};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::symbol::{LayoutMode, RenderedSymbol};

/// Margin around the grid on standard paper.
pub const GRID_MARGIN_MM: f32 = 20.0;
pub const DEFAULT_COLUMNS: u32 = 3;
pub const DEFAULT_SYMBOL_WIDTH_MM: f32 = 37.0;
pub const DEFAULT_SYMBOL_HEIGHT_MM: f32 = 18.0;
/// Vertical gap between grid rows.
pub const ROW_GAP_MM: f32 = 8.0;

pub const THERMAL_SYMBOL_WIDTH_MM: f32 = 40.0;
pub const THERMAL_SYMBOL_HEIGHT_MM: f32 = 8.0;
pub const THERMAL_TOP_MARGIN_MM: f32 = 2.0;
pub const THERMAL_SIDE_MARGIN_MM: f32 = 2.0;

/// Caption size assumed when the batch does not set one.
const DEFAULT_CAPTION_PT: f32 = 16.0;
/// Millimetres per point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Minimum vertical space reserved for captions under each grid symbol.
pub const CAPTION_RESERVE_FLOOR_MM: f32 = 25.0;

/// Space reserved for the caption in the grid: two caption lines, but never
/// below [`CAPTION_RESERVE_FLOOR_MM`]. Thermal labels reserve nothing.
pub fn caption_reserve_mm(font_size_pt: f32) -> f32 {
    (font_size_pt * 2.0 * MM_PER_PT).max(CAPTION_RESERVE_FLOOR_MM)
}

/// Layout settings for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    /// Grid columns; [`DEFAULT_COLUMNS`] when `None`
    pub columns_per_row: Option<u32>,
    pub symbol_width_mm: Option<f32>,
    pub symbol_height_mm: Option<f32>,
    pub caption_font_size_pt: Option<f32>,
    pub include_caption: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            columns_per_row: None,
            symbol_width_mm: None,
            symbol_height_mm: None,
            caption_font_size_pt: None,
            include_caption: true,
        }
    }
}

impl LayoutConfig {
    pub fn mode(&self) -> LayoutMode {
        self.page_size.layout_mode()
    }
}

/// Where one symbol is drawn. Coordinates are points from the page's bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_index: usize,
    pub x: f32,
    pub y: f32,
    pub draw_width: f32,
    pub draw_height: f32,
}

impl Placement {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.draw_width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.draw_height
    }
}

/// Grid geometry in points, computed once per batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub columns: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Symbol plus caption reserve, centred vertically in the cell
    pub item_height: f32,
    pub draw_width: f32,
    pub draw_height: f32,
    pub rows_per_page: usize,
    pub items_per_page: usize,
}

impl GridGeometry {
    pub fn compute(config: &LayoutConfig) -> Self {
        let (page_width, page_height) = config.page_size.dimensions_pt();
        let margin = mm_to_pt(GRID_MARGIN_MM);
        let columns = config.columns_per_row.unwrap_or(DEFAULT_COLUMNS).max(1) as usize;

        let symbol_width = mm_to_pt(config.symbol_width_mm.unwrap_or(DEFAULT_SYMBOL_WIDTH_MM));
        let symbol_height = mm_to_pt(config.symbol_height_mm.unwrap_or(DEFAULT_SYMBOL_HEIGHT_MM));
        let font_pt = config.caption_font_size_pt.unwrap_or(DEFAULT_CAPTION_PT);
        let reserve = mm_to_pt(caption_reserve_mm(font_pt));

        let available_width = page_width - 2.0 * margin;
        let available_height = page_height - 2.0 * margin;
        let cell_width = available_width / columns as f32;

        let mut item_height = symbol_height + reserve;
        let mut cell_height = item_height + mm_to_pt(ROW_GAP_MM);
        let mut rows_per_page = (available_height / cell_height).floor() as usize;

        if rows_per_page == 0 {
            warn!(
                cell_height,
                available_height, "Grid cell taller than the page; shrinking to one row per page"
            );
            rows_per_page = 1;
            cell_height = available_height;
            item_height = item_height.min(available_height);
        }

        let geometry = Self {
            page_width,
            page_height,
            margin,
            columns,
            cell_width,
            cell_height,
            item_height,
            draw_width: symbol_width.min(cell_width),
            draw_height: symbol_height.min(item_height),
            rows_per_page,
            items_per_page: rows_per_page * columns,
        };
        debug!(?geometry, "Grid geometry");
        geometry
    }

    /// Placement of the `index`-th symbol.
    pub fn placement(&self, index: usize) -> Placement {
        let slot = index % self.items_per_page;
        let (row, col) = (slot / self.columns, slot % self.columns);

        Placement {
            page_index: index / self.items_per_page,
            x: self.margin + col as f32 * self.cell_width + (self.cell_width - self.draw_width) / 2.0,
            y: self.page_height - self.margin - (row + 1) as f32 * self.cell_height
                + (self.cell_height - self.item_height) / 2.0,
            draw_width: self.draw_width,
            draw_height: self.draw_height,
        }
    }

    /// Pages needed for `count` symbols.
    pub fn page_count(&self, count: usize) -> usize {
        count.div_ceil(self.items_per_page)
    }
}

/// Thermal label geometry in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub draw_width: f32,
    pub draw_height: f32,
    pub x: f32,
    pub y: f32,
}

impl ThermalGeometry {
    pub fn compute(config: &LayoutConfig) -> Self {
        let (page_width, page_height) = config.page_size.dimensions_pt();
        let side = mm_to_pt(THERMAL_SIDE_MARGIN_MM);
        let top = mm_to_pt(THERMAL_TOP_MARGIN_MM);

        let draw_width = mm_to_pt(config.symbol_width_mm.unwrap_or(THERMAL_SYMBOL_WIDTH_MM))
            .min(page_width - 2.0 * side);
        let draw_height = mm_to_pt(config.symbol_height_mm.unwrap_or(THERMAL_SYMBOL_HEIGHT_MM))
            .min(page_height - 2.0 * top);

        Self {
            page_width,
            page_height,
            draw_width,
            draw_height,
            x: (page_width - draw_width) / 2.0,
            y: page_height - top - draw_height,
        }
    }

    pub fn placement(&self, index: usize) -> Placement {
        Placement {
            page_index: index,
            x: self.x,
            y: self.y,
            draw_width: self.draw_width,
            draw_height: self.draw_height,
        }
    }
}

/// Placements for `count` symbols, in order.
pub fn plan_slots(count: usize, config: &LayoutConfig) -> Vec<Placement> {
    if config.page_size.is_thermal() {
        let geometry = ThermalGeometry::compute(config);
        (0..count).map(|i| geometry.placement(i)).collect()
    } else {
        let geometry = GridGeometry::compute(config);
        (0..count).map(|i| geometry.placement(i)).collect()
    }
}

/// One placement per symbol, in input order.
pub fn plan(symbols: &[RenderedSymbol], config: &LayoutConfig) -> Vec<Placement> {
    plan_slots(symbols.len(), config)
}

/// Number of pages the placements span.
pub fn pages_spanned(placements: &[Placement]) -> usize {
    placements.last().map_or(0, |p| p.page_index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f32 = 1e-3;

    fn grid(page_size: PageSize, columns: u32) -> LayoutConfig {
        LayoutConfig {
            page_size,
            columns_per_row: Some(columns),
            ..Default::default()
        }
    }

    #[test]
    fn test_a4_default_grid() {
        let g = GridGeometry::compute(&LayoutConfig::default());
        // 257mm usable / (18 + 25 + 8)mm cells
        assert_eq!(g.rows_per_page, 5);
        assert_eq!(g.items_per_page, 15);
        assert_eq!(g.columns, 3);
    }

    #[test]
    fn test_grid_ten_entries_page_count() {
        for page_size in [PageSize::A4, PageSize::A5, PageSize::Letter] {
            let config = grid(page_size, 3);
            let g = GridGeometry::compute(&config);
            let placements = plan_slots(10, &config);
            assert_eq!(pages_spanned(&placements), 10usize.div_ceil(g.items_per_page));
            assert_eq!(g.page_count(10), pages_spanned(&placements));
        }
    }

    #[test]
    fn test_grid_indices() {
        let config = LayoutConfig {
            symbol_height_mm: Some(60.0),
            ..grid(PageSize::A4, 3)
        };
        let g = GridGeometry::compute(&config);
        assert_eq!(g.items_per_page, 6);

        let placements = plan_slots(8, &config);
        assert_eq!(placements[5].page_index, 0);
        assert_eq!(placements[6].page_index, 1);
        // Slot 4 is row 1, col 1
        let p = placements[4];
        assert!((p.x - (g.margin + g.cell_width + (g.cell_width - g.draw_width) / 2.0)).abs() < EPS);
        let expected_y = g.page_height - g.margin - 2.0 * g.cell_height + (g.cell_height - g.item_height) / 2.0;
        assert!((p.y - expected_y).abs() < EPS);
        // Page 1 restarts at the top-left cell
        assert_eq!(placements[6].x, placements[0].x);
        assert_eq!(placements[6].y, placements[0].y);
    }

    #[test]
    fn test_page_index_non_decreasing() {
        let placements = plan_slots(100, &grid(PageSize::A5, 2));
        assert!(placements.windows(2).all(|w| w[0].page_index <= w[1].page_index));
    }

    #[test]
    fn test_grid_placements_inside_margins() {
        let sizes = [PageSize::A4, PageSize::Letter, PageSize::A3, PageSize::A5, PageSize::Legal];
        for page_size in sizes {
            for columns in 1..=6 {
                for (w, h) in [(37.0, 18.0), (80.0, 10.0), (20.0, 60.0), (200.0, 200.0)] {
                    let config = LayoutConfig {
                        symbol_width_mm: Some(w),
                        symbol_height_mm: Some(h),
                        ..grid(page_size, columns)
                    };
                    let g = GridGeometry::compute(&config);
                    for p in plan_slots(40, &config) {
                        assert!(p.x >= g.margin - EPS, "{page_size} {columns} {w}x{h}");
                        assert!(p.right() <= g.page_width - g.margin + EPS);
                        assert!(p.y >= g.margin - EPS, "{page_size} {columns} {w}x{h}");
                        assert!(p.top() <= g.page_height - g.margin + EPS);
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_cell_clamps_to_one_row() {
        let config = LayoutConfig {
            symbol_height_mm: Some(500.0),
            ..grid(PageSize::A5, 2)
        };
        let g = GridGeometry::compute(&config);
        assert_eq!(g.rows_per_page, 1);
        assert_eq!(g.items_per_page, 2);
        let placements = plan_slots(5, &config);
        assert_eq!(pages_spanned(&placements), 3);
    }

    #[test]
    fn test_zero_columns_treated_as_one() {
        let g = GridGeometry::compute(&grid(PageSize::A4, 0));
        assert_eq!(g.columns, 1);
    }

    #[test]
    fn test_thermal_one_per_page() {
        let config = LayoutConfig {
            page_size: PageSize::ThermalLabel,
            ..Default::default()
        };
        let placements = plan_slots(7, &config);
        for (i, p) in placements.iter().enumerate() {
            assert_eq!(p.page_index, i);
        }

        let (w, h) = PageSize::ThermalLabel.dimensions_pt();
        let p = placements[0];
        assert!((p.draw_width - mm_to_pt(40.0)).abs() < EPS);
        assert!((p.draw_height - mm_to_pt(8.0)).abs() < EPS);
        assert!((p.x + p.draw_width / 2.0 - w / 2.0).abs() < EPS);
        assert!((p.top() - (h - mm_to_pt(THERMAL_TOP_MARGIN_MM))).abs() < EPS);
    }

    #[test]
    fn test_thermal_oversized_symbol_is_clamped() {
        let config = LayoutConfig {
            page_size: PageSize::ThermalLabel,
            symbol_width_mm: Some(80.0),
            symbol_height_mm: Some(40.0),
            ..Default::default()
        };
        let p = plan_slots(1, &config)[0];
        assert!(p.x >= 0.0 && p.y >= 0.0);
        assert!((p.draw_width - mm_to_pt(46.0)).abs() < EPS);
        assert!((p.draw_height - mm_to_pt(21.0)).abs() < EPS);
    }

    #[test]
    fn test_caption_reserve() {
        assert_eq!(caption_reserve_mm(16.0), CAPTION_RESERVE_FLOOR_MM);
        assert_eq!(caption_reserve_mm(4.0), CAPTION_RESERVE_FLOOR_MM);
        assert!(caption_reserve_mm(72.0) > 50.0);
    }

    #[test]
    fn test_plan_empty() {
        assert!(plan(&[], &LayoutConfig::default()).is_empty());
        assert_eq!(pages_spanned(&[]), 0);
    }
}
