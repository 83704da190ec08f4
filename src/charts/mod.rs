//! Charts module - chart specification and rendering

mod renderer;
mod spec;

pub use renderer::render;
pub use spec::{
    build_all, ChartError, ChartSpec, HeatmapGrid, LabeledValue, PieSlice, SeriesData,
};
