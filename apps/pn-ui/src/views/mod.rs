pub mod phase_table_view;
pub mod plot_view;
pub mod temperature_view;

pub use plot_view::PlotView;
pub use temperature_view::TemperatureView;
