/// Presentation layer: sidebar filters, top bar, charts, data table.
pub mod central;
pub mod panels;
pub mod plot;
pub mod table;
