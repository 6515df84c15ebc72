//! Record renderers behind the sink's `RecordRenderer` seam.

mod json;
mod table;
mod text;

pub use json::JsonRenderer;
pub use table::TableRenderer;
pub use text::TextRenderer;

use skein_core::engine::ItemStatus;

fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Succeeded => "ok",
        ItemStatus::FailedTerminal => "failed",
        ItemStatus::Filtered => "filtered",
        ItemStatus::Blocked => "blocked",
    }
}
