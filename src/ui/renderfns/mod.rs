pub mod footer;
pub mod header;
pub mod pager;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use pager::pager_line;
pub use utils::{stock_color, truncate};
