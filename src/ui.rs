pub mod font;
pub mod side_by_side;
pub mod title_bar;
pub mod unified;
pub mod viewport;
