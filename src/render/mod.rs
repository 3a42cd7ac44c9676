//! HTML fragment rendering.
//!
//! Every function here is pure: the same record and [`RenderOptions`]
//! always produce the same bytes. Fragments are `\n`-terminated lines that
//! the pipeline appends to an output destination in order:
//!
//! - feed page: [`render_header`], one [`render_item_row`] per item, [`render_footer`]
//! - index page: [`render_index_header`], one [`render_index_entry`] per feed,
//!   [`render_index_footer`]

mod html;

pub use html::{
    render_footer, render_header, render_index_entry, render_index_footer, render_index_header,
    render_item_row, RenderOptions,
};
