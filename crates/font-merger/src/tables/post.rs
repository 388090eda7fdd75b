//! post table merging

use read_fonts::TableProvider;
use write_fonts::tables::post::Post;

use crate::{Result, context::MergeContext};

/// A version 2.0 post table carrying the merged (disambiguated) glyph names,
/// with every metric field taken from the first font.
pub fn merge_post(ctx: &MergeContext) -> Result<Post> {
    let first = ctx.first_font().post()?;

    let mut post = Post::new_v2(ctx.glyph_order().names().map(|n| n.as_str()));
    post.italic_angle = first.italic_angle();
    post.underline_position = first.underline_position();
    post.underline_thickness = first.underline_thickness();
    post.is_fixed_pitch = first.is_fixed_pitch();
    post.min_mem_type42 = first.min_mem_type42();
    post.max_mem_type42 = first.max_mem_type42();
    post.min_mem_type1 = first.min_mem_type1();
    post.max_mem_type1 = first.max_mem_type1();

    Ok(post)
}
