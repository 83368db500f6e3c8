use crate::encode::sink::VideoFormat;

/// File name of the full collage still.
pub const COLLAGE_FILE_NAME: &str = "cover_collage.png";

/// Stem of the exported animation; the extension follows the video format.
pub const VIDEO_FILE_STEM: &str = "cover_animation";

/// Lowercase ASCII slug: runs of anything but `[a-z0-9]` become one `-`, edges trimmed.
/// An empty name slugs as `image`; a name with no usable characters slugs as `""`.
pub fn slug(name: &str) -> String {
    let source = if name.is_empty() { "image" } else { name };
    let mut out = String::with_capacity(source.len());
    let mut pending_dash = false;
    for c in source.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// `single_NN_<slug>.png` for the item at 1-based display `position`; falls back to
/// `img-<position>` when the name has no slug.
pub fn single_file_name(position: usize, name: &str) -> String {
    let base = match slug(name) {
        s if s.is_empty() => format!("img-{position}"),
        s => s,
    };
    format!("single_{position:02}_{base}.png")
}

/// `cover_animation.<ext>`.
pub fn video_file_name(format: VideoFormat) -> String {
    format!("{VIDEO_FILE_STEM}.{}", format.extension())
}

#[cfg(test)]
#[path = "../../tests/unit/export/naming.rs"]
mod tests;
