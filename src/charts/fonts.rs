//! Font registration for chart text.

use once_cell::sync::OnceCell;
use plotters::style::{register_font, FontStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Family name plotters resolves for captions, tick labels and legends.
const FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: [&str; 9] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/google-noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Register a font for chart text, once per process. Returns whether text
/// can be drawn. `preferred` is tried before the system locations.
pub fn ensure_chart_font(preferred: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let candidates = preferred
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

            for path in candidates {
                let Ok(bytes) = fs::read(&path) else {
                    continue;
                };
                // plotters keeps registered font data for the process lifetime
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                match register_font(FAMILY, FontStyle::Normal, bytes) {
                    Ok(()) => {
                        debug!(font = %path.display(), "registered chart font");
                        return Some(path);
                    }
                    Err(_) => warn!(font = %path.display(), "not a usable TrueType font"),
                }
            }

            warn!("no TrueType font found, charts will be drawn without text");
            None
        })
        .is_some()
}
