use image::GrayImage;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use tracing::debug;

const CANNY_LOW_THRESHOLD: f32 = 50.0;
const CANNY_HIGH_THRESHOLD: f32 = 150.0;
const HOUGH_VOTE_THRESHOLD: u32 = 100;
const HOUGH_SUPPRESSION_RADIUS: u32 = 8;
const MIN_LINE_COUNT: usize = 20;

/// Heuristic gate deciding whether uploaded bytes plausibly depict a price
/// chart. Charts are dominated by straight segments (axes, gridlines,
/// candle wicks, trendlines), so edge detection followed by a Hough line
/// sweep with a fixed cutoff filters out selfies, screenshots of text and
/// other obviously-wrong submissions before an AI call is paid for.
///
/// Unreadable or corrupt input is rejected, never an error. False
/// positives and negatives are expected and acceptable.
pub fn looks_like_chart(bytes: &[u8]) -> bool {
    let gray: GrayImage = match image::load_from_memory(bytes) {
        Ok(img) => img.to_luma8(),
        Err(e) => {
            debug!("chart gate: unreadable image: {}", e);
            return false;
        }
    };

    let edges = canny(&gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: HOUGH_VOTE_THRESHOLD,
            suppression_radius: HOUGH_SUPPRESSION_RADIUS,
        },
    );

    debug!("chart gate: {} line segments detected", lines.len());
    lines.len() > MIN_LINE_COUNT
}
