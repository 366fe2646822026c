// Advanced SubStation Alpha (.ass) output
use super::SubtitleEvent;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const STYLE_NAME: &str = "Default";

/// Format seconds as `H:MM:SS.CC`.
///
/// Rounds to whole centiseconds first so that carries propagate
/// (59.999s becomes `0:01:00.00`, never `0:00:59.100`).
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let total_cs = (seconds * 100.0).round() as u64;

    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let secs = (total_cs % 6_000) / 100;
    let cs = total_cs % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, cs)
}

/// Keep recognized text on one dialogue line and out of override blocks.
fn escape_text(text: &str) -> String {
    text.trim()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\\N")
        .replace('{', "(")
        .replace('}', ")")
}

fn header(width: u32, height: u32) -> String {
    let font_size = (height as f64 / 20.0).round() as u32;

    format!(
        "[Script Info]
Title: Generated Subtitles
ScriptType: v4.00+
WrapStyle: 0
PlayResX: {width}
PlayResY: {height}
ScaledBorderAndShadow: yes
YCbCr Matrix: None

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: {STYLE_NAME},Arial,{font_size},&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,1,5,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
"
    )
}

/// Render a complete .ass document for a `width` x `height` canvas.
///
/// The style uses middle-center alignment, so `\pos` places the visual
/// center of each cue at the event's anchor point.
pub fn generate_ass(events: &[SubtitleEvent], width: u32, height: u32) -> String {
    let mut output = header(width, height);

    for event in events {
        let _ = writeln!(
            output,
            "Dialogue: 0,{},{},{},,0,0,0,,{{\\pos({},{})}}{}",
            format_time(event.start),
            format_time(event.end),
            STYLE_NAME,
            event.x.round() as i64,
            event.y.round() as i64,
            escape_text(&event.text)
        );
    }

    output
}

/// `clip.mp4` with language `vi` becomes `clip.vi.ass` in the same directory.
pub fn output_path_for(input: &Path, language: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!("{}.{}.ass", stem.to_string_lossy(), language));
    output
}
