use std::borrow::Cow;

use super::DeckOptions;
use crate::models::Song;

const INDENT: &str = "    ";

/// Line-oriented accumulator that keeps the nested `tell` blocks readable.
struct ScriptBuilder {
    out: String,
}

impl ScriptBuilder {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Escape backslashes and double quotes for an AppleScript string literal.
pub fn escape_literal(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\\', '"']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        if matches!(ch, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Cow::Owned(escaped)
}

fn literal(raw: &str, escape: bool) -> Cow<'_, str> {
    if escape {
        escape_literal(raw)
    } else {
        Cow::Borrowed(raw)
    }
}

/// Render the full document-building script for `songs`, in order.
///
/// Each song produces one title+body slide carrying its first section, then
/// one body-only slide per remaining section. The placeholder slide created
/// with the document is removed only after the content slides exist, and the
/// document is saved as `<filename>.<extension>`.
pub fn generate_script(options: &DeckOptions, filename: &str, songs: &[Song]) -> String {
    let escape = options.escape_text;

    let mut script = ScriptBuilder::new();
    script.line(0, format!("tell application \"{}\"", options.application));
    script.line(1, "activate");
    script.line(
        1,
        format!(
            "set thisDocument to make new document with properties {{document theme:theme \"{}\", width:{}, height:{}}}",
            options.theme, options.width, options.height
        ),
    );
    script.blank();
    script.line(1, "tell front document");

    for song in songs {
        let sections = song.sections();
        let (first, rest) = sections.split_first().unwrap_or((&"", &[]));

        script.line(
            2,
            format!(
                "set currentSlide to make new slide with properties {{base layout:slide layout \"{}\"}}",
                options.title_layout
            ),
        );
        script.line(2, "tell currentSlide");
        script.line(
            3,
            format!(
                "set the object text of the default title item to \"{}\"",
                literal(&song.title, escape)
            ),
        );
        script.line(
            3,
            format!(
                "set the object text of the default body item to \"{}\"",
                literal(first, escape)
            ),
        );
        script.line(2, "end tell");

        for section in rest {
            script.line(
                2,
                format!(
                    "set currentSlide to make new slide with properties {{base layout:slide layout \"{}\"}}",
                    options.body_layout
                ),
            );
            script.line(2, "tell currentSlide");
            script.line(
                3,
                format!(
                    "set the object text of the default body item to \"{}\"",
                    literal(section, escape)
                ),
            );
            script.line(2, "end tell");
        }
    }

    // Moving the first slide gives the application a focus target before
    // the placeholder is deleted.
    script.line(2, "move the first slide to before first slide");
    script.line(2, "delete first slide");
    script.line(1, "end tell");

    let name = literal(filename, escape);
    match &options.output_dir {
        None => script.line(
            1,
            format!(
                "save thisDocument in file (((path to desktop folder) as string) & \"{}\" & \".{}\")",
                name, options.extension
            ),
        ),
        Some(dir) => {
            let target = dir.join(format!("{}.{}", filename, options.extension));
            script.line(
                1,
                format!(
                    "save thisDocument in POSIX file \"{}\"",
                    literal(&target.to_string_lossy(), escape)
                ),
            );
        }
    }
    script.line(0, "end tell");

    script.finish()
}
