use crate::output::is_quiet;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static PALETTE: OnceLock<Palette> = OnceLock::new();

pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const DATABASE: &str = "🗄️";
    pub const LINK: &str = "🔗";
}

/// Message styles, colored only when stdout is a terminal
#[derive(Debug, Clone)]
struct Palette {
    header: Style,
    success: Style,
    error: Style,
    warn: Style,
    dim: Style,
}

impl Palette {
    fn detect() -> Self {
        if console::Term::stdout().is_term() {
            Self {
                header: Style::new().cyan().bold(),
                success: Style::new().green().bold(),
                error: Style::new().red().bold(),
                warn: Style::new().yellow().bold(),
                dim: Style::new().bright_black(),
            }
        } else {
            Self::plain()
        }
    }

    fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            dim: Style::new(),
        }
    }
}

fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::detect)
}

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::DATABASE, text.style(palette().header.clone()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(palette().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(palette().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(palette().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("  {}: {}", label.style(palette().dim.clone()), value);
}

pub fn dim(text: &str) -> String {
    text.style(palette().dim.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_palette_leaves_text_untouched() {
        let plain = Palette::plain();
        assert_eq!("Makes is empty".style(plain.dim).to_string(), "Makes is empty");
    }

    #[test]
    fn test_dim_keeps_message_text() {
        // Test output is captured, so the detected palette may or may not color
        assert!(dim("Shoes is empty").contains("Shoes is empty"));
    }
}
