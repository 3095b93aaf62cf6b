use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Suppress progress chatter (errors still print). Set `SHOEDIST_QUIET=1`.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("SHOEDIST_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// How listing commands render rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        *self == OutputMode::Human
    }
}
