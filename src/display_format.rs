use std::sync::atomic::{AtomicBool, Ordering};

/// How pieces print: CJK tiles or doubled FEN letters, and whether concealed
/// pieces show their true kind instead of the face-down mask.
#[derive(Copy, Clone)]
pub struct DisplayFormat {
    pub chinese: bool,
    pub reveal: bool,
}

static DEFAULT_CHINESE: AtomicBool = AtomicBool::new(true);

impl DisplayFormat {
    pub fn pretty() -> Self {
        Self {
            chinese: DEFAULT_CHINESE.load(Ordering::Relaxed),
            reveal: false,
        }
    }

    pub fn with_chinese(&self, chinese: bool) -> Self {
        Self { chinese, ..*self }
    }

    pub fn with_reveal(&self, reveal: bool) -> Self {
        Self { reveal, ..*self }
    }

    pub fn set_default_chinese(chinese: bool) {
        DEFAULT_CHINESE.store(chinese, Ordering::Relaxed);
    }
}
