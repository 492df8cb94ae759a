//! Options for compressing hints

/// Options for compressing hints
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Mark the packed output for grayscale rendering (0xF7 rather than 0xF6)
    pub gray: bool,

    /// Decode every encoded stream and fail unless it reproduces the input
    pub verify: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gray(mut self, gray: bool) -> Self {
        self.gray = gray;
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}
