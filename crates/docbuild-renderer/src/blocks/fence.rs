//! Fenced code tracking so block openers inside code samples are left alone.

/// Open fence: marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

/// Line-by-line tracker for backtick and tilde code fences.
#[derive(Debug, Default)]
pub(super) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(super) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line.
    pub(super) fn update(&mut self, line: &str) {
        let Some(candidate) = fence_run(line) else {
            return;
        };

        match self.open {
            None => self.open = Some(candidate),
            Some(open) => {
                let closes = candidate.marker == open.marker
                    && candidate.len >= open.len
                    && line.trim()[candidate.len..].is_empty();
                if closes {
                    self.open = None;
                }
            }
        }
    }
}

/// Detect a run of three or more fence characters, indented by at most three spaces.
fn fence_run(line: &str) -> Option<Fence> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some(Fence { marker, len })
}
