//! Navigation between alternate responses of the same parent.

use serde::{Deserialize, Serialize};

/// Presentation model of the `< 2 / 3 >` switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingSwitch {
    pub sibling_idx: usize,
    pub sibling_count: usize,
}

impl SiblingSwitch {
    pub fn new(sibling_idx: usize, sibling_count: usize) -> Self {
        Self {
            sibling_idx,
            sibling_count,
        }
    }

    /// Hidden when there is nothing to switch to.
    pub fn visible(&self) -> bool {
        self.sibling_count > 1
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.sibling_idx + 1, self.sibling_count)
    }

    /// Index selected by the previous button, if enabled.
    pub fn previous(&self) -> Option<usize> {
        self.sibling_idx.checked_sub(1)
    }

    /// Index selected by the next button, if enabled.
    pub fn next(&self) -> Option<usize> {
        let next = self.sibling_idx + 1;
        (next < self.sibling_count).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sibling_hidden() {
        let switch = SiblingSwitch::new(0, 1);
        assert!(!switch.visible());
        assert_eq!(switch.previous(), None);
        assert_eq!(switch.next(), None);
    }

    #[test]
    fn test_navigation_bounds() {
        let first = SiblingSwitch::new(0, 3);
        assert_eq!(first.label(), "1 / 3");
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(1));

        let last = SiblingSwitch::new(2, 3);
        assert_eq!(last.label(), "3 / 3");
        assert_eq!(last.previous(), Some(1));
        assert_eq!(last.next(), None);
    }
}
