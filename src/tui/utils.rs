//! Layout and selector helpers shared by the TUI views.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rectangle of `percent_x` by `percent_y` centred in `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Step a selector index forward or backward, wrapping at both ends.
pub fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

/// Slice of a single-line `value` that fits in `width` columns with the cursor visible.
///
/// Returns the visible text and the cursor column inside it.
pub fn scroll_window(value: &str, cursor: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let offset = cursor.saturating_sub(width - 1);
    let visible = value.chars().skip(offset).take(width).collect();
    (visible, cursor - offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(2, 3, true), 0);
        assert_eq!(cycle(0, 3, false), 2);
        assert_eq!(cycle(1, 3, false), 0);
        assert_eq!(cycle(0, 0, true), 0);
    }

    #[test]
    fn test_scroll_window_keeps_cursor_inside() {
        assert_eq!(scroll_window("short", 5, 10), ("short".to_string(), 5));
        let (visible, col) = scroll_window("abcdefghijkl", 12, 5);
        assert_eq!(visible, "ijkl");
        assert_eq!(col, 4);
        let (visible, col) = scroll_window("abcdefghijkl", 2, 5);
        assert_eq!(visible, "abcde");
        assert_eq!(col, 2);
        assert_eq!(scroll_window("abc", 1, 0), (String::new(), 0));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 20, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.x, 25);
        assert!(inner.y > 0 && inner.bottom() < outer.bottom());
    }
}
