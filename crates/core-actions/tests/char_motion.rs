use core_actions::{Action, dispatch};
use core_text::Buffer;
use pretty_assertions::assert_eq;

const INPUT: &str = "зеленый\nred\nсиний";

fn buffer_at(pos: usize) -> Buffer {
    let mut buf = Buffer::from_text(INPUT);
    buf.set_cursor_position(pos);
    buf
}

#[test]
fn go_right_char_stops_at_end_of_text() {
    let mut buf = Buffer::from_text(INPUT);
    dispatch(Action::GoRightChar, &mut buf);
    assert_eq!(buf.cursor_position(), INPUT.chars().count());
}

#[test]
fn go_right_char_within_row() {
    let mut buf = buffer_at(0);
    dispatch(Action::GoRightChar, &mut buf);
    assert_eq!(buf.cursor_position(), 1);

    let mut buf = buffer_at(6);
    dispatch(Action::GoRightChar, &mut buf);
    assert_eq!(buf.cursor_position(), 7);
}

#[test]
fn go_right_char_wraps_to_next_row_start() {
    let mut buf = buffer_at(7);
    dispatch(Action::GoRightChar, &mut buf);
    assert_eq!(buf.cursor_position(), 8);
}

#[test]
fn go_left_char() {
    let mut buf = Buffer::from_text(INPUT);
    dispatch(Action::GoLeftChar, &mut buf);
    assert_eq!(buf.cursor_position(), INPUT.chars().count() - 1);

    let mut buf = buffer_at(0);
    dispatch(Action::GoLeftChar, &mut buf);
    assert_eq!(buf.cursor_position(), 0);

    // Start of "red" continues at the end of the first row.
    let mut buf = buffer_at(8);
    dispatch(Action::GoLeftChar, &mut buf);
    assert_eq!(buf.cursor_position(), 7);
}

#[test]
fn line_ends() {
    let mut buf = buffer_at(9);
    dispatch(Action::GoLineEnd, &mut buf);
    assert_eq!(buf.cursor_position(), 11);
    dispatch(Action::GoLineBeginning, &mut buf);
    assert_eq!(buf.cursor_position(), 8);
}
