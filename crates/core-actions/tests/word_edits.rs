use core_actions::{Action, DispatchResult, dispatch};
use core_text::Buffer;
use pretty_assertions::assert_eq;

fn buffer(text: &str, pos: usize) -> Buffer {
    let mut buf = Buffer::from_text(text);
    buf.set_cursor_position(pos);
    buf
}

#[test]
fn go_left_word_from_middle() {
    let mut buf = buffer("word", 2);
    dispatch(Action::GoLeftWord, &mut buf);
    assert_eq!(buf.cursor_position(), 0);
}

#[test]
fn word_motions_skip_adjacent_spaces() {
    let mut buf = buffer("git  commit -m", 5);
    dispatch(Action::GoLeftWord, &mut buf);
    assert_eq!(buf.cursor_position(), 0);

    let mut buf = buffer("git  commit -m", 3);
    dispatch(Action::GoRightWord, &mut buf);
    assert_eq!(buf.cursor_position(), 11);
}

#[test]
fn delete_word_takes_trailing_space() {
    let mut buf = buffer("echo hello ", 11);
    dispatch(Action::DeleteWord, &mut buf);
    assert_eq!(buf.text(), "echo ");
    assert_eq!(buf.cursor_position(), 5);
}

#[test]
fn delete_char_variants() {
    let mut buf = buffer("abc", 1);
    dispatch(Action::DeleteChar, &mut buf);
    assert_eq!(buf.text(), "ac");
    dispatch(Action::DeleteBeforeChar, &mut buf);
    assert_eq!(buf.text(), "c");
    assert_eq!(buf.cursor_position(), 0);

    let mut empty = Buffer::new();
    dispatch(Action::DeleteCharIfNotEmpty, &mut empty);
    assert_eq!(empty.text(), "");
}

#[test]
fn kill_line_acts_on_current_row() {
    let mut buf = buffer("first\nsecond line\nthird", 12);
    dispatch(Action::KillLineAfter, &mut buf);
    assert_eq!(buf.text(), "first\nsecond\nthird");
    dispatch(Action::KillLineBefore, &mut buf);
    assert_eq!(buf.text(), "first\n\nthird");
    assert_eq!(buf.cursor_position(), 6);
}

#[test]
fn clear_screen_is_reported() {
    let mut buf = buffer("abc", 3);
    assert_eq!(dispatch(Action::ClearScreen, &mut buf), DispatchResult::clear_screen());
    assert_eq!(buf.text(), "abc");
    assert_eq!(dispatch(Action::GoLineEnd, &mut buf), DispatchResult::clean());
}
