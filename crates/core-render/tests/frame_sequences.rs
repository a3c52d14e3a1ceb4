use core_events::WinSize;
use core_render::{Location, RenderCtx, RenderEvent, Renderer};
use core_state::CompletionManager;
use core_terminal::Vt100Writer;
use core_text::Buffer;
use pretty_assertions::assert_eq;

fn renderer(cols: u16) -> Renderer<Vt100Writer<Vec<u8>>> {
    let mut r = Renderer::new(Vt100Writer::new(Vec::new()));
    r.update_win_size(WinSize::new(24, cols));
    r
}

fn frames(r: &Renderer<Vt100Writer<Vec<u8>>>) -> Vec<String> {
    let out = String::from_utf8(r.writer().get_ref().clone()).unwrap();
    out.split_terminator("\x1b[?25h").map(str::to_string).collect()
}

#[test]
fn second_frame_erases_wrapped_first_frame() {
    let mut r = renderer(10);
    let completion = CompletionManager::default();
    let cmd = Buffer::from_text("> abcdefghijkl");
    let (cursor, end) = r
        .render(&RenderCtx {
            cmd: &cmd,
            prefix: "> ",
            cursor: Location::default(),
            end_cursor: Location::default(),
            completion: &completion,
            render_completion: false,
            event: RenderEvent::Basic,
        })
        .unwrap();
    assert_eq!(cursor, Location::new(1, 4));
    assert_eq!(end, Location::new(1, 4));

    let cmd = Buffer::from_text("> ab");
    let (cursor, end) = r
        .render(&RenderCtx {
            cmd: &cmd,
            prefix: "> ",
            cursor,
            end_cursor: end,
            completion: &completion,
            render_completion: false,
            event: RenderEvent::Basic,
        })
        .unwrap();
    assert_eq!((cursor, end), (Location::new(0, 4), Location::new(0, 4)));

    let frames = frames(&r);
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("abcdefgh\nijkl"), "{:?}", frames[0]);
    assert!(
        frames[1].starts_with("\x1b[?25l\x1b[J\x1b[4D\x1b[K\x1b[1A\x1b[K"),
        "{:?}",
        frames[1]
    );
}

#[test]
fn wide_glyphs_count_two_columns() {
    let mut r = renderer(80);
    let completion = CompletionManager::default();
    let mut cmd = Buffer::from_text("> 日本語");
    cmd.set_cursor_position(3);
    let (cursor, end) = r
        .render(&RenderCtx {
            cmd: &cmd,
            prefix: "> ",
            cursor: Location::default(),
            end_cursor: Location::default(),
            completion: &completion,
            render_completion: false,
            event: RenderEvent::Basic,
        })
        .unwrap();
    assert_eq!(cursor, Location::new(0, 4));
    assert_eq!(end, Location::new(0, 8));
    assert!(frames(&r)[0].ends_with("日本語\x1b[4D"));
}

#[test]
fn multi_line_input_keeps_cursor_row() {
    let mut r = renderer(40);
    let completion = CompletionManager::default();
    let mut cmd = Buffer::from_text("> first\nsecond\nthird");
    cmd.set_cursor_position(4);
    let (cursor, end) = r
        .render(&RenderCtx {
            cmd: &cmd,
            prefix: "> ",
            cursor: Location::default(),
            end_cursor: Location::default(),
            completion: &completion,
            render_completion: false,
            event: RenderEvent::Basic,
        })
        .unwrap();
    assert_eq!(cursor, Location::new(0, 4));
    assert_eq!(end, Location::new(2, 5));
    // From (2,5) back to (0,4): two rows up, one column back.
    assert!(frames(&r)[0].ends_with("third\x1b[2A\x1b[1D"));
}
