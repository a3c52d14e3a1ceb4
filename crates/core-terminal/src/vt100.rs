//! Buffered VT100 writer.
//!
//! Primitives are collected as [`Command`]s and emitted in order on
//! `flush`. Nothing reaches the underlying writer before then.

use std::io::{self, Stdout, Write};

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveTo, MoveUp, Show},
    queue,
    style::{Attribute, Color, Colors, Print, SetAttribute, SetColors},
    terminal::{Clear, ClearType, SetTitle},
};

/// Index: content moves up, cursor stays on screen.
const SCROLL_DOWN: &[u8] = b"\x1bD";
/// Reverse index: content moves down.
const SCROLL_UP: &[u8] = b"\x1bM";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Raw(Vec<u8>),
    Print(String),
    MoveUp(u16),
    MoveDown(u16),
    MoveRight(u16),
    MoveLeft(u16),
    MoveTo(u16, u16),
    Clear(ClearType),
    Hide,
    Show,
    SetTitle(String),
    Colors { fg: Color, bg: Color, bold: bool },
}

fn clamp_count(n: i32) -> u16 {
    u16::try_from(n.unsigned_abs()).unwrap_or(u16::MAX)
}

pub struct Vt100Writer<W: Write> {
    out: W,
    cmds: Vec<Command>,
}

impl Vt100Writer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Vt100Writer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cmds: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Commands queued since the last flush.
    pub fn pending(&self) -> usize {
        self.cmds.len()
    }

    fn push(&mut self, c: Command) {
        self.cmds.push(c);
    }

    fn vertical(&mut self, n: i32, up: bool) {
        if n == 0 {
            return;
        }
        let count = clamp_count(n);
        if (n > 0) == up {
            self.push(Command::MoveUp(count));
        } else {
            self.push(Command::MoveDown(count));
        }
    }

    fn horizontal(&mut self, n: i32, forward: bool) {
        if n == 0 {
            return;
        }
        let count = clamp_count(n);
        if (n > 0) == forward {
            self.push(Command::MoveRight(count));
        } else {
            self.push(Command::MoveLeft(count));
        }
    }
}

impl<W: Write> crate::ConsoleWriter for Vt100Writer<W> {
    fn write_raw(&mut self, data: &[u8]) {
        if !data.is_empty() {
            self.push(Command::Raw(data.to_vec()));
        }
    }

    fn write_str(&mut self, s: &str) {
        if !s.is_empty() {
            self.push(Command::Print(s.replace('\x1b', "?")));
        }
    }

    fn flush(&mut self) -> Result<()> {
        for c in self.cmds.drain(..) {
            match c {
                Command::Raw(bytes) => self.out.write_all(&bytes)?,
                Command::Print(s) => queue!(self.out, Print(s))?,
                Command::MoveUp(n) => queue!(self.out, MoveUp(n))?,
                Command::MoveDown(n) => queue!(self.out, MoveDown(n))?,
                Command::MoveRight(n) => queue!(self.out, MoveRight(n))?,
                Command::MoveLeft(n) => queue!(self.out, MoveLeft(n))?,
                Command::MoveTo(col, row) => queue!(self.out, MoveTo(col, row))?,
                Command::Clear(kind) => queue!(self.out, Clear(kind))?,
                Command::Hide => queue!(self.out, Hide)?,
                Command::Show => queue!(self.out, Show)?,
                Command::SetTitle(t) => queue!(self.out, SetTitle(t))?,
                Command::Colors { fg, bg, bold } => {
                    queue!(self.out, SetAttribute(Attribute::Reset))?;
                    if bold {
                        queue!(self.out, SetAttribute(Attribute::Bold))?;
                    }
                    queue!(self.out, SetColors(Colors::new(fg, bg)))?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn erase_screen(&mut self) {
        self.push(Command::Clear(ClearType::All));
    }

    fn erase_down(&mut self) {
        self.push(Command::Clear(ClearType::FromCursorDown));
    }

    fn erase_end_of_line(&mut self) {
        self.push(Command::Clear(ClearType::UntilNewLine));
    }

    fn cursor_goto(&mut self, row: u16, col: u16) {
        self.push(Command::MoveTo(col, row));
    }

    fn cursor_up(&mut self, n: i32) {
        self.vertical(n, true);
    }

    fn cursor_down(&mut self, n: i32) {
        self.vertical(n, false);
    }

    fn cursor_forward(&mut self, n: i32) {
        self.horizontal(n, true);
    }

    fn cursor_backward(&mut self, n: i32) {
        self.horizontal(n, false);
    }

    fn hide_cursor(&mut self) {
        self.push(Command::Hide);
    }

    fn show_cursor(&mut self) {
        self.push(Command::Show);
    }

    fn scroll_down(&mut self) {
        self.push(Command::Raw(SCROLL_DOWN.to_vec()));
    }

    fn scroll_up(&mut self) {
        self.push(Command::Raw(SCROLL_UP.to_vec()));
    }

    fn set_title(&mut self, title: &str) {
        self.push(Command::SetTitle(title.replace(['\x1b', '\x07'], "")));
    }

    fn clear_title(&mut self) {
        self.push(Command::SetTitle(String::new()));
    }

    fn set_color(&mut self, fg: Color, bg: Color, bold: bool) {
        self.push(Command::Colors { fg, bg, bold });
    }
}
