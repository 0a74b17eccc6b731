//! Live views over the log: `watch` (read-only tail) and `chat`.
//!
//! Both are a watermark plus a timed re-query through [`Poller`]. Chat
//! interleaves a zero-timeout keyboard check with the poll on one task.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use agent_comms_core::config::{ChatConfig, PollConfig};
use agent_comms_core::{CommsDb, MessageLog, Poller};
use anyhow::Result;
use console::style;
use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{queue, style::Print};
use tracing::debug;

use crate::editor::{EditorAction, LineEditor};
use crate::render::format_row;

/// Tail every channel until interrupted.
pub async fn run_watch(db: &CommsDb, poll: &PollConfig) -> Result<()> {
    let poller = Poller::new(db);
    let mut watermark = poller.start().await?;
    let interval = poll.watch_interval();

    println!(
        "{}",
        style(format!(
            "[watching, polling every {:.1}s, last_id={}]",
            interval.as_secs_f64(),
            watermark
        ))
        .dim()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let batch = poller.poll(watermark).await?;
        for message in &batch.messages {
            println!("{}", format_row(message));
        }
        watermark = batch.watermark;
    }

    println!("\n{}", style("[stopped]").dim());
    Ok(())
}

/// Restores cooked terminal mode however the chat loop exits.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn clear_line(out: &mut impl Write) -> io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))
}

fn redraw_prompt(out: &mut impl Write, editor: &LineEditor) -> io::Result<()> {
    clear_line(out)?;
    queue!(out, Print(editor.prompt()))?;
    out.flush()
}

/// Interactive tail that also posts typed lines as `chat.sender`.
pub async fn run_chat(db: &CommsDb, poll: &PollConfig, chat: &ChatConfig) -> Result<()> {
    if !io::stdin().is_terminal() {
        anyhow::bail!("chat needs an interactive terminal; use `comms post` from scripts");
    }

    let log = MessageLog::new(db);
    let poller = Poller::new(db);

    let backlog = log.recent(chat.backlog).await?;
    for message in &backlog {
        println!("{}", format_row(message));
    }
    if !backlog.is_empty() {
        println!();
    }
    let mut watermark = match backlog.last() {
        Some(message) => message.id,
        None => poller.start().await?,
    };

    println!(
        "{}",
        style("[chat mode, type message + enter to send, ctrl-c to quit]").dim()
    );
    println!();

    let interval = poll.chat_interval();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut out = io::stdout();
    let mut editor = LineEditor::new();
    let guard = RawModeGuard::enable()?;
    redraw_prompt(&mut out, &editor)?;

    loop {
        if event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match editor.handle_key(key) {
                EditorAction::Quit => break,
                EditorAction::Submit(line) => {
                    clear_line(&mut out)?;
                    log.post(&chat.sender, &chat.channel, &line).await?;
                    debug!(sender = %chat.sender, "Posted chat line");
                    redraw_prompt(&mut out, &editor)?;
                }
                EditorAction::Redraw => redraw_prompt(&mut out, &editor)?,
                EditorAction::Ignore => {}
            }
            continue;
        }

        let batch = poller.poll(watermark).await?;
        if !batch.is_empty() {
            clear_line(&mut out)?;
            for message in &batch.messages {
                // Raw mode: no implicit carriage return.
                queue!(out, Print(format_row(message)), Print("\r\n"))?;
            }
            watermark = batch.watermark;
            redraw_prompt(&mut out, &editor)?;
        }

        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    drop(guard);
    println!("\n{}", style("[left chat]").dim());
    Ok(())
}
