//! Interactive drawing console
//!
//! Reads one action per line from stdin and drives a [`DrawingSession`].
//! Notifications are printed by a separate subscriber task so background
//! sends can report while the prompt waits.

use anyhow::{bail, Result};
use sketchbot_canvas::{MemoryCanvas, Point};
use sketchbot_core::{DrawingSession, Notification, NotificationBus, TransmissionMode};
use sketchbot_device::{Axis, DeviceCommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use super::{device::read_strokes, render};
use crate::app::{self, AppConfig};

const HELP: &str = "\
Drawing:
  down X Y | drag X Y | up       pointer gesture
  line X1,Y1 X2,Y2 ...           whole stroke in one line
  erase [on|off]                 erase mode (toggles without argument)
  mode [aggressive|batched]      transmission mode (toggles without argument)
  send                           send the whole drawing
  undo | redo | clear | reset    canvas history
  load FILE                      load a JSON stroke file
  svg                            print the drawing as SVG
Arm:
  pos                            read position
  axis x|y|z|e VALUE             change one axis and move
  cmd home|reset|stop|setworkheight|testworkheight
Reference image:
  image                          fetch the current image
  save | confirm | cancel        save the drawing under the image
Other:
  status | help | quit";

/// One console action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Down(Point),
    Drag(Point),
    Up,
    Line(Vec<Point>),
    Erase(Option<bool>),
    Mode(Option<TransmissionMode>),
    Send,
    Undo,
    Redo,
    Clear,
    Reset,
    Load(PathBuf),
    Svg,
    Position,
    Axis(Axis, i32),
    Command(DeviceCommand),
    Image,
    Save,
    Confirm,
    Cancel,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Action>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let action = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("down", [x, y]) => Action::Down(point(x, y)?),
        ("drag", [x, y]) => Action::Drag(point(x, y)?),
        ("up", []) => Action::Up,
        ("line", pairs) if !pairs.is_empty() => Action::Line(
            pairs
                .iter()
                .map(|pair| match pair.split_once(',') {
                    Some((x, y)) => point(x, y),
                    None => bail!("expected X,Y but got '{pair}'"),
                })
                .collect::<Result<_>>()?,
        ),
        ("erase", []) => Action::Erase(None),
        ("erase", [flag]) => Action::Erase(Some(on_off(flag)?)),
        ("mode", []) => Action::Mode(None),
        ("mode", [mode]) => Action::Mode(Some(match *mode {
            "aggressive" => TransmissionMode::Aggressive,
            "batched" => TransmissionMode::Batched,
            other => bail!("unknown mode '{other}'"),
        })),
        ("send", []) => Action::Send,
        ("undo", []) => Action::Undo,
        ("redo", []) => Action::Redo,
        ("clear", []) => Action::Clear,
        ("reset", []) => Action::Reset,
        ("load", [file]) => Action::Load(PathBuf::from(file)),
        ("svg", []) => Action::Svg,
        ("pos", []) => Action::Position,
        ("axis", [axis, value]) => Action::Axis(
            axis.parse().map_err(anyhow::Error::msg)?,
            value.parse()?,
        ),
        ("cmd", [name]) => Action::Command(name.parse().map_err(anyhow::Error::msg)?),
        ("image", []) => Action::Image,
        ("save", []) => Action::Save,
        ("confirm", []) => Action::Confirm,
        ("cancel", []) => Action::Cancel,
        ("status", []) => Action::Status,
        ("help" | "?", []) => Action::Help,
        ("quit" | "exit", []) => Action::Quit,
        _ => bail!("unrecognised input '{}', try 'help'", line.trim()),
    };
    Ok(Some(action))
}

fn point(x: &str, y: &str) -> Result<Point> {
    Ok(Point::new(x.parse()?, y.parse()?))
}

fn on_off(flag: &str) -> Result<bool> {
    match flag {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("expected on or off, got '{other}'"),
    }
}

/// Run the console until `quit` or end of input
pub async fn run(config: AppConfig) -> Result<()> {
    let bus = NotificationBus::new(config.session.notification_capacity);
    // subscribed here so nothing published before the task first runs is lost
    let printer = tokio::spawn(print_notifications(bus.subscribe(), std::io::stdout()));

    let dispatcher = app::dispatcher(&config, Arc::new(bus))?;
    let canvas = MemoryCanvas::new(config.canvas.clone());
    let mut session = DrawingSession::new(config.session.clone(), dispatcher, Box::new(canvas));

    println!("🖊  Sketchbot console ({} mode). Type 'help' for commands.", session.transmission_mode());
    session.refresh_position().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match parse_line(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                println!("⚠️  {e:#}");
                continue;
            }
        };
        if action == Action::Quit {
            break;
        }
        if let Err(e) = apply(&mut session, &config, action).await {
            println!("⚠️  {e:#}");
        }
    }

    info!(pending = session.in_flight(), "Waiting for outstanding sends");
    session.flush().await;
    drop(session);
    // closes once the last dispatcher clone is gone
    let _ = tokio::time::timeout(Duration::from_millis(500), printer).await;
    Ok(())
}

async fn apply(session: &mut DrawingSession, config: &AppConfig, action: Action) -> Result<()> {
    match action {
        Action::Down(p) => session.pointer_down(p),
        Action::Drag(p) => session.pointer_move(p),
        Action::Up => {
            if session.pointer_up().is_none() {
                println!("No stroke in progress");
            }
        }
        Action::Line(points) => {
            let mut points = points.into_iter();
            if let Some(first) = points.next() {
                session.pointer_down(first);
                points.for_each(|p| session.pointer_move(p));
                session.pointer_up();
            }
        }
        Action::Erase(flag) => {
            let erase = match flag {
                Some(erase) => {
                    session.set_erase_mode(erase);
                    erase
                }
                None => session.toggle_erase_mode(),
            };
            println!("Erase mode {}", if erase { "on" } else { "off" });
        }
        Action::Mode(mode) => {
            let mode = match mode {
                Some(mode) => {
                    session.set_transmission_mode(mode);
                    mode
                }
                None => session.toggle_transmission_mode(),
            };
            println!("Transmission mode: {mode}");
        }
        Action::Send => {
            session.send_drawing();
        }
        Action::Undo => {
            if !session.undo() {
                println!("Nothing to undo");
            }
        }
        Action::Redo => {
            if !session.redo() {
                println!("Nothing to redo");
            }
        }
        Action::Clear => session.clear_canvas(),
        Action::Reset => session.reset_canvas(),
        Action::Load(file) => {
            let strokes = read_strokes(&file)?;
            session.load_strokes(strokes);
            println!("Loaded {} ink strokes", session.path().len());
        }
        Action::Svg => println!("{}", session.canvas().export_svg()?),
        Action::Position => {
            session.refresh_position().await;
        }
        Action::Axis(axis, value) => {
            let min = config.session.min_axis_value;
            if value < min {
                bail!("{axis} must be at least {min}");
            }
            session.update_axis(axis, value).await?;
        }
        Action::Command(command) => {
            // already reported through notifications
            let _ = session.command(command).await;
        }
        Action::Image => {
            let _ = session.fetch_image().await;
        }
        Action::Save => {
            session.open_save_confirmation()?;
            println!("Saving is final. Type 'confirm' to save or 'cancel' to keep drawing.");
        }
        Action::Confirm => {
            // device outcomes are reported through notifications
            if let Err(e @ sketchbot_core::Error::GuardViolation(_)) = session.confirm_save().await {
                return Err(e.into());
            }
        }
        Action::Cancel => session.cancel_save(),
        Action::Status => print_status(session),
        Action::Help => println!("{HELP}"),
        Action::Quit => {}
    }
    Ok(())
}

fn print_status(session: &DrawingSession) {
    let position = session
        .position()
        .map_or_else(|| "unknown".to_string(), |p| p.to_string());
    println!("Position:      {position}");
    println!("Mode:          {}", session.transmission_mode());
    println!("Erase:         {}", session.erase_mode());
    println!("Path strokes:  {}", session.path().len());
    println!("Canvas strokes: {}", session.canvas().strokes().len());
    println!("In flight:     {}", session.in_flight());
    println!(
        "Image:         {}",
        session.image_state().image().unwrap_or("none")
    );
}

async fn print_notifications<W: Write>(
    mut notes: broadcast::Receiver<Notification>,
    mut out: W,
) -> W {
    loop {
        match notes.recv().await {
            Ok(note) => {
                let _ = writeln!(out, "{}", render(note.category, &note.message));
            }
            Err(RecvError::Lagged(missed)) => warn!(missed, "Notification printer fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
    out
}
