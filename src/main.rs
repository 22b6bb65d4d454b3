// What you SEE:
// • The current image with a translucent red overlay wherever the mask is painted.
// • Hold Left Mouse to paint (brush) or erase; Ctrl+Q brush, Ctrl+W eraser, [ ] size.
// • Mouse wheel zooms around the pointer; right-drag pans when zoomed in.
// • Arrows move between images (auto-saving the mask), Delete removes the image,
//   C clears, Ctrl+Z undoes, Ctrl+S saves, M/I toggle overlay/image. ESC quits.

mod cli;
mod draw;

use clap::Parser;
use draw::{Command, Drawer, Pointer, Viewport, compose, draw_brush_outline};
use mask_annotator::mapper::anchor_offset;
use mask_annotator::{Error, FrameBuffer, Result, Session, Tool, ZoomDirection};

const TITLE: &str = "Mask Annotator";

/// Run one keyboard command. Returns true when the display must be recomputed.
fn apply(session: &mut Session, command: Command) -> Result<bool> {
    let changed = match command {
        Command::Undo => session.undo(),
        Command::Brush => {
            session.tools_mut().select(Tool::Brush);
            false
        }
        Command::Eraser => {
            session.tools_mut().select(Tool::Eraser);
            false
        }
        Command::Previous => session.previous()?,
        Command::Next => session.next()?,
        Command::Delete => {
            session.delete()?;
            true
        }
        Command::Clear => session.clear_annotations(),
        Command::Save => {
            session.save_mask()?;
            false
        }
        Command::ToggleMask => {
            let view = &mut session.settings_mut().view;
            view.show_mask_overlay = !view.show_mask_overlay;
            true
        }
        Command::ToggleImage => {
            let view = &mut session.settings_mut().view;
            view.show_image = !view.show_image;
            true
        }
        Command::Grow => {
            session.tools_mut().adjust_size(1);
            false
        }
        Command::Shrink => {
            session.tools_mut().adjust_size(-1);
            false
        }
    };
    Ok(changed)
}

fn title_for(session: &Session, message: Option<&str>) -> String {
    let tools = session.tools();
    let mut title = match session.status() {
        Some(status) => format!(
            "{TITLE} | {status} | {} {} | zoom {:.0}%",
            tools.active().name(),
            tools.size(),
            session.zoom().factor() * 100.0
        ),
        None => format!("{TITLE} | Image: None"),
    };
    if let Some(message) = message {
        title.push_str(" | ");
        title.push_str(message);
    }
    title
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::Args::parse();

    /* --- Engine setup ---
       Visual: nothing yet; the session loads the first image of the folder. */
    let mut session = Session::new(args.settings());
    *session.tools_mut() = args.tools();
    let mut message: Option<String> = None;
    match &args.folder {
        Some(folder) => {
            if let Err(e) = session.open_folder(folder) {
                log::error!("{e}");
                message = Some(e.to_string());
            }
        }
        None => log::warn!("no folder given; pass a folder containing images/"),
    }

    /* --- Window setup ---
       Visual: window opens showing the first image at 100%. */
    let mut drawer = Drawer::new(TITLE, args.width, args.height)?;
    let mut screen = FrameBuffer::filled(args.width, args.height, draw::BACKGROUND);
    let mut display = session.render();
    let mut view = Viewport::default();
    let mut last = Pointer::default();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let mut dirty = false;

        /* 1) Follow window resizes. */
        let (w, h) = drawer.size();
        if (w, h) != screen.dimensions() && w > 0 && h > 0 {
            screen = FrameBuffer::filled(w, h, draw::BACKGROUND);
        }

        /* 2) Keyboard commands. */
        for command in drawer.commands() {
            match apply(&mut session, command) {
                Ok(changed) => dirty |= changed,
                Err(e) => {
                    log::error!("{e}");
                    message = Some(e.to_string());
                    dirty = true;
                }
            }
            if matches!(command, Command::Previous | Command::Next | Command::Delete) {
                view = Viewport::default();
                // A decode error stays visible until a usable image is shown.
                if session.image().is_some() {
                    message = None;
                }
            }
        }

        /* 3) Pointer: wheel zoom anchored at the cursor, painting, panning. */
        let pointer = drawer.pointer();
        if let (Some(pos), Some(direction)) = (pointer.pos, ZoomDirection::from_wheel(pointer.wheel)) {
            let before = session.zoom();
            if session.zoom_by(direction) {
                view.offset = anchor_offset(pos, view.offset, before, session.zoom());
                dirty = true;
            }
        }

        if let Some(pos) = pointer.pos {
            let at = view.to_display(pos);
            if pointer.left && !last.left {
                session.begin_stroke(at);
            }
            if pointer.left && session.is_stroking() && (!last.left || last.pos != pointer.pos) {
                dirty |= session.continue_stroke(at);
            }
            if pointer.right && last.right {
                if let Some(prev) = last.pos {
                    view.offset.0 -= pos.0 - prev.0;
                    view.offset.1 -= pos.1 - prev.1;
                }
            }
        }
        if !pointer.left && last.left {
            session.end_stroke();
        }
        last = pointer;

        /* 4) Recompute the display only when something changed. */
        if dirty {
            display = session.render();
        }
        if let Some(d) = &display {
            view.clamp(d.dimensions(), screen.dimensions());
        }

        /* 5) Blit, brush outline, status line, present. */
        compose(&mut screen, display.as_ref(), &view);
        if let (Some(pos), Some(_)) = (pointer.pos, &display) {
            let radius = session.tools().size() as f32 * session.zoom().factor() / 2.0;
            draw_brush_outline(&mut screen, pos.0 as i32, pos.1 as i32, radius.round() as i32);
        }
        drawer.set_title(&title_for(&session, message.as_deref()));
        drawer.present(&screen)?;
    }

    if session.settings().auto_save {
        if let Err(e) = session.save_mask() {
            log::warn!("saving on exit failed: {e}");
        }
    }
    Ok(())
}
