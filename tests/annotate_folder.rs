use std::fs;
use std::path::Path;

use mask_annotator::{NavState, Session, Settings, Tool, Zoom, ZoomDirection};

fn write_png(dir: &Path, name: &str, w: u32, h: u32) {
    image::RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 200]))
        .save(dir.join(name))
        .unwrap();
}

fn drag(session: &mut Session, points: &[(f32, f32)]) {
    session.begin_stroke(points[0]);
    for &p in points {
        session.continue_stroke(p);
    }
    session.end_stroke();
}

#[test]
fn annotate_walk_and_reload() {
    let root = tempfile::tempdir().unwrap();
    let images = root.path().join("images");
    fs::create_dir(&images).unwrap();
    write_png(&images, "a.png", 64, 48);
    write_png(&images, "b.png", 32, 32);
    write_png(&images, "c.png", 50, 50);

    let mut session = Session::new(Settings::default());
    session.open_folder(root.path()).unwrap();
    assert!(root.path().join("masks").is_dir());

    // Paint at 2x zoom on a.png, then erase part of it.
    assert!(session.zoom_by(ZoomDirection::In));
    session.set_zoom(Zoom::new(2.0));
    session.tools_mut().set_size(5);
    drag(&mut session, &[(20.0, 20.0), (60.0, 20.0), (100.0, 40.0)]);
    session.tools_mut().select(Tool::Eraser);
    session.tools_mut().set_size(3);
    drag(&mut session, &[(60.0, 0.0), (60.0, 90.0)]);
    let annotated = session.mask().unwrap().clone();
    assert!(annotated.any_painted());
    assert_eq!(annotated.get(30, 10), Some(0));

    // Undo the erase only.
    assert!(session.undo());
    assert_eq!(session.mask().unwrap().get(30, 10), Some(255));
    assert!(session.can_undo());

    // Redo the erase by hand and move on; auto-save persists it.
    drag(&mut session, &[(60.0, 0.0), (60.0, 90.0)]);
    assert_eq!(session.mask().unwrap(), &annotated);
    assert!(session.next().unwrap());
    assert!(session.next().unwrap());
    assert!(!session.can_next());

    // Drop b.png while on c.png's neighbour.
    assert!(session.previous().unwrap());
    assert_eq!(session.current_name(), Some("b.png"));
    session.delete().unwrap();
    assert_eq!(session.entries(), ["a.png", "c.png"]);
    assert_eq!(session.current_name(), Some("c.png"));

    // A fresh session sees the saved mask for a.png.
    let mut reopened = Session::new(Settings::default());
    reopened.open_folder(root.path()).unwrap();
    assert_eq!(reopened.entries(), ["a.png", "c.png"]);
    assert_eq!(reopened.mask().unwrap(), &annotated);
    assert!(!reopened.undo());

    // Delete everything.
    reopened.delete().unwrap();
    reopened.delete().unwrap();
    assert_eq!(reopened.state(), NavState::Empty);
    assert_eq!(reopened.current_index(), None);
    assert!(fs::read_dir(&images).unwrap().next().is_none());
}
