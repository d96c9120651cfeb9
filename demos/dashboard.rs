//! Terminal dashboard demo.
//!
//! Builds a nested split layout in a `MemoryHost` sized to the terminal,
//! runs the engine for two frames, then draws the resulting boxes.
//!
//! ```text
//! cargo run --example dashboard
//! ```

use std::io::{Write, stdout};

use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use crossterm::{execute, terminal};

use apportion::host::{Positionable, RenderDriver, Sizable};
use apportion::{Axis, Justify, LayoutEngine, MemoryHost, NodeId, PlacementAttributes, Px, Rect};

fn child(host: &mut MemoryHost, parent: NodeId) -> NodeId {
    host.create_node(parent).expect("parent node exists")
}

/// Resolve a node's parent-relative geometry against its parent's
/// absolute origin.
fn abs_rect(host: &MemoryHost, node: NodeId, origin: (Px, Px)) -> Rect {
    let (x, y) = host.position(node);
    let (w, h) = host.bounding_rect(node);
    Rect::new(origin.0 + x, origin.1 + y, w, h)
}

fn draw_box(out: &mut impl Write, rect: Rect, label: &str) -> std::io::Result<()> {
    if rect.width < 2 || rect.height < 2 {
        return Ok(());
    }
    let (x, y) = (rect.x.max(0) as u16, rect.y.max(0) as u16);
    let (w, h) = (rect.width as u16, rect.height as u16);
    let horiz = "─".repeat((w - 2) as usize);

    execute!(out, MoveTo(x, y), Print(format!("┌{horiz}┐")))?;
    for row in 1..h - 1 {
        execute!(
            out,
            MoveTo(x, y + row),
            Print("│"),
            MoveTo(x + w - 1, y + row),
            Print("│")
        )?;
    }
    execute!(out, MoveTo(x, y + h - 1), Print(format!("└{horiz}┘")))?;

    let title: String = label.chars().take((w as usize).saturating_sub(4)).collect();
    execute!(out, MoveTo(x + 2, y), Print(title))?;
    Ok(())
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let (cols, rows) = terminal::size().unwrap_or((100, 30));
    let mut host = MemoryHost::new(cols as Px, rows as Px);
    let root = host.root();
    let mut engine = LayoutEngine::new(root);

    // Root: header / body / footer rows.
    let header = child(&mut host, root);
    let body = child(&mut host, root);
    let footer = child(&mut host, root);
    let _root_split = engine.register(root, Axis::Vertical, "15%[min=3],r,10%[min=2]");

    // Body: sidebar column and a content area.
    let sidebar = child(&mut host, body);
    let content = child(&mut host, body);
    let _body_split = engine.register(body, Axis::Horizontal, "25%[min=16,max=40],r");

    // Content holds one gauge, scaled and centered by its attributes.
    let gauge = child(&mut host, content);
    let _content_split = engine.register(content, Axis::Vertical, "r");
    engine.set_attributes(
        gauge,
        PlacementAttributes {
            scale_x: 0.6,
            scale_y: 0.5,
            justify_x: Justify::Center,
            justify_y: Justify::Center,
            ..Default::default()
        },
    );

    // Bootstrap frame plus one settled frame.
    for _ in 0..2 {
        engine.pre_frame(&mut host);
        host.render_frame();
        engine.post_frame(&mut host);
    }

    let mut out = stdout();
    execute!(out, terminal::Clear(terminal::ClearType::All))?;

    let origin = (0, 0);
    let body_abs = abs_rect(&host, body, origin);
    draw_box(&mut out, abs_rect(&host, header, origin), "header")?;
    draw_box(&mut out, body_abs, "body")?;
    draw_box(&mut out, abs_rect(&host, footer, origin), "footer")?;

    let body_origin = (body_abs.x, body_abs.y);
    draw_box(&mut out, abs_rect(&host, sidebar, body_origin), "sidebar")?;
    let content_abs = abs_rect(&host, content, body_origin);
    draw_box(&mut out, content_abs, "content")?;
    draw_box(
        &mut out,
        abs_rect(&host, gauge, (content_abs.x, content_abs.y)),
        "gauge",
    )?;

    execute!(out, MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()
}
