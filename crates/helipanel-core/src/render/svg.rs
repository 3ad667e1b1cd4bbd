//! SVG frame writer.
//!
//! Serializes a [`Frame`] to an SVG document so headless hosts can present
//! it in any browser or image viewer.

use super::{DrawCommand, Frame, TextAnchor};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::Path;

/// Errors that can occur during SVG writing.
#[derive(Debug, thiserror::Error)]
pub enum SvgWriteError {
    /// The XML writer failed
    #[error("XML writing error: {0}")]
    XmlError(#[from] quick_xml::Error),
    /// The file could not be written
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Write a frame as a standalone SVG document.
pub fn write_svg(frame: &Frame) -> Result<String, SvgWriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width = fmt_num(frame.width);
    let height = fmt_num(frame.height);
    let view_box = format!("0 0 {width} {height}");
    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    root.push_attribute(("font-family", "sans-serif"));
    writer.write_event(Event::Start(root))?;

    let mut bg = BytesStart::new("rect");
    bg.push_attribute(("width", "100%"));
    bg.push_attribute(("height", "100%"));
    bg.push_attribute(("fill", frame.background.to_css_hex().as_str()));
    writer.write_event(Event::Empty(bg))?;

    let mut clip_ids = 0usize;
    for cmd in &frame.commands {
        write_command(&mut writer, cmd, &mut clip_ids)?;
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;

    let result = writer.into_inner();
    Ok(String::from_utf8_lossy(&result).to_string())
}

/// Write a frame to `path`, replacing any previous file atomically.
pub fn write_svg_file(frame: &Frame, path: &Path) -> Result<(), SvgWriteError> {
    let svg = write_svg(frame)?;
    let tmp = path.with_extension("svg.tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(svg.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn write_command<W: Write>(
    writer: &mut Writer<W>,
    cmd: &DrawCommand,
    clip_ids: &mut usize,
) -> Result<(), SvgWriteError> {
    match cmd {
        DrawCommand::Line {
            from,
            to,
            color,
            width,
        } => {
            let mut elem = BytesStart::new("line");
            elem.push_attribute(("x1", fmt_num(from.x).as_str()));
            elem.push_attribute(("y1", fmt_num(from.y).as_str()));
            elem.push_attribute(("x2", fmt_num(to.x).as_str()));
            elem.push_attribute(("y2", fmt_num(to.y).as_str()));
            elem.push_attribute(("stroke", color.to_css_hex().as_str()));
            elem.push_attribute(("stroke-width", fmt_num(*width).as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
        DrawCommand::Polygon { points, fill } => {
            let points = points
                .iter()
                .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
                .collect::<Vec<_>>()
                .join(" ");
            let mut elem = BytesStart::new("polygon");
            elem.push_attribute(("points", points.as_str()));
            elem.push_attribute(("fill", fill.to_css_hex().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
        DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        } => {
            let mut elem = BytesStart::new("circle");
            elem.push_attribute(("cx", fmt_num(center.x).as_str()));
            elem.push_attribute(("cy", fmt_num(center.y).as_str()));
            elem.push_attribute(("r", fmt_num(*radius).as_str()));
            match fill {
                Some(fill) => elem.push_attribute(("fill", fill.to_css_hex().as_str())),
                None => elem.push_attribute(("fill", "none")),
            }
            if let Some(stroke) = stroke {
                elem.push_attribute(("stroke", stroke.color.to_css_hex().as_str()));
                elem.push_attribute(("stroke-width", fmt_num(stroke.width).as_str()));
            }
            writer.write_event(Event::Empty(elem))?;
        }
        DrawCommand::Rect { origin, size, fill } => {
            let mut elem = BytesStart::new("rect");
            elem.push_attribute(("x", fmt_num(origin.x).as_str()));
            elem.push_attribute(("y", fmt_num(origin.y).as_str()));
            elem.push_attribute(("width", fmt_num(size.width).as_str()));
            elem.push_attribute(("height", fmt_num(size.height).as_str()));
            elem.push_attribute(("fill", fill.to_css_hex().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
        DrawCommand::Text {
            text,
            position,
            font_size,
            color,
            anchor,
        } => {
            let anchor = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let mut elem = BytesStart::new("text");
            elem.push_attribute(("x", fmt_num(position.x).as_str()));
            elem.push_attribute(("y", fmt_num(position.y).as_str()));
            elem.push_attribute(("font-size", fmt_num(*font_size).as_str()));
            elem.push_attribute(("fill", color.to_css_hex().as_str()));
            elem.push_attribute(("text-anchor", anchor));
            elem.push_attribute(("dominant-baseline", "central"));
            writer.write_event(Event::Start(elem))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new("text")))?;
        }
        DrawCommand::ClipCircle {
            center,
            radius,
            commands,
        } => {
            *clip_ids += 1;
            let id = format!("clip{}", clip_ids);

            writer.write_event(Event::Start(BytesStart::new("defs")))?;
            let mut clip = BytesStart::new("clipPath");
            clip.push_attribute(("id", id.as_str()));
            writer.write_event(Event::Start(clip))?;
            let mut circle = BytesStart::new("circle");
            circle.push_attribute(("cx", fmt_num(center.x).as_str()));
            circle.push_attribute(("cy", fmt_num(center.y).as_str()));
            circle.push_attribute(("r", fmt_num(*radius).as_str()));
            writer.write_event(Event::Empty(circle))?;
            writer.write_event(Event::End(BytesEnd::new("clipPath")))?;
            writer.write_event(Event::End(BytesEnd::new("defs")))?;

            let clip_ref = format!("url(#{id})");
            let mut group = BytesStart::new("g");
            group.push_attribute(("clip-path", clip_ref.as_str()));
            writer.write_event(Event::Start(group))?;
            for inner in commands {
                write_command(writer, inner, clip_ids)?;
            }
            writer.write_event(Event::End(BytesEnd::new("g")))?;
        }
    }
    Ok(())
}

/// Format a coordinate with at most two decimals and no trailing zeros
fn fmt_num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
