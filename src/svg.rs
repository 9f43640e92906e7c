use crate::error::IcoForgeError;
use crate::types::{Color, Polygon};

// Opinionated SVG subset compiler for flat single-color logo artwork.
//
// Supported:
// - <svg> root with viewBox or width/height attributes (namespaced
//   documents are matched by local tag name)
// - <path d="..."> with commands: M/m, L/l, H/h, V/v, Z/z
// - fill="" in #RGB or #RRGGBB hex form
//
// Not supported: curves and arcs, transforms, strokes, gradients,
// stylesheets. Unrecognized fill syntax silently falls back to opaque
// black; unrecognized path commands are hard errors that abort the
// document.

#[derive(Debug, Clone)]
pub struct CompiledShape {
    pub fill: Color,
    pub polygons: Vec<Polygon>,
}

/// Size-independent compile output: the logical canvas plus every drawable
/// shape in document order. Later shapes occlude earlier ones when filled.
#[derive(Debug, Clone)]
pub struct CompiledIcon {
    pub width: f32,
    pub height: f32,
    pub shapes: Vec<CompiledShape>,
}

pub fn compile_svg(svg_xml: &str) -> Result<CompiledIcon, IcoForgeError> {
    let doc = roxmltree::Document::parse(svg_xml)
        .map_err(|e| IcoForgeError::Document(e.to_string()))?;
    let root = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case("svg"))
        .ok_or_else(|| IcoForgeError::Document("no <svg> root element".to_string()))?;

    let (width, height) = document_size(root);

    let mut shapes = Vec::new();
    for node in root.descendants().filter(|n| n.is_element()) {
        if node.tag_name().name() != "path" {
            continue;
        }
        let Some(d) = node.attribute("d") else {
            continue;
        };
        let fill = parse_fill_color(node.attribute("fill"));
        let polygons = parse_path_polygons(d)?;
        shapes.push(CompiledShape { fill, polygons });
    }

    Ok(CompiledIcon {
        width,
        height,
        shapes,
    })
}

/// Logical canvas size: a well-formed viewBox wins, then width/height
/// attributes, then the 24x24 default common to icon sets. Positivity is
/// enforced later by the per-size fit transform.
fn document_size(root: roxmltree::Node<'_, '_>) -> (f32, f32) {
    if let Some(vb) = root.attribute("viewBox") {
        let parts: Vec<f32> = vb
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<f32>().ok())
            .collect();
        if parts.len() == 4 {
            return (parts[2], parts[3]);
        }
    }
    let width = root
        .attribute("width")
        .and_then(parse_number)
        .unwrap_or(24.0);
    let height = root
        .attribute("height")
        .and_then(parse_number)
        .unwrap_or(24.0);
    (width, height)
}

fn parse_number(input: &str) -> Option<f32> {
    let s = input.trim();
    // Ignore unit suffixes (treat user units as-is).
    let s = s
        .trim_end_matches("px")
        .trim_end_matches("pt")
        .trim_end_matches("mm")
        .trim_end_matches("cm")
        .trim_end_matches("in")
        .trim();
    s.parse::<f32>().ok()
}

pub(crate) fn parse_fill_color(value: Option<&str>) -> Color {
    value.and_then(parse_hex_color).unwrap_or(Color::BLACK)
}

fn parse_hex_color(input: &str) -> Option<Color> {
    let hex = input.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            // Each digit expands by duplication: #f0a -> #ff00aa.
            Some(Color::rgb(r * 0x11, g * 0x11, b * 0x11))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::rgb(r, g, b))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathCmd {
    MoveTo,
    LineTo,
    HorizontalTo,
    VerticalTo,
    Close,
}

fn classify_command(letter: char) -> Result<(PathCmd, bool), IcoForgeError> {
    let relative = letter.is_ascii_lowercase();
    let cmd = match letter.to_ascii_uppercase() {
        'M' => PathCmd::MoveTo,
        'L' => PathCmd::LineTo,
        'H' => PathCmd::HorizontalTo,
        'V' => PathCmd::VerticalTo,
        'Z' => PathCmd::Close,
        _ => return Err(IcoForgeError::UnsupportedPathCommand(letter)),
    };
    Ok((cmd, relative))
}

/// Interpret path data into subpath polygons in source coordinates.
///
/// One command application per loop iteration; bare numbers re-apply the
/// current command, with the move-to special case that subsequent pairs are
/// implicit line-tos in the same absolute/relative mode. A close appends the
/// subpath start point and clears the current command, so a bare number
/// after a close is malformed. An unfinished polygon at end of input is
/// emitted as-is, not auto-closed.
pub(crate) fn parse_path_polygons(d: &str) -> Result<Vec<Polygon>, IcoForgeError> {
    let mut p = PathParser::new(d);
    let mut polygons: Vec<Polygon> = Vec::new();
    let mut current: Polygon = Vec::new();
    let mut cmd: Option<(PathCmd, bool)> = None;
    let (mut x, mut y) = (0.0_f32, 0.0_f32);
    let (mut start_x, mut start_y) = (0.0_f32, 0.0_f32);

    while !p.at_end() {
        if let Some(letter) = p.take_command() {
            cmd = Some(classify_command(letter)?);
        }
        let Some((active, relative)) = cmd else {
            return Err(IcoForgeError::MalformedPath(
                "path data must start with a command".to_string(),
            ));
        };

        match active {
            PathCmd::MoveTo => {
                let nx = p.next_number()?;
                let ny = p.next_number()?;
                if relative {
                    x += nx;
                    y += ny;
                } else {
                    x = nx;
                    y = ny;
                }
                if !current.is_empty() {
                    polygons.push(std::mem::take(&mut current));
                }
                current.push((x, y));
                start_x = x;
                start_y = y;
                cmd = Some((PathCmd::LineTo, relative));
            }
            PathCmd::LineTo => {
                let nx = p.next_number()?;
                let ny = p.next_number()?;
                if relative {
                    x += nx;
                    y += ny;
                } else {
                    x = nx;
                    y = ny;
                }
                current.push((x, y));
            }
            PathCmd::HorizontalTo => {
                let nx = p.next_number()?;
                x = if relative { x + nx } else { nx };
                current.push((x, y));
            }
            PathCmd::VerticalTo => {
                let ny = p.next_number()?;
                y = if relative { y + ny } else { ny };
                current.push((x, y));
            }
            PathCmd::Close => {
                if !current.is_empty() {
                    current.push((start_x, start_y));
                    polygons.push(std::mem::take(&mut current));
                }
                cmd = None;
            }
        }
    }

    if !current.is_empty() {
        polygons.push(current);
    }
    Ok(polygons)
}

struct PathParser<'a> {
    bytes: &'a [u8],
    i: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            i: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.i < self.bytes.len() {
            let b = self.bytes[self.i];
            if b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' || b == b',' {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.i >= self.bytes.len()
    }

    fn take_command(&mut self) -> Option<char> {
        self.skip_ws();
        if self.i >= self.bytes.len() {
            return None;
        }
        let c = self.bytes[self.i] as char;
        if c.is_ascii_alphabetic() {
            self.i += 1;
            return Some(c);
        }
        None
    }

    fn next_number(&mut self) -> Result<f32, IcoForgeError> {
        self.skip_ws();
        if self.i >= self.bytes.len() {
            return Err(IcoForgeError::MalformedPath(
                "unexpected end of path data".to_string(),
            ));
        }
        let start = self.i;
        let mut has_digits = false;

        if matches!(self.bytes[self.i], b'+' | b'-') {
            self.i += 1;
        }
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
            self.i += 1;
            has_digits = true;
        }
        if self.i < self.bytes.len() && self.bytes[self.i] == b'.' {
            self.i += 1;
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
                has_digits = true;
            }
        }
        if has_digits && self.i < self.bytes.len() && matches!(self.bytes[self.i], b'e' | b'E') {
            self.i += 1;
            if self.i < self.bytes.len() && matches!(self.bytes[self.i], b'+' | b'-') {
                self.i += 1;
            }
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
            }
        }

        if !has_digits {
            self.i = start;
            return Err(IcoForgeError::MalformedPath(
                "expected a number".to_string(),
            ));
        }

        std::str::from_utf8(&self.bytes[start..self.i])
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .ok_or_else(|| IcoForgeError::MalformedPath("expected a number".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_hex_round_trips_channels() {
        assert_eq!(parse_fill_color(Some("#ff00aa")), Color::rgb(255, 0, 170));
        assert_eq!(parse_fill_color(Some("#000000")), Color::rgb(0, 0, 0));
        assert_eq!(parse_fill_color(Some("#0180ff")), Color::rgb(1, 128, 255));
    }

    #[test]
    fn three_digit_hex_expands_by_duplication() {
        assert_eq!(parse_fill_color(Some("#f0a")), Color::rgb(255, 0, 170));
        assert_eq!(parse_fill_color(Some("#1bc")), Color::rgb(0x11, 0xbb, 0xcc));
    }

    #[test]
    fn missing_or_malformed_fill_falls_back_to_black() {
        assert_eq!(parse_fill_color(None), Color::BLACK);
        assert_eq!(parse_fill_color(Some("red")), Color::BLACK);
        assert_eq!(parse_fill_color(Some("#12345")), Color::BLACK);
        assert_eq!(parse_fill_color(Some("#xyz")), Color::BLACK);
        assert_eq!(parse_fill_color(Some("url(#g1)")), Color::BLACK);
    }

    #[test]
    fn parses_triangle_path() {
        let polygons = parse_path_polygons("M0 0L10 0L10 10Z").expect("valid path");
        assert_eq!(
            polygons,
            vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]]
        );
    }

    #[test]
    fn implicit_line_to_after_move_matches_explicit_form() {
        let explicit = parse_path_polygons("M0 0L10 0L10 10Z").expect("valid path");
        let implicit = parse_path_polygons("M0 0 10 0 10 10Z").expect("valid path");
        assert_eq!(explicit, implicit);
    }

    #[test]
    fn relative_commands_match_absolute_equivalent() {
        let absolute = parse_path_polygons("M0 0L10 0L10 10Z").expect("valid path");
        let relative = parse_path_polygons("m0 0l10 0l0 10z").expect("valid path");
        assert_eq!(absolute, relative);
    }

    #[test]
    fn relative_move_continues_from_cursor() {
        let polygons = parse_path_polygons("M10 10L20 10Z m5 5 l1 0 z").expect("valid path");
        assert_eq!(polygons.len(), 2);
        // The second subpath starts relative to the cursor left at (20, 10)
        // by the close of the first.
        assert_eq!(polygons[1][0], (25.0, 15.0));
    }

    #[test]
    fn horizontal_and_vertical_commands_move_one_axis() {
        let polygons = parse_path_polygons("M1 2H5V7h-2v-1Z").expect("valid path");
        assert_eq!(
            polygons,
            vec![vec![
                (1.0, 2.0),
                (5.0, 2.0),
                (5.0, 7.0),
                (3.0, 7.0),
                (3.0, 6.0),
                (1.0, 2.0),
            ]]
        );
    }

    #[test]
    fn trailing_open_subpath_is_emitted_without_closing_point() {
        let polygons = parse_path_polygons("M0 0L10 0L10 10").expect("valid path");
        assert_eq!(polygons, vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]]);
    }

    #[test]
    fn new_move_finalizes_polygon_in_progress() {
        let polygons = parse_path_polygons("M0 0L4 0L4 4M8 8L9 8L9 9Z").expect("valid path");
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].len(), 3);
        assert_eq!(polygons[1].last(), Some(&(8.0, 8.0)));
    }

    #[test]
    fn accepts_commas_decimals_and_exponents() {
        let polygons = parse_path_polygons("M0.5,0.5 L1e1,0 L10,1.5e1 Z").expect("valid path");
        assert_eq!(
            polygons,
            vec![vec![(0.5, 0.5), (10.0, 0.0), (10.0, 15.0), (0.5, 0.5)]]
        );
    }

    #[test]
    fn leading_number_is_malformed() {
        let err = parse_path_polygons("0 0 L10 10").unwrap_err();
        assert!(matches!(err, IcoForgeError::MalformedPath(_)));
    }

    #[test]
    fn number_after_close_is_malformed() {
        let err = parse_path_polygons("M0 0L10 0Z 5 5").unwrap_err();
        assert!(matches!(err, IcoForgeError::MalformedPath(_)));
    }

    #[test]
    fn missing_argument_is_malformed() {
        let err = parse_path_polygons("M0 0L10").unwrap_err();
        assert!(matches!(err, IcoForgeError::MalformedPath(_)));

        let err = parse_path_polygons("M0 0L10 Z").unwrap_err();
        assert!(matches!(err, IcoForgeError::MalformedPath(_)));
    }

    #[test]
    fn curve_commands_are_unsupported() {
        let err = parse_path_polygons("M0 0C1 1 2 2 3 3").unwrap_err();
        assert!(matches!(err, IcoForgeError::UnsupportedPathCommand('C')));

        let err = parse_path_polygons("M0 0a1 1 0 0 1 2 2").unwrap_err();
        assert!(matches!(err, IcoForgeError::UnsupportedPathCommand('a')));
    }

    #[test]
    fn compiles_shapes_in_document_order() {
        let svg = r##"
        <svg viewBox="0 0 24 24">
          <path d="M0 0L24 0L24 24L0 24Z" fill="#102030"/>
          <path d="M4 4L20 4L20 20Z" fill="#f0a"/>
        </svg>
        "##;
        let icon = compile_svg(svg).expect("valid document");
        assert_eq!((icon.width, icon.height), (24.0, 24.0));
        assert_eq!(icon.shapes.len(), 2);
        assert_eq!(icon.shapes[0].fill, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(icon.shapes[1].fill, Color::rgb(255, 0, 170));
    }

    #[test]
    fn matches_namespaced_path_elements_by_local_name() {
        let svg = r##"
        <s:svg xmlns:s="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
          <s:path d="M0 0L10 0L10 10Z" fill="#fff"/>
        </s:svg>
        "##;
        let icon = compile_svg(svg).expect("valid document");
        assert_eq!(icon.shapes.len(), 1);
        assert_eq!(icon.shapes[0].polygons.len(), 1);
    }

    #[test]
    fn path_without_data_attribute_is_skipped() {
        let svg = r##"
        <svg viewBox="0 0 10 10">
          <path fill="#fff"/>
          <path d="M0 0L10 0L10 10Z"/>
        </svg>
        "##;
        let icon = compile_svg(svg).expect("valid document");
        assert_eq!(icon.shapes.len(), 1);
    }

    #[test]
    fn viewbox_wins_over_width_and_height() {
        let svg = r#"<svg viewBox="0 0 48 24" width="10" height="10"/>"#;
        let icon = compile_svg(svg).expect("valid document");
        assert_eq!((icon.width, icon.height), (48.0, 24.0));
    }

    #[test]
    fn malformed_viewbox_falls_back_to_width_and_height() {
        let svg = r#"<svg viewBox="0 0 48" width="32px" height="16"/>"#;
        let icon = compile_svg(svg).expect("valid document");
        assert_eq!((icon.width, icon.height), (32.0, 16.0));
    }

    #[test]
    fn missing_size_attributes_default_to_24() {
        let icon = compile_svg("<svg/>").expect("valid document");
        assert_eq!((icon.width, icon.height), (24.0, 24.0));
    }

    #[test]
    fn grammar_error_in_one_path_aborts_the_document() {
        let svg = r##"
        <svg viewBox="0 0 10 10">
          <path d="M0 0L10 0L10 10Z"/>
          <path d="M0 0Q5 5 10 10"/>
        </svg>
        "##;
        let err = compile_svg(svg).unwrap_err();
        assert!(matches!(err, IcoForgeError::UnsupportedPathCommand('Q')));
    }

    #[test]
    fn unparseable_xml_is_a_document_error() {
        let err = compile_svg("<svg").unwrap_err();
        assert!(matches!(err, IcoForgeError::Document(_)));
    }
}
