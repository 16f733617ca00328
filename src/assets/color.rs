use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{StudioError, StudioResult};

/// Straight-alpha color with normalized `0..1` channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColorDef {
    pub(crate) r: f64,
    pub(crate) g: f64,
    pub(crate) b: f64,
    pub(crate) a: f64,
}

impl ColorDef {
    pub(crate) fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        let r = (self.r.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let g = (self.g.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let b = (self.b.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);

        Rgba8Premul {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }
}

/// Parse a CSS color as accepted by a canvas `fillStyle`.
///
/// Supported forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()` with 0..255
/// channels, `hsl()`/`hsla()`, and a small set of named colors.
pub fn parse_css_color(s: &str) -> StudioResult<Rgba8Premul> {
    parse_color_def(s)
        .map(ColorDef::to_rgba8_premul)
        .map_err(|e| StudioError::validation(format!("invalid color \"{s}\": {e}")))
}

pub(crate) fn parse_color_def(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = func_args(&lower, "rgba").or_else(|| func_args(&lower, "rgb")) {
        return parse_rgb_args(&args);
    }
    if let Some(args) = func_args(&lower, "hsla").or_else(|| func_args(&lower, "hsl")) {
        return parse_hsl_args(&args);
    }
    named(&lower).ok_or_else(|| "unrecognized color syntax".to_owned())
}

fn func_args(s: &str, name: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix(name)?.trim_start().strip_prefix('(')?;
    let inner = inner.strip_suffix(')')?;
    Some(
        inner
            .split([',', '/', ' '])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        hex_byte(&format!("{c}{c}"))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 { hex_byte(&s[6..8])? } else { 255 };
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };

    Ok(ColorDef::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid number \"{s}\""))
}

// `50%` -> 0.5, `0.5` -> 0.5
fn parse_unit(s: &str) -> Result<f64, String> {
    match s.strip_suffix('%') {
        Some(p) => Ok(parse_number(p)? / 100.0),
        None => parse_number(s),
    }
}

fn parse_rgb_args(args: &[String]) -> Result<ColorDef, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("rgb() expects 3 or 4 components".to_owned());
    }
    let channel = |s: &str| -> Result<f64, String> {
        match s.strip_suffix('%') {
            Some(p) => Ok(parse_number(p)? / 100.0),
            None => Ok(parse_number(s)? / 255.0),
        }
    };
    let a = match args.get(3) {
        Some(a) => parse_unit(a)?,
        None => 1.0,
    };
    Ok(ColorDef::rgba(
        channel(&args[0])?,
        channel(&args[1])?,
        channel(&args[2])?,
        a,
    ))
}

fn parse_hsl_args(args: &[String]) -> Result<ColorDef, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("hsl() expects 3 or 4 components".to_owned());
    }
    let h = parse_number(args[0].trim_end_matches("deg"))?;
    let s = parse_unit(&args[1])?;
    let l = parse_unit(&args[2])?;
    let a = match args.get(3) {
        Some(a) => parse_unit(a)?,
        None => 1.0,
    };
    Ok(hsla_to_rgba(h, s, l, a))
}

fn named(s: &str) -> Option<ColorDef> {
    let (r, g, b, a) = match s {
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 128, 0, 255),
        "lime" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "cyan" | "aqua" => (0, 255, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "pink" => (255, 192, 203, 255),
        "transparent" => (0, 0, 0, 0),
        _ => return None,
    };
    Some(ColorDef::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    // Standard HSL -> RGB conversion (sRGB space, normalized 0..1 inputs).
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    ColorDef::rgba(r, g, b, a)
}
