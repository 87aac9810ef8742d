//! Region and size segments of an Image API request.

use std::fmt;
use std::str::FromStr;

/// The `region` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// `full`
    Full,
    /// `square`
    Square,
    /// `x,y,w,h` in pixels.
    Pixels {
        /// Left edge.
        x: u32,
        /// Top edge.
        y: u32,
        /// Region width.
        width: u32,
        /// Region height.
        height: u32,
    },
    /// `pct:x,y,w,h`, kept verbatim.
    Percent(String),
}

impl FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "square" => Ok(Self::Square),
            _ => {
                if let Some(pct) = s.strip_prefix("pct:") {
                    return (pct.split(',').count() == 4 && pct.split(',').all(is_decimal))
                        .then(|| Self::Percent(pct.to_string()))
                        .ok_or(());
                }
                let parts = parse_u32_list(s).ok_or(())?;
                let [x, y, width, height] = parts[..] else {
                    return Err(());
                };
                Ok(Self::Pixels {
                    x,
                    y,
                    width,
                    height,
                })
            }
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Square => f.write_str("square"),
            Self::Pixels {
                x,
                y,
                width,
                height,
            } => write!(f, "{x},{y},{width},{height}"),
            Self::Percent(pct) => write!(f, "pct:{pct}"),
        }
    }
}

/// The `size` segment.
///
/// The `^` upscaling prefix of Image API 3 is accepted and kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Size {
    /// `full`
    Full,
    /// `max`
    Max,
    /// `w,`
    Width(u32),
    /// `,h`
    Height(u32),
    /// `w,h`
    Exact(u32, u32),
    /// `!w,h`
    BestFit(u32, u32),
    /// `pct:n`, kept verbatim.
    Percent(String),
    /// `^` followed by any other size.
    Upscaled(Box<Size>),
}

impl FromStr for Size {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('^') {
            return rest.parse().map(|inner| Self::Upscaled(Box::new(inner)));
        }
        match s {
            "full" => return Ok(Self::Full),
            "max" => return Ok(Self::Max),
            _ => {}
        }
        if let Some(pct) = s.strip_prefix("pct:") {
            return is_decimal(pct)
                .then(|| Self::Percent(pct.to_string()))
                .ok_or(());
        }
        if let Some(best_fit) = s.strip_prefix('!') {
            let (w, h) = best_fit.split_once(',').ok_or(())?;
            return Ok(Self::BestFit(parse_u32(w)?, parse_u32(h)?));
        }
        match s.split_once(',').ok_or(())? {
            (w, "") => Ok(Self::Width(parse_u32(w)?)),
            ("", h) => Ok(Self::Height(parse_u32(h)?)),
            (w, h) => Ok(Self::Exact(parse_u32(w)?, parse_u32(h)?)),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Max => f.write_str("max"),
            Self::Width(w) => write!(f, "{w},"),
            Self::Height(h) => write!(f, ",{h}"),
            Self::Exact(w, h) => write!(f, "{w},{h}"),
            Self::BestFit(w, h) => write!(f, "!{w},{h}"),
            Self::Percent(pct) => write!(f, "pct:{pct}"),
            Self::Upscaled(inner) => write!(f, "^{inner}"),
        }
    }
}

fn parse_u32(s: &str) -> Result<u32, ()> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(());
    }
    s.parse().map_err(|_| ())
}

fn parse_u32_list(s: &str) -> Option<Vec<u32>> {
    s.split(',').map(|part| parse_u32(part).ok()).collect()
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.parse::<f64>().is_ok() && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}
